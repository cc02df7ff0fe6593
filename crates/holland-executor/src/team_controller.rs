use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use holland_core::{
    ExecutorSettings, FieldZone, Half, PlannerKind, PlayerId, RobotCmd, Situation, Vector2,
    WorldData,
};

use crate::{
    behaviors::{Behavior, BehaviorCtx, Rank},
    control::{GotoPosition, MoveRequest},
    mode::{assign_roles, ModeKind, RoleAssignment},
    planner::PathPlanner,
    strategy::{select_situation, Strategy},
    RobotMode, TickOutput,
};

/// What a robot is doing this tick.
#[derive(Debug, Default)]
struct RoleSlot {
    assignment: Option<RoleAssignment>,
    behavior: Option<Behavior>,
}

/// Drives all of our robots, one tick at a time.
pub struct TeamController {
    settings: ExecutorSettings,
    controlled: Vec<PlayerId>,
    goalie_override: Option<PlayerId>,
    slots: HashMap<PlayerId, RoleSlot>,
    player_controllers: HashMap<PlayerId, GotoPosition>,
    planner: PathPlanner,
    situation: Option<Situation>,
    own_half: Option<Half>,
}

impl TeamController {
    /// Create a controller for the given robots.
    pub fn new(settings: &ExecutorSettings, controlled: Vec<PlayerId>) -> Self {
        let mut controlled = controlled;
        controlled.sort();
        controlled.dedup();
        Self {
            settings: settings.clone(),
            controlled,
            goalie_override: None,
            slots: HashMap::new(),
            player_controllers: HashMap::new(),
            planner: PathPlanner::new(&settings.planner_settings),
            situation: None,
            own_half: None,
        }
    }

    pub fn update_settings(&mut self, settings: &ExecutorSettings) {
        self.settings = settings.clone();
        self.planner.update_settings(&settings.planner_settings);
        for controller in self.player_controllers.values_mut() {
            controller.update_settings(&settings.controller_settings);
        }
    }

    /// Use this robot as goalie instead of the one the referee announces.
    pub fn set_goalie(&mut self, goalie: Option<PlayerId>) {
        self.goalie_override = goalie;
    }

    pub fn set_planner(&mut self, kind: PlannerKind) {
        self.planner.set_kind(kind);
    }

    pub fn situation(&self) -> Option<Situation> {
        self.situation
    }

    /// Roles bound in the last tick, before conditional roles are resolved.
    pub fn assignments(&self) -> BTreeMap<PlayerId, RoleAssignment> {
        self.slots
            .iter()
            .filter_map(|(id, slot)| slot.assignment.map(|a| (*id, a)))
            .collect()
    }

    /// The behavior a robot ran in the last tick.
    pub fn behavior_mode(&self, id: PlayerId) -> Option<RobotMode> {
        self.slots
            .get(&id)
            .and_then(|slot| slot.behavior.as_ref())
            .map(Behavior::mode)
    }

    /// Run one tick against a world snapshot.
    pub fn update(&mut self, world: &WorldData) -> TickOutput {
        let situation = select_situation(world, &self.settings.strategy_settings);
        if situation != self.situation {
            match situation {
                Some(s) => log::info!("Playing {}", s),
                None => log::info!("No situation for {}, stopping", world.game_state.game_state),
            }
            self.situation = situation;
        }
        let Some(situation) = situation else {
            self.slots.clear();
            return TickOutput::StopAll;
        };

        if self.own_half != Some(world.own_half) {
            // Behaviors hold the goal they defend
            self.slots.clear();
            self.own_half = Some(world.own_half);
        }

        let requests = match self.dispatch(world, Strategy::for_situation(situation)) {
            Ok(requests) => requests,
            Err(err) => {
                log::error!("Stopping all robots: {:#}", err);
                return TickOutput::StopAll;
            }
        };

        let ball = world.ball_position();
        let commands = self
            .controlled
            .iter()
            .map(|&id| {
                let (Some(request), Some(player)) = (requests.get(&id), world.own_player(id))
                else {
                    return RobotCmd::zero(id);
                };
                let controller = self
                    .player_controllers
                    .entry(id)
                    .or_insert_with(|| GotoPosition::new(&self.settings.controller_settings));
                controller.set_kick(request.kick, request.chip);

                let route = request.destination.map(|dest| {
                    let obstacles = self.planner.obstacles(world, id, request.avoid_ball);
                    self.planner.route(player.position, dest, &obstacles)
                });
                let route = route
                    .as_ref()
                    .map(|r| r.as_ref().map(|v| v.as_slice()).map_err(|e| *e));
                controller.calculate(player, ball, request, route)
            })
            .collect();
        TickOutput::Commands(commands)
    }

    /// Bind roles and run every robot's behavior. Any behavior error aborts
    /// the whole tick.
    fn dispatch(
        &mut self,
        world: &WorldData,
        strategy: Strategy,
    ) -> anyhow::Result<HashMap<PlayerId, MoveRequest>> {
        let goalie = self.goalie_override.unwrap_or(world.own_team.goalie);
        let zones = strategy.zones(world);
        let assignments = assign_roles(world, &self.controlled, goalie, strategy.roles, &zones);
        let params = ModeKind::for_world(world).params(world);

        let resolved: Vec<(PlayerId, RobotMode, Option<FieldZone>)> = assignments
            .iter()
            .map(|(id, a)| (*id, a.mode.resolve(world, a.zone), a.zone))
            .collect();
        let ranks = rank_by_y(world, &resolved);
        let runners: Vec<Vector2> = resolved
            .iter()
            .filter(|(_, mode, _)| *mode == RobotMode::Runner)
            .filter_map(|(id, _, _)| world.own_player(*id).map(|p| p.position))
            .collect();

        self.slots.retain(|id, _| assignments.contains_key(id));
        let mut requests = HashMap::new();
        for (id, mode, zone) in resolved {
            let player = world
                .own_player(id)
                .with_context(|| format!("no data for player {}", id))?;
            let slot = self.slots.entry(id).or_default();
            slot.assignment = assignments.get(&id).copied();

            if slot.behavior.as_ref().map(Behavior::mode) != Some(mode) {
                slot.behavior = Behavior::for_mode(mode, world);
                match &slot.behavior {
                    Some(_) => log::debug!("Player {} is now {}", id, mode),
                    None => {
                        log::warn!("No behavior for {} (player {})", mode, id);
                        continue;
                    }
                }
            }
            let Some(behavior) = slot.behavior.as_mut() else {
                continue;
            };

            let ctx = BehaviorCtx {
                world,
                player,
                zone,
                params: &params,
                rank: ranks.get(&id).copied().unwrap_or(Rank::SOLO),
                runners: &runners,
            };
            let request = behavior
                .update(&ctx)
                .with_context(|| format!("{} failed for player {}", mode, id))?;
            requests.insert(id, request);
        }
        Ok(requests)
    }
}

/// Rank robots sharing a role from north to south.
fn rank_by_y(
    world: &WorldData,
    resolved: &[(PlayerId, RobotMode, Option<FieldZone>)],
) -> HashMap<PlayerId, Rank> {
    let mut by_mode: HashMap<RobotMode, Vec<(PlayerId, f64)>> = HashMap::new();
    for (id, mode, _) in resolved {
        if let Some(player) = world.own_player(*id) {
            by_mode
                .entry(*mode)
                .or_default()
                .push((*id, player.position.y));
        }
    }
    let mut ranks = HashMap::new();
    for group in by_mode.values_mut() {
        group.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        let count = group.len();
        for (index, (id, _)) in group.iter().enumerate() {
            ranks.insert(*id, Rank { index, count });
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use holland_core::{
        BallData, FieldGeometry, GameState, GameStateData, PlayerData, TeamColor,
    };

    use super::*;

    fn world(robots: &[(u32, f64, f64)], ball: Option<(f64, f64)>, state: GameState) -> WorldData {
        let mut world = WorldData::new(TeamColor::Blue, Half::West, FieldGeometry::division_b());
        world.own_players = robots
            .iter()
            .map(|&(id, x, y)| {
                let mut p = PlayerData::new(PlayerId::new(id), TeamColor::Blue);
                p.position = Vector2::new(x, y);
                p
            })
            .collect();
        world.ball = ball.map(|(x, y)| BallData {
            timestamp: 0.0,
            position: Vector2::new(x, y),
            raw_position: Vector2::new(x, y),
            velocity: Vector2::zeros(),
        });
        world.game_state = GameStateData {
            game_state: state,
            operating_team: None,
            direct_free_kick: false,
        };
        world.own_team.goalie = PlayerId::new(0);
        world
    }

    const ROBOTS: [(u32, f64, f64); 6] = [
        (0, -4000.0, 0.0),
        (1, -1500.0, 2200.0),
        (2, -1500.0, -2200.0),
        (3, -3000.0, 500.0),
        (4, -3000.0, -500.0),
        (5, -2500.0, 0.0),
    ];

    fn controller() -> TeamController {
        TeamController::new(
            &ExecutorSettings::default(),
            (0..6).map(PlayerId::new).collect(),
        )
    }

    #[test]
    fn commands_for_every_controlled_robot() {
        let mut team = controller();
        let world = world(&ROBOTS, Some((-1190.0, 1825.0)), GameState::Run);
        let TickOutput::Commands(commands) = team.update(&world) else {
            panic!("expected commands");
        };
        assert_eq!(commands.len(), 6);
        assert_eq!(team.situation(), Some(Situation::ZonallyBackward));
        assert_eq!(team.behavior_mode(PlayerId::new(0)), Some(RobotMode::Keeper));
        let keeper = commands.iter().find(|c| c.robot_id == PlayerId::new(0)).unwrap();
        assert!(keeper.linear_speed > 0.0);
        let roles = team.assignments();
        assert_eq!(roles.len(), 6);
    }

    #[test]
    fn behavior_follows_role_change() {
        let mut team = controller();
        let north_ball = world(&ROBOTS, Some((-1190.0, 1825.0)), GameState::Run);
        team.update(&north_ball);
        assert_eq!(
            team.assignments()[&PlayerId::new(1)].mode,
            RobotMode::DisturberCoverer
        );
        assert_eq!(team.behavior_mode(PlayerId::new(1)), Some(RobotMode::Disturber));
        assert_eq!(team.behavior_mode(PlayerId::new(2)), Some(RobotMode::Coverer));

        let south_ball = world(&ROBOTS, Some((-1190.0, -1825.0)), GameState::Run);
        team.update(&south_ball);
        assert_eq!(team.behavior_mode(PlayerId::new(1)), Some(RobotMode::Coverer));
        assert_eq!(team.behavior_mode(PlayerId::new(2)), Some(RobotMode::Disturber));
    }

    #[test]
    fn halt_stops_everything() {
        let mut team = controller();
        let world = world(&ROBOTS, Some((0.0, 0.0)), GameState::Halt);
        assert_eq!(team.update(&world), TickOutput::StopAll);
        assert!(team.assignments().is_empty());
    }

    #[test]
    fn behavior_error_aborts_the_tick() {
        let mut team = controller();
        let mut world = world(&ROBOTS, None, GameState::PreparePenalty);
        world.game_state.operating_team = Some(TeamColor::Blue);
        // the penalty attacker is bound by zone and has no ball to play
        assert_eq!(team.update(&world), TickOutput::StopAll);
        assert_eq!(team.situation(), Some(Situation::PenaltyAttack));
    }

    #[test]
    fn unseen_robots_get_zero_commands() {
        let mut team = TeamController::new(
            &ExecutorSettings::default(),
            vec![PlayerId::new(0), PlayerId::new(9)],
        );
        let world = world(&ROBOTS[..1], Some((0.0, 0.0)), GameState::Run);
        let TickOutput::Commands(commands) = team.update(&world) else {
            panic!("expected commands");
        };
        assert_eq!(commands.len(), 2);
        let unseen = commands.iter().find(|c| c.robot_id == PlayerId::new(9)).unwrap();
        assert!(unseen.is_zero());
    }

    #[test]
    fn goalie_override() {
        let mut team = controller();
        team.set_goalie(Some(PlayerId::new(5)));
        let world = world(&ROBOTS, Some((1000.0, 0.0)), GameState::Run);
        team.update(&world);
        assert_eq!(team.behavior_mode(PlayerId::new(5)), Some(RobotMode::Keeper));
        assert_ne!(team.behavior_mode(PlayerId::new(0)), Some(RobotMode::Keeper));
    }

    #[test]
    fn ranks_north_first() {
        let world = world(&ROBOTS, None, GameState::Run);
        let resolved = vec![
            (PlayerId::new(4), RobotMode::KeeperDefender, None),
            (PlayerId::new(3), RobotMode::KeeperDefender, None),
            (PlayerId::new(5), RobotMode::Runner, None),
        ];
        let ranks = rank_by_y(&world, &resolved);
        assert_eq!(ranks[&PlayerId::new(3)], Rank { index: 0, count: 2 });
        assert_eq!(ranks[&PlayerId::new(4)], Rank { index: 1, count: 2 });
        assert_eq!(ranks[&PlayerId::new(5)], Rank::SOLO);
    }
}
