//! Role tables per game situation and the choice of situation.

use holland_core::{
    FieldZone, GameState, Half, Situation, StrategySettings, Vector2, WorldData, ZoneArea,
};

use crate::RobotMode;

/// A half named relative to our team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Own,
    Opp,
}

/// A zone named relative to our team, resolved once the side we defend is
/// known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneRef {
    pub side: Side,
    pub area: ZoneArea,
}

impl ZoneRef {
    pub const fn own(area: ZoneArea) -> Self {
        Self {
            side: Side::Own,
            area,
        }
    }

    pub const fn opp(area: ZoneArea) -> Self {
        Self {
            side: Side::Opp,
            area,
        }
    }

    pub fn resolve(&self, own_half: Half) -> FieldZone {
        let half = match self.side {
            Side::Own => own_half,
            Side::Opp => own_half.opposite(),
        };
        FieldZone::new(half, self.area)
    }
}

type ZoneResolver = fn(&WorldData) -> Vec<(RobotMode, ZoneRef)>;

/// Ordered roles for a situation plus the zones some of them are bound to.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub situation: Situation,
    pub roles: &'static [RobotMode],
    resolver: ZoneResolver,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("situation", &self.situation)
            .field("roles", &self.roles)
            .finish()
    }
}

use RobotMode::*;

impl Strategy {
    pub fn for_situation(situation: Situation) -> Strategy {
        let (roles, resolver): (&'static [RobotMode], ZoneResolver) = match situation {
            Situation::ZonallyForward => (
                &[Keeper, KeeperDefender, KeeperDefender, Counter, DisturberCoverer, DisturberCoverer],
                zonally_forward,
            ),
            Situation::ZonallyBackward => (
                &[
                    Keeper,
                    DisturberCoverer,
                    DisturberCoverer,
                    KeeperDefender,
                    KeeperDefenderCoverer,
                    KeeperDefenderCoverer,
                ],
                zonally_backward,
            ),
            Situation::BarricadeDefending => (
                &[Keeper, KeeperDefender, KeeperDefender, Disturber, GoalPostCoverer],
                barricade_defending,
            ),
            Situation::ForwardDefending => (
                &[Keeper, Counter, Coverer, Coverer, KeeperDefender, KeeperDefender],
                forward_defending,
            ),
            Situation::FreeShotRoundPlay => (
                &[Keeper, Attacker, Runner, Runner, KeeperDefender, KeeperDefender],
                runners_around_ball,
            ),
            Situation::KickoffPrepare => (
                &[Keeper, Attacker, Runner, Runner, KeeperDefender, KeeperDefender],
                kickoff_prepare,
            ),
            Situation::KickoffDefending => (
                &[Keeper, Coverer, Coverer, Coverer, KeeperDefender, KeeperDefender],
                kickoff_defending,
            ),
            Situation::PenaltyAttack => (
                &[Keeper, Attacker, Runner, Runner, KeeperDefender, KeeperDefender],
                penalty_attack,
            ),
            Situation::PenaltyDefense => (
                &[PenaltyKeeper, Runner, Runner, Runner, Runner, Counter],
                penalty_defense,
            ),
            Situation::DirectFreeKickAttack => (
                &[Keeper, KeeperDefender, KeeperDefender, Attacker, Runner, Runner],
                runners_around_ball,
            ),
            Situation::FreeKickForward => (
                &[Keeper, Attacker, Runner, Runner, KeeperDefender, KeeperDefender],
                free_kick_forward,
            ),
            Situation::DirectFreeKickDefense => (
                &[Keeper, Disturber, Coverer, KeeperDefender, KeeperDefender, KeeperDefender],
                direct_free_kick_defense,
            ),
            Situation::IndirectFreeKickDefense => (
                &[Keeper, GoalPostCoverer, Coverer, Coverer, KeeperDefender, KeeperDefender],
                indirect_free_kick_defense,
            ),
            Situation::FreeKickDefending => (
                &[Keeper, GoalPostCoverer, Disturber, Coverer, KeeperDefender, KeeperDefender],
                free_kick_defending,
            ),
        };
        Strategy {
            situation,
            roles,
            resolver,
        }
    }

    /// The zone-bound roles of this strategy, on absolute halves.
    pub fn zones(&self, world: &WorldData) -> Vec<(RobotMode, FieldZone)> {
        (self.resolver)(world)
            .into_iter()
            .map(|(mode, zone)| (mode, zone.resolve(world.own_half)))
            .collect()
    }
}

/// Pick the situation to play. `None` means all robots must stop.
pub fn select_situation(world: &WorldData, settings: &StrategySettings) -> Option<Situation> {
    let state = &world.game_state;
    let ours = state.is_operating(world.own_color);
    let situation = match state.game_state {
        GameState::Halt | GameState::Timeout | GameState::Unknown => return None,
        GameState::PrepareKickoff | GameState::Kickoff => {
            if ours {
                Situation::KickoffPrepare
            } else {
                Situation::KickoffDefending
            }
        }
        GameState::PreparePenalty | GameState::Penalty | GameState::PenaltyRun => {
            if ours {
                Situation::PenaltyAttack
            } else {
                Situation::PenaltyDefense
            }
        }
        GameState::FreeKick => match (state.direct_free_kick, ours) {
            (true, true) => Situation::DirectFreeKickAttack,
            (true, false) => Situation::DirectFreeKickDefense,
            (false, true) => Situation::FreeKickForward,
            (false, false) => Situation::IndirectFreeKickDefense,
        },
        GameState::Stop | GameState::BallPlacement(_) => Situation::FreeKickDefending,
        GameState::Run => {
            if world.ally_has_ball(settings.possession_distance) {
                settings.open_play_attack
            } else if world.ball_position().is_some() && !world.is_ball_in_own_half() {
                Situation::ZonallyForward
            } else {
                settings.open_play_defense
            }
        }
    };
    Some(situation)
}

fn ball(world: &WorldData) -> Vector2 {
    world.ball_position().unwrap_or_else(Vector2::zeros)
}

/// Limit of the central band used to tell a wing ball from a central one.
fn band(world: &WorldData) -> f64 {
    world.zones.palette().h.y
}

fn zonally_forward(_: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    vec![
        (DisturberCoverer, ZoneRef::own(ZoneArea::NorthFront)),
        (DisturberCoverer, ZoneRef::own(ZoneArea::SouthFront)),
        (Counter, ZoneRef::opp(ZoneArea::Center)),
    ]
}

fn zonally_backward(_: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    vec![
        (DisturberCoverer, ZoneRef::own(ZoneArea::NorthFront)),
        (DisturberCoverer, ZoneRef::own(ZoneArea::SouthFront)),
        (KeeperDefenderCoverer, ZoneRef::own(ZoneArea::NorthSecondPost)),
        (KeeperDefenderCoverer, ZoneRef::own(ZoneArea::SouthSecondPost)),
    ]
}

fn barricade_defending(world: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    let post = if ball(world).y <= 0.0 {
        ZoneArea::SouthSecondPost
    } else {
        ZoneArea::NorthSecondPost
    };
    vec![(GoalPostCoverer, ZoneRef::own(post))]
}

fn forward_defending(world: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    let occupied = |area: ZoneArea| {
        let zone = ZoneRef::own(area).resolve(world.own_half);
        world.opp_players_in_zone(zone).any(|p| !p.is_gone)
    };

    let first = [
        ZoneArea::NorthSecondPost,
        ZoneArea::SouthSecondPost,
        ZoneArea::NorthCorner,
        ZoneArea::SouthCorner,
        ZoneArea::NorthFront,
        ZoneArea::SouthFront,
    ]
    .into_iter()
    .find(|area| occupied(*area))
    .unwrap_or(if ball(world).y > 0.0 {
        ZoneArea::NorthSecondPost
    } else {
        ZoneArea::SouthSecondPost
    });

    let second = [
        ZoneArea::Center,
        ZoneArea::Middle,
        ZoneArea::NorthFront,
        ZoneArea::SouthFront,
    ]
    .into_iter()
    .find(|area| *area != first && occupied(*area))
    .unwrap_or(ZoneArea::Middle);

    vec![
        (Coverer, ZoneRef::own(first)),
        (Coverer, ZoneRef::own(second)),
        (Counter, ZoneRef::opp(ZoneArea::Center)),
    ]
}

/// Runner spots for our open play and direct free kicks.
fn runners_around_ball(world: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    let y = ball(world).y;
    let h = band(world);
    let (a, b) = if y > h {
        (ZoneArea::Middle, ZoneArea::SouthSecondPost)
    } else if y < -h {
        (ZoneArea::Middle, ZoneArea::NorthSecondPost)
    } else {
        (ZoneArea::NorthSecondPost, ZoneArea::SouthSecondPost)
    };
    vec![(Runner, ZoneRef::opp(a)), (Runner, ZoneRef::opp(b))]
}

fn kickoff_prepare(_: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    vec![
        (Runner, ZoneRef::own(ZoneArea::NorthFront)),
        (Runner, ZoneRef::own(ZoneArea::SouthFront)),
    ]
}

fn kickoff_defending(_: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    vec![
        (Coverer, ZoneRef::own(ZoneArea::NorthFront)),
        (Coverer, ZoneRef::own(ZoneArea::SouthFront)),
        (Coverer, ZoneRef::own(ZoneArea::Middle)),
    ]
}

fn penalty_attack(_: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    vec![
        (Attacker, ZoneRef::opp(ZoneArea::NorthGoal)),
        (Runner, ZoneRef::opp(ZoneArea::NorthFront)),
        (Runner, ZoneRef::opp(ZoneArea::SouthFront)),
    ]
}

fn penalty_defense(_: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    vec![(Counter, ZoneRef::opp(ZoneArea::Middle))]
}

fn free_kick_forward(_: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    vec![
        (Runner, ZoneRef::opp(ZoneArea::SouthFront)),
        (Runner, ZoneRef::opp(ZoneArea::NorthFront)),
    ]
}

fn direct_free_kick_defense(world: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    let y = ball(world).y;
    let h = band(world);
    let area = if y > h {
        ZoneArea::SouthFront
    } else if y < -h {
        ZoneArea::NorthFront
    } else {
        ZoneArea::Middle
    };
    vec![(Coverer, ZoneRef::own(area))]
}

fn indirect_free_kick_defense(world: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    let (post, other) = if ball(world).y > 0.0 {
        (ZoneArea::NorthSecondPost, ZoneArea::SouthSecondPost)
    } else {
        (ZoneArea::SouthSecondPost, ZoneArea::NorthSecondPost)
    };
    vec![
        (GoalPostCoverer, ZoneRef::own(post)),
        (Coverer, ZoneRef::own(other)),
        (Coverer, ZoneRef::own(ZoneArea::Middle)),
    ]
}

fn free_kick_defending(world: &WorldData) -> Vec<(RobotMode, ZoneRef)> {
    let entries = vec![
        (GoalPostCoverer, ZoneRef::own(ZoneArea::SouthSecondPost)),
        (Disturber, ZoneRef::own(ZoneArea::SouthFront)),
        (Coverer, ZoneRef::own(ZoneArea::NorthFront)),
    ];
    if ball(world).y <= 0.0 {
        entries
    } else {
        entries
            .into_iter()
            .map(|(mode, zone)| (mode, ZoneRef::own(zone.area.mirror_y())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use holland_core::{
        BallData, FieldGeometry, GameStateData, PlayerData, PlayerId, TeamColor,
    };

    use super::*;

    fn world(ball: Option<(f64, f64)>, state: GameState, operating: Option<TeamColor>) -> WorldData {
        let mut world = WorldData::new(TeamColor::Blue, Half::West, FieldGeometry::division_b());
        world.ball = ball.map(|(x, y)| BallData {
            timestamp: 0.0,
            position: Vector2::new(x, y),
            raw_position: Vector2::new(x, y),
            velocity: Vector2::zeros(),
        });
        world.game_state = GameStateData {
            game_state: state,
            operating_team: operating,
            direct_free_kick: false,
        };
        world
    }

    #[test]
    fn every_table_has_one_keeper_first() {
        for situation in [
            Situation::ZonallyForward,
            Situation::ZonallyBackward,
            Situation::BarricadeDefending,
            Situation::ForwardDefending,
            Situation::FreeShotRoundPlay,
            Situation::KickoffPrepare,
            Situation::KickoffDefending,
            Situation::PenaltyAttack,
            Situation::PenaltyDefense,
            Situation::DirectFreeKickAttack,
            Situation::FreeKickForward,
            Situation::DirectFreeKickDefense,
            Situation::IndirectFreeKickDefense,
            Situation::FreeKickDefending,
        ] {
            let strategy = Strategy::for_situation(situation);
            assert!(strategy.roles.len() <= 6, "{}", situation);
            assert_eq!(strategy.roles.iter().filter(|r| r.is_keeper()).count(), 1);
            assert!(strategy.roles[0].is_keeper());

            // every zone entry belongs to a role the table asks for
            let world = world(Some((0.0, 0.0)), GameState::Run, None);
            for (mode, _) in strategy.zones(&world) {
                let wanted = strategy.roles.iter().filter(|r| **r == mode).count();
                let zoned = strategy
                    .zones(&world)
                    .iter()
                    .filter(|(m, _)| *m == mode)
                    .count();
                assert!(zoned <= wanted, "{} {}", situation, mode);
            }
        }
    }

    #[test]
    fn zones_follow_the_defended_side() {
        let strategy = Strategy::for_situation(Situation::ZonallyForward);
        let mut world = world(Some((0.0, 0.0)), GameState::Run, None);
        let west = strategy.zones(&world);
        assert_eq!(west[0].1, FieldZone::new(Half::West, ZoneArea::NorthFront));
        assert_eq!(west[2].1, FieldZone::new(Half::East, ZoneArea::Center));

        world.own_half = Half::East;
        let east = strategy.zones(&world);
        assert_eq!(east[0].1, FieldZone::new(Half::East, ZoneArea::NorthFront));
        assert_eq!(east[2].1, FieldZone::new(Half::West, ZoneArea::Center));
    }

    #[test]
    fn runner_zones_follow_the_ball() {
        let strategy = Strategy::for_situation(Situation::FreeShotRoundPlay);
        let north = strategy.zones(&world(Some((0.0, 2000.0)), GameState::Run, None));
        assert_eq!(
            north.iter().map(|z| z.1.area).collect::<Vec<_>>(),
            vec![ZoneArea::Middle, ZoneArea::SouthSecondPost]
        );
        let center = strategy.zones(&world(Some((0.0, 100.0)), GameState::Run, None));
        assert_eq!(
            center.iter().map(|z| z.1.area).collect::<Vec<_>>(),
            vec![ZoneArea::NorthSecondPost, ZoneArea::SouthSecondPost]
        );
    }

    #[test]
    fn free_kick_defending_mirrors() {
        let strategy = Strategy::for_situation(Situation::FreeKickDefending);
        let south = strategy.zones(&world(Some((0.0, -100.0)), GameState::Stop, None));
        assert_eq!(south[0].1.area, ZoneArea::SouthSecondPost);
        let north = strategy.zones(&world(Some((0.0, 100.0)), GameState::Stop, None));
        assert_eq!(north[0].1.area, ZoneArea::NorthSecondPost);
        assert_eq!(north[1].1.area, ZoneArea::NorthFront);
        assert_eq!(north[2].1.area, ZoneArea::SouthFront);
    }

    #[test]
    fn forward_defending_marks_occupied_zones() {
        let mut world = world(Some((0.0, 0.0)), GameState::Run, None);
        let mut opp = PlayerData::new(PlayerId::new(3), TeamColor::Yellow);
        opp.position = Vector2::new(-3000.0, -2500.0);
        world.opp_players = vec![opp];
        let zones = Strategy::for_situation(Situation::ForwardDefending).zones(&world);
        assert_eq!(zones[0].1, FieldZone::new(Half::West, ZoneArea::SouthCorner));
        assert_eq!(zones[1].1, FieldZone::new(Half::West, ZoneArea::Middle));
    }

    #[test]
    fn situation_from_game_state() {
        let settings = StrategySettings::default();
        let select = |w: &WorldData| select_situation(w, &settings);

        assert_eq!(select(&world(None, GameState::Halt, None)), None);
        assert_eq!(select(&world(None, GameState::Timeout, None)), None);
        assert_eq!(
            select(&world(None, GameState::PrepareKickoff, Some(TeamColor::Blue))),
            Some(Situation::KickoffPrepare)
        );
        assert_eq!(
            select(&world(None, GameState::Kickoff, Some(TeamColor::Yellow))),
            Some(Situation::KickoffDefending)
        );
        assert_eq!(
            select(&world(None, GameState::PreparePenalty, Some(TeamColor::Yellow))),
            Some(Situation::PenaltyDefense)
        );
        assert_eq!(
            select(&world(None, GameState::Stop, None)),
            Some(Situation::FreeKickDefending)
        );

        let mut free_kick = world(None, GameState::FreeKick, Some(TeamColor::Blue));
        assert_eq!(select(&free_kick), Some(Situation::FreeKickForward));
        free_kick.game_state.direct_free_kick = true;
        assert_eq!(select(&free_kick), Some(Situation::DirectFreeKickAttack));
        free_kick.game_state.operating_team = Some(TeamColor::Yellow);
        assert_eq!(select(&free_kick), Some(Situation::DirectFreeKickDefense));
    }

    #[test]
    fn open_play_situations() {
        let settings = StrategySettings::default();
        let mut run = world(Some((1000.0, 0.0)), GameState::Run, None);
        assert_eq!(
            select_situation(&run, &settings),
            Some(Situation::ZonallyForward)
        );

        run.ball.as_mut().unwrap().position = Vector2::new(-1000.0, 0.0);
        assert_eq!(
            select_situation(&run, &settings),
            Some(Situation::ZonallyBackward)
        );

        let mut own = PlayerData::new(PlayerId::new(1), TeamColor::Blue);
        own.position = Vector2::new(-1100.0, 0.0);
        run.own_players = vec![own];
        assert_eq!(
            select_situation(&run, &settings),
            Some(Situation::FreeShotRoundPlay)
        );
    }
}
