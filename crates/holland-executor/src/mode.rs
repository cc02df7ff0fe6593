//! Role assignment: binds the roles a strategy asks for to our robots.

use std::collections::BTreeMap;

use holland_core::{math, FieldZone, GameState, PlayerId, Vector2, WorldData};
use serde::{Deserialize, Serialize};

/// The tactical role of one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotMode {
    Keeper,
    KeeperDefender,
    Attacker,
    Runner,
    Coverer,
    Disturber,
    GoalPostCoverer,
    Counter,
    PenaltyKeeper,
    /// Disturber while the ball is in its zone, Coverer otherwise
    DisturberCoverer,
    /// KeeperDefender while the ball is in our half, Coverer otherwise
    KeeperDefenderCoverer,
}

impl RobotMode {
    pub fn is_keeper(&self) -> bool {
        matches!(self, RobotMode::Keeper | RobotMode::PenaltyKeeper)
    }

    /// Resolve the two conditional roles against the world. Plain roles map to
    /// themselves.
    pub fn resolve(&self, world: &WorldData, zone: Option<FieldZone>) -> RobotMode {
        match self {
            RobotMode::DisturberCoverer => {
                if zone.map(|z| world.is_ball_in_zone(z)).unwrap_or(false) {
                    RobotMode::Disturber
                } else {
                    RobotMode::Coverer
                }
            }
            RobotMode::KeeperDefenderCoverer => {
                if world.is_ball_in_own_half() {
                    RobotMode::KeeperDefender
                } else {
                    RobotMode::Coverer
                }
            }
            other => *other,
        }
    }
}

impl std::fmt::Display for RobotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RobotMode::Keeper => "KEEPER",
            RobotMode::KeeperDefender => "KEEPERDEFENDER",
            RobotMode::Attacker => "ATTACKER",
            RobotMode::Runner => "RUNNER",
            RobotMode::Coverer => "COVERER",
            RobotMode::Disturber => "DISTURBER",
            RobotMode::GoalPostCoverer => "GOALPOSTCOVERER",
            RobotMode::Counter => "COUNTER",
            RobotMode::PenaltyKeeper => "PENALTYKEEPER",
            RobotMode::DisturberCoverer => "DISTURBERCOVERER",
            RobotMode::KeeperDefenderCoverer => "KEEPERDEFENDERCOVERER",
        };
        write!(f, "{}", name)
    }
}

/// A role bound to a robot for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub mode: RobotMode,
    pub zone: Option<FieldZone>,
}

/// Bind every required role to a robot, in order.
///
/// Only robots in `controlled` that are currently visible are candidates.
/// Roles that cannot be filled are logged and left out.
pub fn assign_roles(
    world: &WorldData,
    controlled: &[PlayerId],
    goalie: PlayerId,
    roles: &[RobotMode],
    zones: &[(RobotMode, FieldZone)],
) -> BTreeMap<PlayerId, RoleAssignment> {
    let mut candidates: Vec<(PlayerId, Vector2)> = world
        .own_players
        .iter()
        .filter(|p| !p.is_gone && controlled.contains(&p.id))
        .map(|p| (p.id, p.position))
        .collect();
    candidates.sort_by_key(|(id, _)| *id);

    let mut assigned: BTreeMap<PlayerId, RoleAssignment> = BTreeMap::new();
    let mut used_zones = vec![false; zones.len()];
    let mut keeper_assigned = false;

    for &mode in roles {
        let free = |assigned: &BTreeMap<PlayerId, RoleAssignment>| {
            candidates
                .iter()
                .filter(|(id, _)| !assigned.contains_key(id))
                .copied()
                .collect::<Vec<_>>()
        };

        if mode.is_keeper() {
            if keeper_assigned {
                log::warn!("Skipping {}: a keeper is already assigned", mode);
            } else if assigned.contains_key(&goalie) {
                log::warn!("Skipping {}: goalie {} is already bound", mode, goalie);
            } else if !candidates.iter().any(|(id, _)| *id == goalie) {
                log::warn!("Skipping {}: goalie {} is not controlled or not seen", mode, goalie);
            } else {
                assigned.insert(goalie, RoleAssignment { mode, zone: None });
                keeper_assigned = true;
            }
            continue;
        }

        let zone_entry = zones
            .iter()
            .enumerate()
            .find(|(i, (m, _))| *m == mode && !used_zones[*i])
            .map(|(i, (_, zone))| (i, *zone));

        if let Some((entry, zone)) = zone_entry {
            used_zones[entry] = true;
            let centroid = world.zones.centroid(zone);
            match closest(&free(&assigned), centroid) {
                Some(id) => {
                    assigned.insert(
                        id,
                        RoleAssignment {
                            mode,
                            zone: Some(zone),
                        },
                    );
                }
                None => log::warn!("No robot left for {} in {}", mode, zone),
            }
            continue;
        }

        if matches!(mode, RobotMode::Attacker | RobotMode::Disturber) {
            let Some(ball) = world.ball_position() else {
                log::warn!("Skipping {}: ball unknown", mode);
                continue;
            };
            match closest(&free(&assigned), ball) {
                Some(id) => {
                    assigned.insert(id, RoleAssignment { mode, zone: None });
                }
                None => log::warn!("No robot left for {}", mode),
            }
            continue;
        }

        // Filler role, lowest id first
        match free(&assigned).first() {
            Some((id, _)) => {
                assigned.insert(*id, RoleAssignment { mode, zone: None });
            }
            None => log::debug!("No robot left for {}", mode),
        }
    }

    assigned
}

fn closest(candidates: &[(PlayerId, Vector2)], p: Vector2) -> Option<PlayerId> {
    candidates
        .iter()
        .min_by(|(_, a), (_, b)| {
            math::distance(*a, p)
                .partial_cmp(&math::distance(*b, p))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(id, _)| *id)
}

/// Which family of tactical parameters is in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    OpenPlay,
    /// Restarts the opponent takes, and every stoppage
    SetPiece,
}

impl ModeKind {
    pub fn for_world(world: &WorldData) -> Self {
        let state = world.game_state;
        match state.game_state {
            GameState::Run | GameState::PenaltyRun => ModeKind::OpenPlay,
            GameState::Stop | GameState::BallPlacement(_) => ModeKind::SetPiece,
            _ if state.is_operating(world.own_color) => ModeKind::OpenPlay,
            _ => ModeKind::SetPiece,
        }
    }

    pub fn params(&self, world: &WorldData) -> ModeParams {
        let geom = &world.field_geom;
        let defense_line = geom.defense_half_extent() + 200.0;
        let open = ModeParams {
            coverer_distance: 250.0,
            keeper_defender_distance: defense_line,
            keeper_defender_offset: 8.0,
            keeper_distance: geom.goal_width / 2.0,
            disturber_distance: 300.0,
            disturber_offset: 10.0,
            goal_post_distance: defense_line,
            kick_strength: 40,
            min_ball_distance: 0.0,
            attacker_behind_ball: 120.0,
        };
        match self {
            ModeKind::OpenPlay => open,
            ModeKind::SetPiece => {
                let stopped = matches!(
                    world.game_state.game_state,
                    GameState::Stop | GameState::BallPlacement(_)
                );
                ModeParams {
                    disturber_distance: 550.0,
                    min_ball_distance: 500.0,
                    kick_strength: if stopped { 0 } else { open.kick_strength },
                    ..open
                }
            }
        }
    }
}

/// Tactical parameters handed to the behaviors every tick. Distances in mm,
/// angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeParams {
    pub coverer_distance: f64,
    pub keeper_defender_distance: f64,
    /// Angle between neighbouring keeper defenders
    pub keeper_defender_offset: f64,
    pub keeper_distance: f64,
    pub disturber_distance: f64,
    pub disturber_offset: f64,
    pub goal_post_distance: f64,
    pub kick_strength: u8,
    /// Disturbers and coverers never come closer to the ball than this
    pub min_ball_distance: f64,
    pub attacker_behind_ball: f64,
}
