//! Per-robot behaviors. Each role maps to one variant of [`Behavior`].

mod attacker;
mod defender;
mod keeper;
mod support;

pub use attacker::Attacker;
pub use defender::{Coverer, Disturber, GoalPostCoverer, KeeperDefender};
pub use keeper::{Keeper, PenaltyKeeper};
pub use support::{Counter, Runner};

use holland_core::{math, Angle, FieldZone, Half, PlayerData, Vector2, WorldData};

use crate::{control::MoveRequest, mode::ModeParams, RobotMode};

/// Radius of a robot, in mm.
pub(crate) const ROBOT_RADIUS: f64 = 90.0;
pub(crate) const BALL_RADIUS: f64 = 22.0;

/// Position of a robot among the robots sharing its role, sorted north to
/// south.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub index: usize,
    pub count: usize,
}

impl Rank {
    pub const SOLO: Rank = Rank { index: 0, count: 1 };

    /// Angular offset in degrees for this rank. Neighbours are `2 * step`
    /// apart and the group is centred on zero, northmost robot first.
    pub fn offset(&self, step: f64) -> f64 {
        step * (self.count as f64 - 1.0 - 2.0 * self.index as f64)
    }
}

/// Everything a behavior may look at during one tick.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorCtx<'a> {
    pub world: &'a WorldData,
    pub player: &'a PlayerData,
    pub zone: Option<FieldZone>,
    pub params: &'a ModeParams,
    pub rank: Rank,
    /// Positions of our runners, for passes
    pub runners: &'a [Vector2],
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Keeper(Keeper),
    PenaltyKeeper(PenaltyKeeper),
    KeeperDefender(KeeperDefender),
    Attacker(Attacker),
    Runner(Runner),
    Counter(Counter),
    Coverer(Coverer),
    Disturber(Disturber),
    GoalPostCoverer(GoalPostCoverer),
}

impl Behavior {
    /// Build the behavior for a role. Conditional roles must be resolved
    /// first and yield `None`.
    pub fn for_mode(mode: RobotMode, world: &WorldData) -> Option<Behavior> {
        let own_goal = world.own_goal_center();
        let behavior = match mode {
            RobotMode::Keeper => Behavior::Keeper(Keeper::new(own_goal)),
            RobotMode::PenaltyKeeper => Behavior::PenaltyKeeper(PenaltyKeeper::new(own_goal)),
            RobotMode::KeeperDefender => Behavior::KeeperDefender(KeeperDefender::new(own_goal)),
            RobotMode::Attacker => Behavior::Attacker(Attacker::new()),
            RobotMode::Runner => Behavior::Runner(Runner),
            RobotMode::Counter => Behavior::Counter(Counter),
            RobotMode::Coverer => Behavior::Coverer(Coverer),
            RobotMode::Disturber => Behavior::Disturber(Disturber),
            RobotMode::GoalPostCoverer => {
                Behavior::GoalPostCoverer(GoalPostCoverer::new(own_goal))
            }
            RobotMode::DisturberCoverer | RobotMode::KeeperDefenderCoverer => return None,
        };
        Some(behavior)
    }

    pub fn mode(&self) -> RobotMode {
        match self {
            Behavior::Keeper(_) => RobotMode::Keeper,
            Behavior::PenaltyKeeper(_) => RobotMode::PenaltyKeeper,
            Behavior::KeeperDefender(_) => RobotMode::KeeperDefender,
            Behavior::Attacker(_) => RobotMode::Attacker,
            Behavior::Runner(_) => RobotMode::Runner,
            Behavior::Counter(_) => RobotMode::Counter,
            Behavior::Coverer(_) => RobotMode::Coverer,
            Behavior::Disturber(_) => RobotMode::Disturber,
            Behavior::GoalPostCoverer(_) => RobotMode::GoalPostCoverer,
        }
    }

    pub fn update(&mut self, ctx: &BehaviorCtx) -> anyhow::Result<MoveRequest> {
        let mut request = match self {
            Behavior::Keeper(b) => b.update(ctx),
            Behavior::PenaltyKeeper(b) => b.update(ctx),
            Behavior::KeeperDefender(b) => b.update(ctx),
            Behavior::Attacker(b) => b.update(ctx)?,
            Behavior::Runner(b) => b.update(ctx),
            Behavior::Counter(b) => b.update(ctx),
            Behavior::Coverer(b) => b.update(ctx),
            Behavior::Disturber(b) => b.update(ctx),
            Behavior::GoalPostCoverer(b) => b.update(ctx),
        };

        let keeps_distance = !matches!(
            self,
            Behavior::Keeper(_) | Behavior::PenaltyKeeper(_) | Behavior::Attacker(_)
        );
        let min_ball_distance = ctx.params.min_ball_distance;
        if let (true, Some(ball), Some(dest)) =
            (keeps_distance, ctx.world.ball_position(), request.destination)
        {
            if min_ball_distance > 0.0 {
                request.destination = Some(keep_away(dest, ball, min_ball_distance));
                request.avoid_ball = true;
            }
        }
        if let Some(dest) = request.destination {
            request.destination = Some(ctx.world.field_geom.clamp_to_field(dest, ROBOT_RADIUS));
        }
        Ok(request)
    }
}

/// Unit vector from `from` toward `to`, or `fallback` when they coincide.
pub(crate) fn direction(from: Vector2, to: Vector2, fallback: Vector2) -> Vector2 {
    let d = to - from;
    if d.norm() < 1e-6 {
        fallback
    } else {
        d.normalize()
    }
}

/// Unit vector pointing from our goal line into the field.
pub(crate) fn inward(own_half: Half) -> Vector2 {
    Vector2::new(-own_half.sign(), 0.0)
}

/// Rotate a direction by an offset where positive moves toward north as seen
/// from our goal.
pub(crate) fn rotate_toward_north(dir: Vector2, offset_deg: f64, own_half: Half) -> Vector2 {
    Angle::from_degrees(-own_half.sign() * offset_deg).rotate_vector(&dir)
}

/// Push `p` out to at least `distance` from the ball.
fn keep_away(p: Vector2, ball: Vector2, distance: f64) -> Vector2 {
    if math::distance(p, ball) >= distance {
        return p;
    }
    ball + direction(ball, p, Vector2::new(0.0, 1.0)) * distance
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;
    use holland_core::{BallData, FieldGeometry, PlayerId, TeamColor};

    use super::*;
    use crate::mode::ModeKind;

    pub fn world_with_ball(ball: Option<Vector2>) -> WorldData {
        let mut world = WorldData::new(TeamColor::Blue, Half::West, FieldGeometry::division_b());
        world.ball = ball.map(|position| BallData {
            timestamp: 0.0,
            position,
            raw_position: position,
            velocity: Vector2::zeros(),
        });
        world
    }

    pub fn player_at(x: f64, y: f64) -> PlayerData {
        let mut p = PlayerData::new(PlayerId::new(1), TeamColor::Blue);
        p.position = Vector2::new(x, y);
        p
    }

    pub fn opponent_at(id: u32, x: f64, y: f64) -> PlayerData {
        let mut p = PlayerData::new(PlayerId::new(id), TeamColor::Yellow);
        p.position = Vector2::new(x, y);
        p
    }

    pub fn open_params(world: &WorldData) -> ModeParams {
        ModeKind::OpenPlay.params(world)
    }

    #[test]
    fn rank_offsets() {
        assert_relative_eq!(Rank::SOLO.offset(8.0), 0.0);
        assert_relative_eq!(Rank { index: 0, count: 2 }.offset(8.0), 8.0);
        assert_relative_eq!(Rank { index: 1, count: 2 }.offset(8.0), -8.0);
        assert_relative_eq!(Rank { index: 0, count: 3 }.offset(8.0), 16.0);
        assert_relative_eq!(Rank { index: 2, count: 3 }.offset(8.0), -16.0);
    }

    #[test]
    fn north_rotation_is_mirrored() {
        let west = rotate_toward_north(inward(Half::West), 90.0, Half::West);
        let east = rotate_toward_north(inward(Half::East), 90.0, Half::East);
        assert_relative_eq!(west, Vector2::new(0.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(east, Vector2::new(0.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn factory_matches_mode() {
        let world = world_with_ball(None);
        for mode in [
            RobotMode::Keeper,
            RobotMode::PenaltyKeeper,
            RobotMode::KeeperDefender,
            RobotMode::Attacker,
            RobotMode::Runner,
            RobotMode::Counter,
            RobotMode::Coverer,
            RobotMode::Disturber,
            RobotMode::GoalPostCoverer,
        ] {
            let behavior = Behavior::for_mode(mode, &world).unwrap();
            assert_eq!(behavior.mode(), mode);
        }
        assert!(Behavior::for_mode(RobotMode::DisturberCoverer, &world).is_none());
    }

    #[test]
    fn set_piece_keeps_away_from_ball() {
        let mut world = world_with_ball(Some(Vector2::new(0.0, 0.0)));
        world.game_state.game_state = holland_core::GameState::Stop;
        let params = ModeKind::SetPiece.params(&world);
        let player = player_at(-2000.0, 0.0);
        let ctx = BehaviorCtx {
            world: &world,
            player: &player,
            zone: None,
            params: &params,
            rank: Rank::SOLO,
            runners: &[],
        };
        let mut behavior = Behavior::for_mode(RobotMode::Disturber, &world).unwrap();
        let request = behavior.update(&ctx).unwrap();
        let dest = request.destination.unwrap();
        assert!(math::distance(dest, Vector2::zeros()) >= 500.0 - 1e-9);
        assert!(request.avoid_ball);
        assert_eq!(request.kick, 0);
    }

    #[test]
    fn attacker_without_ball_fails() {
        let world = world_with_ball(None);
        let params = open_params(&world);
        let player = player_at(0.0, 0.0);
        let ctx = BehaviorCtx {
            world: &world,
            player: &player,
            zone: None,
            params: &params,
            rank: Rank::SOLO,
            runners: &[],
        };
        let mut behavior = Behavior::for_mode(RobotMode::Attacker, &world).unwrap();
        assert!(behavior.update(&ctx).is_err());
    }
}
