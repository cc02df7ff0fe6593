use holland_core::{math, FieldZone, Vector2, ZoneArea};

use super::{direction, inward, BehaviorCtx, ROBOT_RADIUS};
use crate::control::MoveRequest;

/// How far the keeper stays in front of the goal line, in mm.
const GOAL_LINE_MARGIN: f64 = 100.0;
/// Distance from its spot below which the keeper stops moving, in mm.
const HOLD_DISTANCE: f64 = 15.0;

/// Guards the goal on a half circle around the goal centre.
#[derive(Debug, Clone)]
pub struct Keeper {
    goal_center: Vector2,
}

impl Keeper {
    pub fn new(goal_center: Vector2) -> Self {
        Self { goal_center }
    }

    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let world = ctx.world;
        let mut request = MoveRequest::new();
        let into_field = inward(world.own_half);
        let Some(ball) = world.ball_position() else {
            request.with_destination(self.goal_center + into_field * GOAL_LINE_MARGIN);
            return request;
        };

        let goal_zones = [ZoneArea::NorthGoal, ZoneArea::SouthGoal]
            .map(|area| FieldZone::new(world.own_half, area));
        let dest = if goal_zones.iter().any(|z| world.zones.contains(*z, ball)) {
            ball
        } else {
            let toward_ball = direction(self.goal_center, ball, into_field);
            let mut dest = self.goal_center + toward_ball * ctx.params.keeper_distance;
            let min_x = self.goal_center.x + into_field.x * GOAL_LINE_MARGIN;
            if (dest.x - min_x) * into_field.x < 0.0 {
                dest.x = min_x;
            }
            let max_y = world.field_geom.half_width() - GOAL_LINE_MARGIN;
            dest.y = dest.y.clamp(-max_y, max_y);
            dest
        };

        if math::distance(ctx.player.position, dest) >= HOLD_DISTANCE {
            request.with_destination(dest);
        }
        request.with_target(ball);
        request
    }
}

/// Stays on the goal line facing a penalty, covering the shooter's line.
#[derive(Debug, Clone)]
pub struct PenaltyKeeper {
    goal_center: Vector2,
}

impl PenaltyKeeper {
    pub fn new(goal_center: Vector2) -> Self {
        Self { goal_center }
    }

    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let world = ctx.world;
        let mut request = MoveRequest::new();
        let x = self.goal_center.x + inward(world.own_half).x * ROBOT_RADIUS;
        let max_y = (world.field_geom.goal_width / 2.0 - ROBOT_RADIUS).max(0.0);

        let Some(ball) = world.ball_position() else {
            request.with_destination(Vector2::new(x, 0.0));
            return request;
        };

        let y = world
            .closest_opp_player_to(ball)
            .and_then(|shooter| {
                math::find_intersection(
                    shooter.position,
                    ball - shooter.position,
                    Vector2::new(x, 0.0),
                    Vector2::new(0.0, 1.0),
                )
            })
            .map(|p| p.y)
            .unwrap_or(ball.y);

        request
            .with_destination(Vector2::new(x, y.clamp(-max_y, max_y)))
            .with_target(ball);
        request
    }
}
