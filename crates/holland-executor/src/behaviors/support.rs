use holland_core::{FieldZone, Vector2, ZoneArea};

use super::BehaviorCtx;
use crate::control::MoveRequest;

/// Waits for a pass in its zone.
#[derive(Debug, Clone)]
pub struct Runner;

impl Runner {
    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let dest = ctx
            .zone
            .map(|zone| ctx.world.zones.centroid(zone))
            .unwrap_or_else(Vector2::zeros);
        hold_facing_ball(ctx, dest)
    }
}

/// Stays forward for a counter attack.
#[derive(Debug, Clone)]
pub struct Counter;

impl Counter {
    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let zone = ctx
            .zone
            .unwrap_or_else(|| FieldZone::new(ctx.world.opp_half(), ZoneArea::Middle));
        hold_facing_ball(ctx, ctx.world.zones.centroid(zone))
    }
}

fn hold_facing_ball(ctx: &BehaviorCtx, dest: Vector2) -> MoveRequest {
    let mut request = MoveRequest::new();
    request.with_destination(dest);
    if let Some(ball) = ctx.world.ball_position() {
        request.with_target(ball);
    }
    request
}
