use holland_core::{math, Vector2};

use super::{direction, inward, rotate_toward_north, BehaviorCtx, ROBOT_RADIUS};
use crate::control::MoveRequest;

/// Walls the goal on an arc outside the defence area.
#[derive(Debug, Clone)]
pub struct KeeperDefender {
    goal_center: Vector2,
}

impl KeeperDefender {
    pub fn new(goal_center: Vector2) -> Self {
        Self { goal_center }
    }

    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let world = ctx.world;
        let into_field = inward(world.own_half);
        let ball = world.ball_position();
        let toward_ball = ball
            .map(|b| direction(self.goal_center, b, into_field))
            .unwrap_or(into_field);
        let dir = rotate_toward_north(
            toward_ball,
            ctx.rank.offset(ctx.params.keeper_defender_offset),
            world.own_half,
        );

        // Never stop inside the defence area, whose corners reach past the arc
        let geom = &world.field_geom;
        let exit = [
            (dir.x.abs(), geom.defense_radius),
            (dir.y.abs(), geom.defense_half_extent()),
        ]
        .iter()
        .filter(|(component, _)| *component > 1e-9)
        .map(|(component, extent)| extent / component)
        .fold(f64::INFINITY, f64::min);
        let radius = ctx
            .params
            .keeper_defender_distance
            .max(exit + ROBOT_RADIUS);

        let mut request = MoveRequest::new();
        request.with_destination(self.goal_center + dir * radius);
        if let Some(ball) = ball {
            request.with_target(ball);
        }
        request
    }
}

/// Marks the first opponent in its zone from the ball side.
#[derive(Debug, Clone)]
pub struct Coverer;

impl Coverer {
    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let world = ctx.world;
        let subject = match ctx.zone {
            Some(zone) => world
                .opp_players_in_zone(zone)
                .find(|p| !p.is_gone)
                .map(|p| p.position)
                .unwrap_or_else(|| world.zones.centroid(zone)),
            None => world.own_goal_center(),
        };

        let mut request = MoveRequest::new();
        match world.ball_position() {
            Some(ball) => {
                let toward_ball = direction(subject, ball, inward(world.own_half));
                request
                    .with_destination(subject + toward_ball * ctx.params.coverer_distance)
                    .with_target(ball);
            }
            None => {
                request.with_destination(subject);
            }
        }
        request
    }
}

/// Harasses the ball carrier from the side of our goal.
#[derive(Debug, Clone)]
pub struct Disturber;

impl Disturber {
    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let world = ctx.world;
        let mut request = MoveRequest::new();
        let Some(ball) = world.ball_position() else {
            return request;
        };
        let toward_goal = direction(ball, world.own_goal_center(), -inward(world.own_half));
        let dir = rotate_toward_north(
            toward_goal,
            ctx.rank.offset(ctx.params.disturber_offset),
            world.own_half,
        );
        request
            .with_destination(ball + dir * ctx.params.disturber_distance)
            .with_target(ball);
        request
    }
}

/// Stands off the goal post on the ball side, facing the nearest threat.
#[derive(Debug, Clone)]
pub struct GoalPostCoverer {
    goal_center: Vector2,
}

impl GoalPostCoverer {
    pub fn new(goal_center: Vector2) -> Self {
        Self { goal_center }
    }

    pub fn update(&mut self, ctx: &BehaviorCtx) -> MoveRequest {
        let world = ctx.world;
        let ball = world.ball_position();
        let side = match ball {
            Some(b) if b.y < 0.0 => -1.0,
            _ => 1.0,
        };
        let post = Vector2::new(
            self.goal_center.x,
            side * world.field_geom.goal_width / 2.0,
        );

        let threat = world.closest_opp_player_to(post).map(|p| p.position);
        let toward = threat
            .or_else(|| ctx.zone.map(|zone| world.zones.centroid(zone)))
            .unwrap_or_else(Vector2::zeros);
        let dir = direction(post, toward, inward(world.own_half));

        let mut request = MoveRequest::new();
        request.with_destination(post + dir * ctx.params.goal_post_distance);
        if let Some(target) = threat.or(ball) {
            request.with_target(target);
        }
        request
    }
}
