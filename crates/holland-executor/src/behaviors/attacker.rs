use anyhow::anyhow;
use holland_core::{math, Polygon, Vector2};

use super::{direction, inward, BehaviorCtx, BALL_RADIUS, ROBOT_RADIUS};
use crate::control::MoveRequest;

/// Distance to the shooting spot within which the attacker may shoot, in mm.
const SHOOT_DISTANCE: f64 = 10.0;
/// Heading error allowed when shooting, in degrees.
const SHOOT_ANGLE: f64 = 2.0;
/// Candidate aim points spread across the goal mouth.
const AIM_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shot {
    Kick(Vector2),
    Chip(Vector2),
}

impl Shot {
    fn target(&self) -> Vector2 {
        match self {
            Shot::Kick(p) | Shot::Chip(p) => *p,
        }
    }
}

/// Lines up behind the ball and shoots at the goal, or passes to a runner
/// when the goal is covered.
#[derive(Debug, Clone, Default)]
pub struct Attacker;

impl Attacker {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, ctx: &BehaviorCtx) -> anyhow::Result<MoveRequest> {
        let ball = ctx
            .world
            .ball_position()
            .ok_or_else(|| anyhow!("attacker {} has no ball to play", ctx.player.id))?;
        let shot = self.choose_shot(ctx, ball);
        let aim = shot.target();
        let shooting_spot = ball
            - direction(ball, aim, inward(ctx.world.own_half)) * ctx.params.attacker_behind_ball;

        let position = ctx.player.position;
        let heading_error = math::angle_delta_deg(
            ctx.player.yaw.degrees(),
            math::bearing_deg(position, aim),
        );
        let ready = math::distance(position, shooting_spot) < SHOOT_DISTANCE
            && heading_error.abs() <= SHOOT_ANGLE
            && ctx.params.kick_strength > 0;

        let mut request = MoveRequest::new();
        request.with_target(ball);
        if ready {
            request.with_destination(ball).with_dribble();
            match shot {
                Shot::Kick(_) => request.with_kick(ctx.params.kick_strength),
                Shot::Chip(_) => request.with_chip(ctx.params.kick_strength),
            };
            log::debug!(
                "Player {} shoots at ({:.0}, {:.0})",
                ctx.player.id,
                aim.x,
                aim.y
            );
        } else {
            request.with_destination(shooting_spot).with_avoid_ball(true);
        }
        Ok(request)
    }

    fn choose_shot(&self, ctx: &BehaviorCtx, ball: Vector2) -> Shot {
        let world = ctx.world;
        let goal = world.opp_goal_center();
        let (north, south) = world.field_geom.goal_posts(world.opp_half());
        let triangle = Polygon::new(vec![ball, north, south]);
        let opponents: Vec<Vector2> = world
            .opp_players
            .iter()
            .filter(|p| !p.is_gone)
            .map(|p| p.position)
            .collect();

        if !opponents.iter().any(|p| triangle.contains(*p)) {
            return Shot::Kick(goal);
        }

        let free_aim = (1..=AIM_POINTS)
            .map(|k| south + (north - south) * (k as f64 / (AIM_POINTS + 1) as f64))
            .map(|aim| {
                let clearance = opponents
                    .iter()
                    .map(|p| distance_to_segment(*p, ball, aim))
                    .fold(f64::INFINITY, f64::min);
                (aim, clearance)
            })
            .filter(|(_, clearance)| *clearance > ROBOT_RADIUS + BALL_RADIUS)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((aim, _)) = free_aim {
            return Shot::Kick(aim);
        }

        match ctx.runners.first() {
            Some(runner) => Shot::Chip(*runner),
            None => Shot::Kick(goal),
        }
    }
}

fn distance_to_segment(p: Vector2, a: Vector2, b: Vector2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < f64::EPSILON {
        return math::distance(p, a);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    math::distance(p, a + ab * t)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use holland_core::Angle;

    use super::*;
    use crate::behaviors::{tests::*, Rank};

    #[test]
    fn lines_up_behind_ball() {
        let world = world_with_ball(Some(Vector2::new(1000.0, 0.0)));
        let params = open_params(&world);
        let player = player_at(0.0, 500.0);
        let ctx = BehaviorCtx {
            world: &world,
            player: &player,
            zone: None,
            params: &params,
            rank: Rank::SOLO,
            runners: &[],
        };
        let request = Attacker::new().update(&ctx).unwrap();
        assert_relative_eq!(
            request.destination.unwrap(),
            Vector2::new(880.0, 0.0),
            epsilon = 1e-9
        );
        assert_eq!(request.kick, 0);
        assert!(request.avoid_ball);
    }

    #[test]
    fn shoots_when_aligned() {
        let world = world_with_ball(Some(Vector2::new(1000.0, 0.0)));
        let params = open_params(&world);
        let mut player = player_at(885.0, 0.0);
        player.yaw = Angle::from_degrees(0.0);
        let ctx = BehaviorCtx {
            world: &world,
            player: &player,
            zone: None,
            params: &params,
            rank: Rank::SOLO,
            runners: &[],
        };
        let request = Attacker::new().update(&ctx).unwrap();
        assert_eq!(request.kick, 40);
        assert_eq!(request.destination, Some(Vector2::new(1000.0, 0.0)));
    }

    #[test]
    fn aims_past_a_blocker() {
        let mut world = world_with_ball(Some(Vector2::new(3000.0, 0.0)));
        world.opp_players = vec![opponent_at(1, 4200.0, 0.0)];
        let params = open_params(&world);
        let player = player_at(2000.0, 0.0);
        let ctx = BehaviorCtx {
            world: &world,
            player: &player,
            zone: None,
            params: &params,
            rank: Rank::SOLO,
            runners: &[],
        };
        let shot = Attacker::new().choose_shot(&ctx, Vector2::new(3000.0, 0.0));
        let Shot::Kick(aim) = shot else {
            panic!("expected a kick");
        };
        assert_relative_eq!(aim.x, 4500.0);
        assert!(aim.y.abs() > 200.0);
    }

    #[test]
    fn passes_to_runner_when_goal_is_covered() {
        let mut world = world_with_ball(Some(Vector2::new(3000.0, 0.0)));
        world.opp_players = vec![
            opponent_at(1, 4400.0, 0.0),
            opponent_at(2, 4400.0, 250.0),
            opponent_at(3, 4400.0, -250.0),
        ];
        let params = open_params(&world);
        let player = player_at(2000.0, 0.0);
        let runners = [Vector2::new(2500.0, 2000.0)];
        let ctx = BehaviorCtx {
            world: &world,
            player: &player,
            zone: None,
            params: &params,
            rank: Rank::SOLO,
            runners: &runners,
        };
        let shot = Attacker::new().choose_shot(&ctx, Vector2::new(3000.0, 0.0));
        assert_eq!(shot, Shot::Chip(Vector2::new(2500.0, 2000.0)));
    }
}
