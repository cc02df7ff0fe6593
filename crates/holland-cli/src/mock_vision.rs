use std::f64::consts::PI;

use holland_core::{
    BallDetection, FieldGeometry, PlayerId, RobotCmd, RobotDetection, TeamColor, Vector2,
    VisionFrame,
};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Distance from the robot center at which the ball can be kicked, in mm.
const KICK_REACH: f64 = 150.0;
/// Ball speed per unit of kick strength, in mm/s.
const KICK_SPEED_PER_UNIT: f64 = 100.0;
/// Rolling deceleration of the ball, in mm/s^2.
const BALL_DECELERATION: f64 = 400.0;
const POSITION_NOISE_STD: f64 = 2.0;
const ORIENTATION_NOISE_STD: f64 = 0.005;

pub struct MockPlayer {
    id: PlayerId,
    color: TeamColor,
    position: Vector2,
    /// Heading in radians
    orientation: f64,
}

pub struct MockBall {
    position: Vector2,
    velocity: Vector2,
}

/// A kinematic stand-in for the vision system.
///
/// Our robots follow their commands exactly, the opponents stand still, and
/// every detection gets a little gaussian noise.
pub struct MockVision {
    geometry: FieldGeometry,
    players: Vec<MockPlayer>,
    ball: MockBall,
    own_color: TeamColor,
    t: f64,
    rng: StdRng,
    position_noise: Normal<f64>,
    orientation_noise: Normal<f64>,
}

impl MockVision {
    pub fn new(own_color: TeamColor, own_ids: &[PlayerId], seed: u64) -> anyhow::Result<Self> {
        let geometry = FieldGeometry::division_b();

        let mut players = Vec::new();
        for (i, id) in own_ids.iter().enumerate() {
            players.push(MockPlayer {
                id: *id,
                color: own_color,
                position: Vector2::new(-1500.0, (i as f64 - 2.5) * 600.0),
                orientation: 0.0,
            });
        }
        for i in 0..6u32 {
            players.push(MockPlayer {
                id: PlayerId::new(i),
                color: own_color.opposite(),
                position: Vector2::new(1500.0, (i as f64 - 2.5) * 600.0),
                orientation: PI,
            });
        }

        Ok(Self {
            geometry,
            players,
            ball: MockBall {
                position: Vector2::zeros(),
                velocity: Vector2::zeros(),
            },
            own_color,
            t: 0.0,
            rng: StdRng::seed_from_u64(seed),
            position_noise: Normal::new(0.0, POSITION_NOISE_STD)?,
            orientation_noise: Normal::new(0.0, ORIENTATION_NOISE_STD)?,
        })
    }

    pub fn geometry(&self) -> FieldGeometry {
        self.geometry
    }

    /// Move our robots and the ball forward by `dt` seconds.
    pub fn step(&mut self, commands: &[RobotCmd], dt: f64) {
        for cmd in commands {
            let Some(player) = self
                .players
                .iter_mut()
                .find(|p| p.color == self.own_color && p.id == cmd.robot_id)
            else {
                continue;
            };

            let bearing = player.orientation - cmd.rotation_to_face.to_radians();
            let velocity = Vector2::new(bearing.cos(), bearing.sin()) * cmd.linear_speed;
            player.position = self
                .geometry
                .clamp_to_field(player.position + velocity * dt, 0.0);
            player.orientation = wrap_angle(player.orientation + cmd.rotation_speed * dt);

            let strength = cmd.kick_strength.max(cmd.chip_strength);
            if strength > 0 && (self.ball.position - player.position).norm() < KICK_REACH {
                let heading = Vector2::new(player.orientation.cos(), player.orientation.sin());
                self.ball.velocity = heading * f64::from(strength) * KICK_SPEED_PER_UNIT;
                log::debug!("Robot {} kicked with strength {}", cmd.robot_id, strength);
            }
        }

        let speed = self.ball.velocity.norm();
        if speed > 0.0 {
            let slowed = (speed - BALL_DECELERATION * dt).max(0.0);
            self.ball.velocity *= slowed / speed;
            self.ball.position += self.ball.velocity * dt;
        }
        if !self.geometry.is_in_field(self.ball.position) {
            log::info!("Ball left the field, putting it back on the center mark");
            self.ball = MockBall {
                position: Vector2::zeros(),
                velocity: Vector2::zeros(),
            };
        }
        self.t += dt;
    }

    /// A noisy detection frame of the current state.
    pub fn frame(&mut self) -> VisionFrame {
        let mut robots = Vec::with_capacity(self.players.len());
        for player in &self.players {
            robots.push(RobotDetection {
                id: player.id,
                color: player.color,
                x: player.position.x + self.position_noise.sample(&mut self.rng),
                y: player.position.y + self.position_noise.sample(&mut self.rng),
                orientation: wrap_angle(
                    player.orientation + self.orientation_noise.sample(&mut self.rng),
                ),
                camera_id: 0,
            });
        }
        let ball = BallDetection {
            x: self.ball.position.x + self.position_noise.sample(&mut self.rng),
            y: self.ball.position.y + self.position_noise.sample(&mut self.rng),
            confidence: 1.0,
            camera_id: 0,
        };
        VisionFrame {
            t_capture: self.t,
            balls: vec![ball],
            robots,
        }
    }
}

fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn robot_follows_command() {
        let id = PlayerId::new(3);
        let mut vision = MockVision::new(TeamColor::Blue, &[id], 7).unwrap();
        let cmd = RobotCmd {
            robot_id: id,
            rotation_to_face: -90.0,
            linear_speed: 1000.0,
            ..RobotCmd::zero(id)
        };
        let start = vision.players[0].position;
        vision.step(&[cmd], 0.5);
        // facing +x, travelling 90 degrees to the left
        assert_relative_eq!(
            vision.players[0].position,
            start + Vector2::new(0.0, 500.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(vision.t, 0.5);
    }

    #[test]
    fn kick_launches_ball() {
        let id = PlayerId::new(0);
        let mut vision = MockVision::new(TeamColor::Yellow, &[id], 1).unwrap();
        vision.players[0].position = Vector2::new(-100.0, 0.0);
        let cmd = RobotCmd {
            kick_strength: 10,
            ..RobotCmd::zero(id)
        };
        vision.step(&[cmd], 0.1);
        assert!(vision.ball.velocity.x > 0.0);
        assert!(vision.ball.position.x > 0.0);
    }

    #[test]
    fn frame_reports_every_robot() {
        let ids = [PlayerId::new(1), PlayerId::new(2)];
        let mut vision = MockVision::new(TeamColor::Blue, &ids, 3).unwrap();
        let frame = vision.frame();
        assert_eq!(frame.robots_of(TeamColor::Blue).count(), 2);
        assert_eq!(frame.robots_of(TeamColor::Yellow).count(), 6);
        assert_eq!(frame.balls.len(), 1);
        let ball = frame.best_ball().unwrap();
        assert!(ball.position().norm() < 20.0);
    }
}
