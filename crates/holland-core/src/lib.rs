mod angle;
mod executor_settings;
mod game;
mod geom;
pub mod math;
mod player_id;
mod vision;
mod world;
mod zones;

pub use angle::*;
pub use executor_settings::*;
pub use game::*;
pub use geom::*;
pub use math::{Aabb, Polygon};
pub use player_id::*;
pub use vision::*;
pub use world::*;
pub use zones::*;

use serde::{Deserialize, Serialize};

pub type Vector2 = nalgebra::Vector2<f64>;

/// A command to one of our robots, as handed to the transport layer.
///
/// Angles are in degrees, speeds in mm/s (linear) and rad/s (rotation, `+` is
/// counter-clockwise).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotCmd {
    /// The robot's ID
    pub robot_id: PlayerId,
    /// Direction of travel relative to the robot's heading, as
    /// `orientation - bearing` in `[-180, 180]`
    pub rotation_to_face: f64,
    /// Forward speed along `rotation_to_face`
    pub linear_speed: f64,
    /// Angular velocity toward the facing target
    pub rotation_speed: f64,
    /// Flat kick strength, 0 for no kick
    pub kick_strength: u8,
    /// Chip kick strength, 0 for no chip
    pub chip_strength: u8,
    pub dribble_on: bool,
}

impl RobotCmd {
    /// A command that stops the robot in place.
    pub fn zero(robot_id: PlayerId) -> RobotCmd {
        RobotCmd {
            robot_id,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear_speed == 0.0
            && self.rotation_speed == 0.0
            && self.kick_strength == 0
            && self.chip_strength == 0
            && !self.dribble_on
    }
}

impl std::fmt::Display for RobotCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "p{};r{:.0};v{:.0};w{:.2};k{};c{};d{}",
            self.robot_id,
            self.rotation_to_face,
            self.linear_speed,
            self.rotation_speed,
            self.kick_strength,
            self.chip_strength,
            self.dribble_on as u8
        )
    }
}
