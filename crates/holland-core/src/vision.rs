use serde::{Deserialize, Serialize};

use crate::{PlayerId, TeamColor, Vector2};

/// A single ball blob reported by one camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallDetection {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
    pub camera_id: u32,
}

impl BallDetection {
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

/// A single robot pattern reported by one camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotDetection {
    pub id: PlayerId,
    pub color: TeamColor,
    pub x: f64,
    pub y: f64,
    /// Heading in radians, counter-clockwise from +x
    pub orientation: f64,
    pub camera_id: u32,
}

impl RobotDetection {
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

/// One decoded vision frame, in field coordinates (mm).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionFrame {
    /// Capture time in seconds
    pub t_capture: f64,
    pub balls: Vec<BallDetection>,
    pub robots: Vec<RobotDetection>,
}

impl VisionFrame {
    pub fn robots_of(&self, color: TeamColor) -> impl Iterator<Item = &RobotDetection> {
        self.robots.iter().filter(move |r| r.color == color)
    }

    /// The most confident ball blob, if any.
    pub fn best_ball(&self) -> Option<&BallDetection> {
        self.balls.iter().max_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}
