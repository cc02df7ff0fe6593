use serde::{Deserialize, Serialize};

use crate::{Aabb, Half, Vector2};

/// The field geometry, as pushed by the vision system.
///
/// All distances are in mm. The defence area is the classic one: two quarter
/// circles of `defense_radius` around the goal posts, joined by a straight
/// segment of `defense_stretch` parallel to the goal line.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FieldGeometry {
    /// Field length (distance between goal lines) in mm
    pub field_length: f64,
    /// Field width (distance between touch lines) in mm
    pub field_width: f64,
    /// Goal width (distance inner edges of goal posts) in mm
    pub goal_width: f64,
    /// Goal depth (distance from outer goal line edge to inner goal back) in mm
    pub goal_depth: f64,
    /// Boundary width (distance from touch/goal line centers to boundary walls) in mm
    pub boundary_width: f64,
    /// Radius of the defence area quarter circles
    pub defense_radius: f64,
    /// Length of the straight part of the defence area line
    pub defense_stretch: f64,
}

impl FieldGeometry {
    /// Division B field.
    pub fn division_b() -> Self {
        Self {
            field_length: 9000.0,
            field_width: 6000.0,
            goal_width: 1000.0,
            goal_depth: 180.0,
            boundary_width: 300.0,
            defense_radius: 1000.0,
            defense_stretch: 500.0,
        }
    }

    pub fn half_length(&self) -> f64 {
        self.field_length / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.field_width / 2.0
    }

    /// Centre of the goal line on the given half.
    pub fn goal_center(&self, half: Half) -> Vector2 {
        Vector2::new(half.sign() * self.half_length(), 0.0)
    }

    /// The (north, south) goal posts on the given half.
    pub fn goal_posts(&self, half: Half) -> (Vector2, Vector2) {
        let x = half.sign() * self.half_length();
        (
            Vector2::new(x, self.goal_width / 2.0),
            Vector2::new(x, -self.goal_width / 2.0),
        )
    }

    /// How far the defence area reaches along y from the centre line.
    pub fn defense_half_extent(&self) -> f64 {
        self.defense_radius + self.defense_stretch / 2.0
    }

    /// The box enclosing the defence area of the given half.
    pub fn defense_area_box(&self, half: Half) -> Aabb {
        let goal_x = half.sign() * self.half_length();
        let front_x = half.sign() * (self.half_length() - self.defense_radius);
        Aabb::from_corners(
            Vector2::new(goal_x, -self.defense_half_extent()),
            Vector2::new(front_x, self.defense_half_extent()),
        )
    }

    /// Whether a point is on the playing surface, lines included.
    pub fn is_in_field(&self, p: Vector2) -> bool {
        p.x.abs() <= self.half_length() && p.y.abs() <= self.half_width()
    }

    /// Clamp a point onto the playing surface, keeping `margin` mm from the lines.
    pub fn clamp_to_field(&self, p: Vector2, margin: f64) -> Vector2 {
        let max_x = (self.half_length() - margin).max(0.0);
        let max_y = (self.half_width() - margin).max(0.0);
        Vector2::new(p.x.clamp(-max_x, max_x), p.y.clamp(-max_y, max_y))
    }
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self::division_b()
    }
}
