use serde::{Deserialize, Serialize};

use crate::Vector2;

/// Euclidean distance between two points, in mm.
pub fn distance(a: Vector2, b: Vector2) -> f64 {
    (b - a).norm()
}

/// Bearing from `from` to `to` in radians, counter-clockwise from +x.
pub fn bearing(from: Vector2, to: Vector2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Bearing from `from` to `to` in degrees, in `(-180, 180]`.
pub fn bearing_deg(from: Vector2, to: Vector2) -> f64 {
    bearing(from, to).to_degrees()
}

/// Signed difference `a - b` between two headings in degrees.
///
/// Both inputs are expected in `[-180, 180]`, so one correction of 360 is
/// enough to bring the result back into range.
pub fn angle_delta_deg(a: f64, b: f64) -> f64 {
    let delta = a - b;
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Finds the intersection point of two lines.
///
/// Each line is defined by a point and a direction vector. Returns None if the lines
/// are parallel.
pub fn find_intersection(
    point1: Vector2,
    direction1: Vector2,
    point2: Vector2,
    direction2: Vector2,
) -> Option<Vector2> {
    let det = direction1.x * direction2.y - direction1.y * direction2.x;
    if det.abs() < 1e-10 {
        return None;
    }

    let dp = point2 - point1;
    let t = (dp.x * direction2.y - dp.y * direction2.x) / det;
    Some(point1 + t * direction1)
}

/// Whether the segment `a`-`b` touches the box.
pub fn segment_intersects_aabb(a: Vector2, b: Vector2, aabb: &Aabb) -> bool {
    aabb.intersects_segment(a, b)
}

/// An axis-aligned box, stored as its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector2,
    pub max: Vector2,
}

impl Aabb {
    pub fn new(center: Vector2, half_size: f64) -> Self {
        Self::from_corners(
            center - Vector2::new(half_size, half_size),
            center + Vector2::new(half_size, half_size),
        )
    }

    pub fn from_corners(a: Vector2, b: Vector2) -> Self {
        Self {
            min: Vector2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vector2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn center(&self) -> Vector2 {
        (self.min + self.max) / 2.0
    }

    /// Whether the point lies strictly inside the box.
    pub fn contains(&self, p: Vector2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Corners in counter-clockwise order, starting at `min`.
    pub fn corners(&self) -> [Vector2; 4] {
        [
            self.min,
            Vector2::new(self.max.x, self.min.y),
            self.max,
            Vector2::new(self.min.x, self.max.y),
        ]
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: self.min - Vector2::new(margin, margin),
            max: self.max + Vector2::new(margin, margin),
        }
    }

    /// Slab test against the open box. Segments that only graze an edge or a
    /// corner do not count as crossing.
    pub fn intersects_segment(&self, a: Vector2, b: Vector2) -> bool {
        let d = b - a;
        let mut t_enter = 0.0_f64;
        let mut t_exit = 1.0_f64;

        for axis in 0..2 {
            let (origin, dir, lo, hi) = (a[axis], d[axis], self.min[axis], self.max[axis]);
            if dir.abs() < 1e-12 {
                if origin <= lo || origin >= hi {
                    return false;
                }
                continue;
            }
            let t1 = (lo - origin) / dir;
            let t2 = (hi - origin) / dir;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
            if t_enter >= t_exit {
                return false;
            }
        }
        true
    }
}

/// A closed polygon given by its vertices in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vector2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vector2>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    /// Even-odd ray casting.
    pub fn contains(&self, p: Vector2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (vi, vj) = (self.vertices[i], self.vertices[j]);
            if (vi.y > p.y) != (vj.y > p.y) {
                let x_cross = vi.x + (p.y - vi.y) * (vj.x - vi.x) / (vj.y - vi.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Centre of the bounding box.
    pub fn centroid(&self) -> Vector2 {
        let (min, max) = self.bounds();
        (min + max) / 2.0
    }

    pub fn closest_vertex(&self, p: Vector2) -> Option<Vector2> {
        self.vertices.iter().copied().min_by(|a, b| {
            distance(*a, p)
                .partial_cmp(&distance(*b, p))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Extent along x.
    pub fn width(&self) -> f64 {
        let (min, max) = self.bounds();
        max.x - min.x
    }

    /// Extent along y.
    pub fn height(&self) -> f64 {
        let (min, max) = self.bounds();
        max.y - min.y
    }

    fn bounds(&self) -> (Vector2, Vector2) {
        let mut min = Vector2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vector2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &self.vertices {
            min = min.inf(v);
            max = max.sup(v);
        }
        if self.vertices.is_empty() {
            (Vector2::zeros(), Vector2::zeros())
        } else {
            (min, max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_intersecting_lines() {
        let intersection = find_intersection(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(-1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(intersection.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(intersection.y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_parallel_lines() {
        let intersection = find_intersection(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 2.0),
        );
        assert!(intersection.is_none());
    }

    #[test]
    fn test_bearing() {
        let robot = Vector2::new(0.0, 0.0);
        assert_relative_eq!(bearing_deg(robot, Vector2::new(0.0, 1000.0)), 90.0);
        assert_relative_eq!(bearing_deg(robot, Vector2::new(-1000.0, 0.0)), 180.0);
        assert_relative_eq!(distance(robot, Vector2::new(300.0, 400.0)), 500.0);
    }

    #[test]
    fn test_angle_delta_wraps_once() {
        assert_relative_eq!(angle_delta_deg(170.0, -170.0), -20.0);
        assert_relative_eq!(angle_delta_deg(-170.0, 170.0), 20.0);
        assert_relative_eq!(angle_delta_deg(30.0, 10.0), 20.0);
        assert_relative_eq!(angle_delta_deg(180.0, -180.0), 0.0);
    }

    #[test]
    fn test_segment_through_box() {
        let aabb = Aabb::new(Vector2::new(0.0, 0.0), 200.0);
        assert!(segment_intersects_aabb(
            Vector2::new(-1000.0, 0.0),
            Vector2::new(1000.0, 0.0),
            &aabb
        ));
        assert!(aabb.intersects_segment(Vector2::new(-1000.0, -1000.0), Vector2::new(1000.0, 1000.0)));
    }

    #[test]
    fn test_segment_missing_box() {
        let aabb = Aabb::new(Vector2::new(0.0, 0.0), 200.0);
        // passes above
        assert!(!aabb.intersects_segment(Vector2::new(-1000.0, 300.0), Vector2::new(1000.0, 300.0)));
        // stops short
        assert!(!aabb.intersects_segment(Vector2::new(-1000.0, 0.0), Vector2::new(-300.0, 0.0)));
        // runs along an edge
        assert!(!aabb.intersects_segment(Vector2::new(-1000.0, 200.0), Vector2::new(1000.0, 200.0)));
        // vertical, outside the slab
        assert!(!aabb.intersects_segment(Vector2::new(500.0, -1000.0), Vector2::new(500.0, 1000.0)));
    }

    #[test]
    fn test_segment_starting_inside_box() {
        let aabb = Aabb::new(Vector2::new(0.0, 0.0), 200.0);
        assert!(aabb.contains(Vector2::new(50.0, 50.0)));
        assert!(aabb.intersects_segment(Vector2::new(50.0, 50.0), Vector2::new(1000.0, 50.0)));
    }

    #[test]
    fn test_aabb_corners_and_expansion() {
        let aabb = Aabb::new(Vector2::new(100.0, -100.0), 50.0).expanded(10.0);
        let corners = aabb.corners();
        assert_relative_eq!(corners[0], Vector2::new(40.0, -160.0));
        assert_relative_eq!(corners[2], Vector2::new(160.0, -40.0));
        assert_relative_eq!(aabb.center(), Vector2::new(100.0, -100.0));
    }

    #[test]
    fn test_polygon_queries() {
        let zone = Polygon::new(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(2000.0, 0.0),
            Vector2::new(2000.0, 1000.0),
            Vector2::new(1000.0, 1500.0),
            Vector2::new(0.0, 1000.0),
        ]);
        assert!(zone.contains(Vector2::new(1000.0, 1200.0)));
        assert!(!zone.contains(Vector2::new(100.0, 1400.0)));
        assert!(!zone.contains(Vector2::new(-1.0, 500.0)));
        assert_relative_eq!(zone.width(), 2000.0);
        assert_relative_eq!(zone.height(), 1500.0);
        assert_relative_eq!(zone.centroid(), Vector2::new(1000.0, 750.0));
        assert_relative_eq!(
            zone.closest_vertex(Vector2::new(1900.0, 900.0)).unwrap(),
            Vector2::new(2000.0, 1000.0)
        );
    }
}
