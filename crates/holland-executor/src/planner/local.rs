//! Single-waypoint deflection around the first obstacle on the direct line.

use holland_core::{math, Aabb, Vector2};

/// Outcome of a deflection attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deflection {
    /// Nothing blocks the direct line
    Clear,
    Sidestep {
        waypoint: Vector2,
        /// Refinement iterations the chosen side needed, starting at 1
        iterations: u32,
    },
    /// Neither side resolved within the iteration budget
    Unresolved,
}

/// Try to get around whatever blocks the line from `start` to `destination`.
pub fn plan(
    start: Vector2,
    destination: Vector2,
    obstacles: &[Aabb],
    growth: f64,
    max_iterations: u32,
) -> Deflection {
    let active: Vec<Aabb> = obstacles
        .iter()
        .filter(|o| !o.contains(start))
        .copied()
        .collect();

    let blocking = active
        .iter()
        .filter(|o| o.intersects_segment(start, destination))
        .min_by(|a, b| {
            math::distance(start, a.center())
                .partial_cmp(&math::distance(start, b.center()))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    let Some(blocking) = blocking else {
        return Deflection::Clear;
    };

    let line = destination - start;
    if line.norm() < f64::EPSILON {
        return Deflection::Clear;
    }
    let dir = line.normalize();
    let left = Vector2::new(-dir.y, dir.x);
    let base = start + dir * (blocking.center() - start).dot(&dir);
    let reach = (blocking.max - blocking.min).norm() / 2.0;

    let is_clear = |a: Vector2, b: Vector2| !active.iter().any(|o| o.intersects_segment(a, b));
    let try_side = |side: f64| {
        (1..=max_iterations).find_map(|iteration| {
            let offset = reach + growth * iteration as f64;
            let waypoint = base + left * side * offset;
            (is_clear(start, waypoint) && is_clear(waypoint, destination))
                .then_some((waypoint, iteration))
        })
    };

    match (try_side(1.0), try_side(-1.0)) {
        (Some((waypoint, l)), Some((_, r))) if l <= r => Deflection::Sidestep {
            waypoint,
            iterations: l,
        },
        (_, Some((waypoint, iterations))) | (Some((waypoint, iterations)), None) => {
            Deflection::Sidestep {
                waypoint,
                iterations,
            }
        }
        (None, None) => Deflection::Unresolved,
    }
}
