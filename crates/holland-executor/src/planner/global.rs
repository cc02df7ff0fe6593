//! Shortest route over a visibility graph of obstacle corners.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use holland_core::{math, Aabb, Vector2};

use super::PlanError;

const START: usize = 0;
const GOAL: usize = 1;

#[derive(Clone, Copy, Debug)]
struct SearchState {
    cost: f64,
    node: usize,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for SearchState {}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the heap pops the cheapest node first
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plan a route from `start` to `destination` around the obstacle boxes.
///
/// The returned route excludes the start and ends at the destination, or at
/// the free vertex nearest to it when the destination is inside an obstacle.
pub fn plan(
    start: Vector2,
    destination: Vector2,
    obstacles: &[Aabb],
    clearance: f64,
) -> Result<Vec<Vector2>, PlanError> {
    let active: Vec<Aabb> = obstacles
        .iter()
        .filter(|o| !o.contains(start))
        .copied()
        .collect();
    let is_free = |p: Vector2| !active.iter().any(|o| o.contains(p));
    let is_visible =
        |a: Vector2, b: Vector2| !active.iter().any(|o| o.intersects_segment(a, b));

    let vertices: Vec<Vector2> = active
        .iter()
        .flat_map(|o| o.expanded(clearance).corners())
        .filter(|v| is_free(*v))
        .collect();

    let destination = if is_free(destination) {
        destination
    } else {
        let nearest = vertices.iter().copied().min_by(|a, b| {
            math::distance(*a, destination)
                .partial_cmp(&math::distance(*b, destination))
                .unwrap_or(Ordering::Equal)
        });
        match nearest {
            Some(v) => {
                log::debug!(
                    "Destination ({:.0}, {:.0}) is blocked, snapping to ({:.0}, {:.0})",
                    destination.x,
                    destination.y,
                    v.x,
                    v.y
                );
                v
            }
            None => return Err(PlanError::NoPath),
        }
    };

    if is_visible(start, destination) {
        return Ok(vec![destination]);
    }

    let mut nodes = vec![start, destination];
    nodes.extend(vertices.iter().copied().filter(|v| *v != destination));

    let n = nodes.len();
    let mut edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if is_visible(nodes[i], nodes[j]) {
                let cost = (nodes[j] - nodes[i]).norm_squared();
                edges[i].push((j, cost));
                edges[j].push((i, cost));
            }
        }
    }

    let path = dijkstra(&edges, START, GOAL).ok_or(PlanError::NoPath)?;
    Ok(path.into_iter().skip(1).map(|i| nodes[i]).collect())
}

fn dijkstra(edges: &[Vec<(usize, f64)>], start: usize, goal: usize) -> Option<Vec<usize>> {
    let n = edges.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    dist[start] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(SearchState {
        cost: 0.0,
        node: start,
    });

    while let Some(SearchState { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        if node == goal {
            break;
        }
        for &(next, edge_cost) in &edges[node] {
            let new_dist = cost + edge_cost;
            if new_dist < dist[next] {
                dist[next] = new_dist;
                prev[next] = Some(node);
                heap.push(SearchState {
                    cost: new_dist,
                    node: next,
                });
            }
        }
    }

    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = prev[current]?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn route_is_clear(start: Vector2, route: &[Vector2], obstacles: &[Aabb]) -> bool {
        let mut from = start;
        for &to in route {
            if obstacles.iter().any(|o| o.intersects_segment(from, to)) {
                return false;
            }
            from = to;
        }
        true
    }

    #[test]
    fn empty_field_is_direct() {
        let start = Vector2::new(-1000.0, 0.0);
        let dest = Vector2::new(1000.0, 500.0);
        let route = plan(start, dest, &[], 20.0).unwrap();
        assert_eq!(route, vec![dest]);
    }

    #[test]
    fn goes_around_single_obstacle() {
        let start = Vector2::new(-1000.0, 0.0);
        let dest = Vector2::new(1000.0, 0.0);
        let obstacles = [Aabb::new(Vector2::zeros(), 200.0)];
        let route = plan(start, dest, &obstacles, 20.0).unwrap();

        assert!(route.len() >= 2);
        assert_eq!(*route.last().unwrap(), dest);
        assert!(route_is_clear(start, &route, &obstacles));
    }

    #[test]
    fn goes_around_a_wall() {
        let start = Vector2::new(-1000.0, 0.0);
        let dest = Vector2::new(1000.0, 0.0);
        let obstacles = [
            Aabb::new(Vector2::new(0.0, -400.0), 200.0),
            Aabb::new(Vector2::new(0.0, 0.0), 200.0),
            Aabb::new(Vector2::new(0.0, 400.0), 200.0),
        ];
        let route = plan(start, dest, &obstacles, 20.0).unwrap();
        assert!(route_is_clear(start, &route, &obstacles));
        assert_eq!(*route.last().unwrap(), dest);
    }

    #[test]
    fn obstacle_around_start_is_ignored() {
        let start = Vector2::new(0.0, 0.0);
        let dest = Vector2::new(1000.0, 0.0);
        let obstacles = [Aabb::new(Vector2::new(50.0, 0.0), 200.0)];
        let route = plan(start, dest, &obstacles, 20.0).unwrap();
        assert_eq!(route, vec![dest]);
    }

    #[test]
    fn blocked_destination_snaps_to_vertex() {
        let start = Vector2::new(-1000.0, 0.0);
        let dest = Vector2::new(0.0, 150.0);
        let obstacles = [Aabb::new(Vector2::zeros(), 200.0)];
        let route = plan(start, dest, &obstacles, 20.0).unwrap();
        let last = *route.last().unwrap();
        assert_relative_eq!(last.y.abs(), 220.0);
        assert_relative_eq!(last.x.abs(), 220.0);
        assert!(last.y > 0.0);
        assert!(route_is_clear(start, &route, &obstacles));
    }

    #[test]
    fn enclosed_start_has_no_path() {
        // Four boxes overlapping into a closed ring around the start
        let start = Vector2::zeros();
        let obstacles = [
            Aabb::from_corners(Vector2::new(-600.0, 300.0), Vector2::new(600.0, 600.0)),
            Aabb::from_corners(Vector2::new(-600.0, -600.0), Vector2::new(600.0, -300.0)),
            Aabb::from_corners(Vector2::new(-600.0, -600.0), Vector2::new(-300.0, 600.0)),
            Aabb::from_corners(Vector2::new(300.0, -600.0), Vector2::new(600.0, 600.0)),
        ];
        let result = plan(start, Vector2::new(2000.0, 0.0), &obstacles, 20.0);
        assert_eq!(result, Err(PlanError::NoPath));
    }
}
