pub mod global;
pub mod local;

use holland_core::{Aabb, PlannerKind, PlannerSettings, PlayerId, Vector2, WorldData};
use thiserror::Error;

pub use local::Deflection;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    #[error("no path to the destination")]
    NoPath,
}

/// Builds the obstacle field from the world and runs one of the planners.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    settings: PlannerSettings,
    kind: PlannerKind,
}

impl PathPlanner {
    pub fn new(settings: &PlannerSettings) -> Self {
        Self {
            settings: settings.clone(),
            kind: settings.default_planner,
        }
    }

    pub fn update_settings(&mut self, settings: &PlannerSettings) {
        self.settings = settings.clone();
        self.kind = settings.default_planner;
    }

    pub fn kind(&self) -> PlannerKind {
        self.kind
    }

    /// Override the planner picked from the settings.
    pub fn set_kind(&mut self, kind: PlannerKind) {
        self.kind = kind;
    }

    /// Obstacles seen by `requester`: every other visible robot, optionally
    /// the ball and the defence areas.
    pub fn obstacles(&self, world: &WorldData, requester: PlayerId, avoid_ball: bool) -> Vec<Aabb> {
        let size = self.settings.obstacle_half_size;
        let mut obstacles: Vec<Aabb> = world
            .own_players
            .iter()
            .filter(|p| p.id != requester)
            .chain(world.opp_players.iter())
            .filter(|p| !p.is_gone)
            .map(|p| Aabb::new(p.position, size))
            .collect();

        if avoid_ball {
            if let Some(ball) = world.ball_position() {
                obstacles.push(Aabb::new(ball, self.settings.ball_half_size));
            }
        }
        if self.settings.avoid_own_defense_area {
            obstacles.push(world.field_geom.defense_area_box(world.own_half));
        }
        if self.settings.avoid_opp_defense_area {
            obstacles.push(world.field_geom.defense_area_box(world.opp_half()));
        }
        obstacles
    }

    /// A route from `start` to `destination`, excluding the start.
    pub fn route(
        &self,
        start: Vector2,
        destination: Vector2,
        obstacles: &[Aabb],
    ) -> Result<Vec<Vector2>, PlanError> {
        match self.kind {
            PlannerKind::Global => {
                global::plan(start, destination, obstacles, self.settings.clearance)
            }
            PlannerKind::Local => match local::plan(
                start,
                destination,
                obstacles,
                self.settings.sidestep_growth,
                self.settings.max_iterations,
            ) {
                Deflection::Clear => Ok(vec![destination]),
                Deflection::Sidestep { waypoint, .. } => Ok(vec![waypoint, destination]),
                Deflection::Unresolved if self.settings.fallback_to_destination => {
                    log::warn!(
                        "No sidestep found toward ({:.0}, {:.0}), driving straight",
                        destination.x,
                        destination.y
                    );
                    Ok(vec![destination])
                }
                Deflection::Unresolved => Err(PlanError::NoPath),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use holland_core::{BallData, FieldGeometry, Half, PlayerData, TeamColor};

    use super::*;

    fn world() -> WorldData {
        let mut world = WorldData::new(TeamColor::Blue, Half::West, FieldGeometry::division_b());
        let mut me = PlayerData::new(PlayerId::new(1), TeamColor::Blue);
        me.position = Vector2::new(-1000.0, 0.0);
        let mut mate = PlayerData::new(PlayerId::new(2), TeamColor::Blue);
        mate.position = Vector2::new(0.0, 1000.0);
        let mut gone = PlayerData::new(PlayerId::new(3), TeamColor::Blue);
        gone.is_gone = true;
        let mut opp = PlayerData::new(PlayerId::new(1), TeamColor::Yellow);
        opp.position = Vector2::new(0.0, 0.0);
        world.own_players = vec![me, mate, gone];
        world.opp_players = vec![opp];
        world.ball = Some(BallData {
            timestamp: 0.0,
            position: Vector2::new(500.0, 0.0),
            raw_position: Vector2::new(500.0, 0.0),
            velocity: Vector2::zeros(),
        });
        world
    }

    #[test]
    fn obstacle_field() {
        let planner = PathPlanner::new(&PlannerSettings::default());
        let world = world();
        // mate, opponent and the opponent defence area
        assert_eq!(planner.obstacles(&world, PlayerId::new(1), false).len(), 3);
        assert_eq!(planner.obstacles(&world, PlayerId::new(1), true).len(), 4);
    }

    #[test]
    fn both_planners_avoid_the_opponent() {
        let world = world();
        let start = Vector2::new(-1000.0, 0.0);
        let dest = Vector2::new(1000.0, 0.0);
        for kind in [PlannerKind::Global, PlannerKind::Local] {
            let mut planner = PathPlanner::new(&PlannerSettings::default());
            planner.set_kind(kind);
            let obstacles = planner.obstacles(&world, PlayerId::new(1), false);
            let route = planner.route(start, dest, &obstacles).unwrap();
            assert_eq!(*route.last().unwrap(), dest);

            let opp_box = Aabb::new(Vector2::zeros(), 200.0);
            let mut from = start;
            for &to in &route {
                assert!(!opp_box.intersects_segment(from, to), "{:?}", kind);
                from = to;
            }
        }
    }

    #[test]
    fn local_fallback_is_configurable() {
        let wall = [Aabb::from_corners(
            Vector2::new(-100.0, -5000.0),
            Vector2::new(100.0, 5000.0),
        )];
        let start = Vector2::new(-1000.0, 0.0);
        let dest = Vector2::new(1000.0, 0.0);

        let mut settings = PlannerSettings {
            default_planner: PlannerKind::Local,
            ..Default::default()
        };
        let planner = PathPlanner::new(&settings);
        assert_eq!(planner.route(start, dest, &wall), Ok(vec![dest]));

        settings.fallback_to_destination = false;
        let planner = PathPlanner::new(&settings);
        assert_eq!(planner.route(start, dest, &wall), Err(PlanError::NoPath));
    }
}
