use holland_core::{
    ExecutorSettings, FieldGeometry, PlannerKind, PlayerId, RefereeMsg, RobotCmd, VisionFrame,
    WorldData,
};
use holland_world::WorldTracker;

pub mod behaviors;
pub mod control;
mod mode;
pub mod planner;
pub mod strategy;
mod team_controller;

pub use mode::{assign_roles, ModeKind, ModeParams, RoleAssignment, RobotMode};
pub use strategy::{select_situation, Strategy};
pub use team_controller::TeamController;

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutput {
    /// At most one command per controlled robot
    Commands(Vec<RobotCmd>),
    /// Every robot must stop right away
    StopAll,
}

/// The central component of the decision core. It owns the world tracker and
/// the team controller: vision, geometry and referee input go in, and every
/// [`Executor::tick`] produces the commands for our robots.
///
/// The executor does no I/O and keeps no clock of its own, so the host decides
/// how ticks are scheduled.
pub struct Executor {
    tracker: WorldTracker,
    controller: TeamController,
}

impl Executor {
    pub fn new(settings: &ExecutorSettings, controlled: Vec<PlayerId>) -> Self {
        Self {
            tracker: WorldTracker::new(settings),
            controller: TeamController::new(settings, controlled),
        }
    }

    pub fn update_from_vision(&mut self, frame: &VisionFrame) {
        self.tracker.update_from_vision(frame);
    }

    pub fn update_geometry(&mut self, geometry: FieldGeometry) {
        self.tracker.update_geometry(geometry);
    }

    pub fn update_from_referee(&mut self, msg: &RefereeMsg) {
        self.tracker.update_from_referee(msg);
    }

    pub fn update_settings(&mut self, settings: &ExecutorSettings) {
        self.tracker.update_settings(settings);
        self.controller.update_settings(settings);
    }

    pub fn set_goalie(&mut self, goalie: Option<PlayerId>) {
        self.controller.set_goalie(goalie);
    }

    pub fn set_planner(&mut self, kind: PlannerKind) {
        self.controller.set_planner(kind);
    }

    /// The latest world snapshot.
    pub fn world(&self) -> WorldData {
        self.tracker.get()
    }

    pub fn controller(&self) -> &TeamController {
        &self.controller
    }

    /// Run one tick. All robots stop until the world is initialized.
    pub fn tick(&mut self) -> TickOutput {
        if !self.tracker.is_init() {
            log::debug!("World not initialized yet");
            return TickOutput::StopAll;
        }
        let world = self.tracker.get();
        self.controller.update(&world)
    }
}
