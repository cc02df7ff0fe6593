use holland_core::{math, ControllerSettings, PlayerData, RobotCmd, Vector2};

use crate::planner::PlanError;

/// Per-tick movement request produced by a behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveRequest {
    pub destination: Option<Vector2>,
    /// Point to face, independent of where the robot drives
    pub target: Option<Vector2>,
    pub kick: u8,
    pub chip: u8,
    pub dribble: bool,
    /// Replaces the ramped linear speed when set, in mm/s
    pub forced_speed: Option<f64>,
    pub avoid_ball: bool,
}

impl MoveRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(&mut self, destination: Vector2) -> &mut Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_target(&mut self, target: Vector2) -> &mut Self {
        self.target = Some(target);
        self
    }

    pub fn with_kick(&mut self, strength: u8) -> &mut Self {
        self.kick = strength;
        self
    }

    pub fn with_chip(&mut self, strength: u8) -> &mut Self {
        self.chip = strength;
        self
    }

    pub fn with_dribble(&mut self) -> &mut Self {
        self.dribble = true;
        self
    }

    pub fn with_forced_speed(&mut self, speed: f64) -> &mut Self {
        self.forced_speed = Some(speed);
        self
    }

    pub fn with_avoid_ball(&mut self, avoid: bool) -> &mut Self {
        self.avoid_ball = avoid;
        self
    }
}

/// Linear speed for a remaining distance: full speed beyond `slow_down`,
/// falling linearly to zero at the destination.
pub fn ramp_speed(distance: f64, slow_down: f64, max_speed: f64) -> f64 {
    if distance >= slow_down {
        max_speed
    } else if distance <= 0.0 {
        0.0
    } else {
        max_speed * distance / slow_down
    }
}

/// Turns a route and a facing target into a robot command.
#[derive(Debug, Clone)]
pub struct GotoPosition {
    settings: ControllerSettings,
    pending_kick: u8,
    pending_chip: u8,
}

impl GotoPosition {
    pub fn new(settings: &ControllerSettings) -> Self {
        Self {
            settings: settings.clone(),
            pending_kick: 0,
            pending_chip: 0,
        }
    }

    pub fn update_settings(&mut self, settings: &ControllerSettings) {
        self.settings = settings.clone();
    }

    /// Arm a kick for the next command only.
    pub fn set_kick(&mut self, kick: u8, chip: u8) {
        if kick > 0 {
            self.pending_kick = kick;
        }
        if chip > 0 {
            self.pending_chip = chip;
        }
    }

    /// Command for one tick. `route` is the planner's answer for the
    /// request's destination and is ignored when there is no destination.
    pub fn calculate(
        &mut self,
        player: &PlayerData,
        ball: Option<Vector2>,
        request: &MoveRequest,
        route: Option<Result<&[Vector2], PlanError>>,
    ) -> RobotCmd {
        let mut cmd = RobotCmd::zero(player.id);
        let position = player.position;
        let orientation = player.yaw.degrees();

        if let Some(target) = request.target {
            let rotation_to_target =
                math::angle_delta_deg(orientation, math::bearing_deg(position, target));
            cmd.rotation_speed = (-self.settings.rotation_gain * rotation_to_target).clamp(
                -self.settings.max_rotation_speed,
                self.settings.max_rotation_speed,
            );
        }

        if request.destination.is_some() {
            let route = match route {
                Some(Ok(route)) if !route.is_empty() => route,
                Some(Err(err)) => {
                    log::info!("Player {} can't reach its destination: {}", player.id, err);
                    return self.stop(player);
                }
                _ => {
                    log::info!("Player {} can't reach its destination", player.id);
                    return self.stop(player);
                }
            };

            let waypoint = route[0];
            let distance = math::distance(position, waypoint);
            cmd.rotation_to_face =
                math::angle_delta_deg(orientation, math::bearing_deg(position, waypoint));

            let effective_distance = match route.get(1) {
                Some(&next) if distance > f64::EPSILON => {
                    let turn = math::angle_delta_deg(
                        math::bearing_deg(position, waypoint),
                        math::bearing_deg(waypoint, next),
                    );
                    distance + self.settings.distance_to_slow_down * (1.0 - turn.abs() / 360.0)
                }
                _ => distance,
            };
            cmd.linear_speed = match request.forced_speed {
                Some(speed) => speed,
                None => ramp_speed(
                    effective_distance,
                    self.settings.distance_to_slow_down,
                    self.settings.max_velocity,
                ),
            };
        } else if request.target.is_none() {
            return self.stop(player);
        }

        cmd.dribble_on = request.dribble || self.ball_in_reach(position, orientation, ball);
        cmd.kick_strength = std::mem::take(&mut self.pending_kick);
        cmd.chip_strength = std::mem::take(&mut self.pending_chip);
        cmd
    }

    /// A zero command. Any armed kick is dropped.
    fn stop(&mut self, player: &PlayerData) -> RobotCmd {
        self.pending_kick = 0;
        self.pending_chip = 0;
        RobotCmd::zero(player.id)
    }

    fn ball_in_reach(&self, position: Vector2, orientation: f64, ball: Option<Vector2>) -> bool {
        let Some(ball) = ball else {
            return false;
        };
        let off_heading = math::angle_delta_deg(orientation, math::bearing_deg(position, ball));
        math::distance(position, ball) < self.settings.dribble_distance
            && off_heading.abs() < self.settings.dribble_angle
    }
}
