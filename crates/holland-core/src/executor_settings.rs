use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{Half, Situation};

/// Settings for the motion controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Maximum velocity of the robot in mm/s.
    pub max_velocity: f64,
    /// Distance to the destination below which the robot starts slowing down, in mm.
    pub distance_to_slow_down: f64,
    /// Rotation speed per degree of heading error, in rad/s.
    pub rotation_gain: f64,
    /// Maximum angular velocity of the robot in rad/s.
    pub max_rotation_speed: f64,
    /// Distance to the ball under which the dribbler is switched on, in mm.
    pub dribble_distance: f64,
    /// Half-width of the cone in front of the robot in which the dribbler engages, in degrees.
    pub dribble_angle: f64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_velocity: 3000.0,
            distance_to_slow_down: 450.0,
            rotation_gain: 0.06,
            max_rotation_speed: 8.0,
            dribble_distance: 290.0,
            dribble_angle: 20.0,
        }
    }
}

/// Settings for the `WorldTracker`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Whether our team color is blue
    pub is_blue: bool,
    /// The half holding our goal until the referee says otherwise.
    pub initial_own_half: Half,
    /// Frame interval used when timestamps do not advance, in seconds.
    pub tick_interval: f64,
    /// Sigma-point spread of the unscented filters.
    pub ukf_lambda: f64,

    /// Transition variance for the player filter.
    pub player_unit_transition_var: f64,
    /// Measurement variance for the player filter.
    pub player_measurement_var: f64,
    /// Smoothing factor for the yaw LPF
    pub player_yaw_lpf_alpha: f64,
    /// Seconds without a detection after which a player is marked gone.
    pub player_gone_timeout: f64,

    /// Transition variance for the ball filter.
    pub ball_unit_transition_var: f64,
    /// Measurement variance for the ball filter.
    pub ball_measurement_var: f64,

    /// Variance of the velocity derived from two consecutive positions.
    pub velocity_measurement_var: f64,
    /// Failed filter steps in a row before a track is restarted.
    pub max_consecutive_failures: u32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            is_blue: true,
            initial_own_half: Half::West,
            tick_interval: 1.0 / 60.0,
            ukf_lambda: 2.0,
            player_unit_transition_var: 2e4,
            player_measurement_var: 4.0,
            player_yaw_lpf_alpha: 0.5,
            player_gone_timeout: 0.5,
            ball_unit_transition_var: 5e4,
            ball_measurement_var: 4.0,
            velocity_measurement_var: 3e4,
            max_consecutive_failures: 5,
        }
    }
}

/// Which path planner to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlannerKind {
    /// Visibility graph searched with Dijkstra
    #[default]
    Global,
    /// Sidestep around the first blocking obstacle
    Local,
}

/// Settings for the path planners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub default_planner: PlannerKind,
    /// Half the side of the box placed around every other robot, in mm.
    pub obstacle_half_size: f64,
    /// Offset of graph vertices from the obstacle corners, in mm.
    pub clearance: f64,
    /// Half the side of the box around the ball when it is avoided, in mm.
    pub ball_half_size: f64,
    /// How much the local planner widens its sidestep per iteration, in mm.
    pub sidestep_growth: f64,
    /// Refinement budget of the local planner, per side.
    pub max_iterations: u32,
    /// Drive straight at the destination when the local planner gives up.
    pub fallback_to_destination: bool,
    pub avoid_own_defense_area: bool,
    pub avoid_opp_defense_area: bool,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            default_planner: PlannerKind::Global,
            obstacle_half_size: 200.0,
            clearance: 20.0,
            ball_half_size: 100.0,
            sidestep_growth: 100.0,
            max_iterations: 4,
            fallback_to_destination: true,
            avoid_own_defense_area: false,
            avoid_opp_defense_area: true,
        }
    }
}

/// Settings for situation selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Situation played while we have the ball
    pub open_play_attack: Situation,
    /// Situation played while defending in our own half
    pub open_play_defense: Situation,
    /// Distance within which the closest robot is said to have the ball, in mm.
    pub possession_distance: f64,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            open_play_attack: Situation::FreeShotRoundPlay,
            open_play_defense: Situation::ZonallyBackward,
            possession_distance: 200.0,
        }
    }
}

/// Settings for the executor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    pub controller_settings: ControllerSettings,
    pub tracker_settings: TrackerSettings,
    pub planner_settings: PlannerSettings,
    pub strategy_settings: StrategySettings,
}

impl ExecutorSettings {
    /// Load the executor settings from a file, or store the default settings if the file does not
    /// exist. A file that cannot be parsed is reported and the defaults are used.
    pub fn load_or_insert(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    log::error!("Failed to parse executor settings: {}", err);
                    Ok(Self::default())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.store(path)?;
                log::info!("Wrote default executor settings to {}", path.display());
                Ok(settings)
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read executor settings from {}", path.display())),
        }
    }

    /// Store the executor settings in the given file.
    pub fn store(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write executor settings to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_insert_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = ExecutorSettings::load_or_insert(&path).unwrap();
        assert_eq!(settings, ExecutorSettings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = ExecutorSettings::default();
        settings.planner_settings.default_planner = PlannerKind::Local;
        settings.strategy_settings.open_play_defense = Situation::BarricadeDefending;
        settings.store(&path).unwrap();

        let loaded = ExecutorSettings::load_or_insert(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let settings = ExecutorSettings::load_or_insert(&path).unwrap();
        assert_eq!(settings, ExecutorSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "controller_settings": { "max_velocity": 1500.0 } }"#).unwrap();

        let settings = ExecutorSettings::load_or_insert(&path).unwrap();
        assert_eq!(settings.controller_settings.max_velocity, 1500.0);
        assert_eq!(settings.controller_settings.distance_to_slow_down, 450.0);
        assert_eq!(settings.tracker_settings, TrackerSettings::default());
    }
}
