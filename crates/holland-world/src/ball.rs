use holland_core::{BallData, TrackerSettings, VisionFrame};

use crate::filter::{KinematicTrack, TrackParams};

fn track_params(settings: &TrackerSettings) -> TrackParams {
    TrackParams {
        lambda: settings.ukf_lambda,
        unit_transition_var: settings.ball_unit_transition_var,
        measurement_var: settings.ball_measurement_var,
        velocity_measurement_var: settings.velocity_measurement_var,
        tick_interval: settings.tick_interval,
        max_consecutive_failures: settings.max_consecutive_failures,
    }
}

/// Tracker for the ball.
#[derive(Debug)]
pub struct BallTracker {
    /// Whether the tracker has been initialized (i.e. the ball has been detected at
    /// least twice)
    is_init: bool,
    track: KinematicTrack,
    /// Last recorded data (for caching)
    last_data: Option<BallData>,
}

impl BallTracker {
    /// Create a new BallTracker.
    pub fn new(settings: &TrackerSettings) -> BallTracker {
        BallTracker {
            is_init: false,
            track: KinematicTrack::new(track_params(settings)),
            last_data: None,
        }
    }

    pub fn update_settings(&mut self, settings: &TrackerSettings) {
        self.track.update_params(track_params(settings));
    }

    /// Whether the tracker has been initialized (i.e. the ball has been detected at
    /// least twice)
    pub fn is_init(&self) -> bool {
        self.is_init
    }

    /// Update the tracker with a new frame. Frames without a ball keep the
    /// last known state.
    pub fn update(&mut self, frame: &VisionFrame) {
        let Some(detection) = frame.best_ball() else {
            return;
        };
        let raw_position = detection.position();
        let seen_before = self.track.is_init();
        self.track.observe(frame.t_capture, raw_position);

        if let (Some(position), Some(velocity)) = (self.track.position(), self.track.velocity()) {
            if seen_before && !self.is_init {
                log::debug!("Ball tracker initialized");
                self.is_init = true;
            }
            self.last_data = Some(BallData {
                timestamp: frame.t_capture,
                position,
                raw_position,
                velocity,
            });
        }
    }

    pub fn get(&self) -> Option<&BallData> {
        if self.is_init {
            self.last_data.as_ref()
        } else {
            None
        }
    }
}
