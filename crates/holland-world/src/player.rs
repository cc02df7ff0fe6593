use holland_core::{Angle, PlayerData, PlayerId, RobotDetection, TeamColor, TrackerSettings};

use crate::filter::{AngleLowPassFilter, KinematicTrack, TrackParams};

fn track_params(settings: &TrackerSettings) -> TrackParams {
    TrackParams {
        lambda: settings.ukf_lambda,
        unit_transition_var: settings.player_unit_transition_var,
        measurement_var: settings.player_measurement_var,
        velocity_measurement_var: settings.velocity_measurement_var,
        tick_interval: settings.tick_interval,
        max_consecutive_failures: settings.max_consecutive_failures,
    }
}

/// Tracker for a single player.
#[derive(Debug)]
pub struct PlayerTracker {
    /// Player's unique id
    id: PlayerId,
    color: TeamColor,
    /// Whether the tracker has been initialized (i.e. the player has been detected at
    /// least twice)
    is_init: bool,
    /// Last recorded data (for caching)
    last_data: Option<PlayerData>,
    /// Capture time of the last detection
    last_seen: f64,
    gone_timeout: f64,
    track: KinematicTrack,
    /// Low-pass filter for the player's yaw
    yaw_filter: AngleLowPassFilter,
}

impl PlayerTracker {
    /// Create a new PlayerTracker.
    pub fn new(id: PlayerId, color: TeamColor, settings: &TrackerSettings) -> PlayerTracker {
        PlayerTracker {
            id,
            color,
            is_init: false,
            last_data: None,
            last_seen: 0.0,
            gone_timeout: settings.player_gone_timeout,
            track: KinematicTrack::new(track_params(settings)),
            yaw_filter: AngleLowPassFilter::new(settings.player_yaw_lpf_alpha),
        }
    }

    /// Whether the tracker has been initialized (i.e. the player has been detected at
    /// least twice)
    pub fn is_init(&self) -> bool {
        self.is_init
    }

    pub fn is_gone(&self) -> bool {
        self.last_data.as_ref().map(|d| d.is_gone).unwrap_or(false)
    }

    /// Update the tracker with a new detection.
    pub fn update(&mut self, t_capture: f64, detection: &RobotDetection) {
        let raw_position = detection.position();
        let raw_yaw = Angle::from_radians(detection.orientation);
        let yaw = Angle::from_radians(self.yaw_filter.update(detection.orientation));

        let seen_before = self.track.is_init();
        self.track.observe(t_capture, raw_position);
        self.last_seen = t_capture;

        let (Some(position), Some(velocity)) = (self.track.position(), self.track.velocity())
        else {
            return;
        };
        if seen_before && !self.is_init {
            log::debug!("Tracking {} player {}", self.color, self.id);
            self.is_init = true;
        }
        self.last_data = Some(PlayerData {
            timestamp: t_capture,
            raw_position,
            position,
            velocity,
            yaw,
            raw_yaw,
            is_gone: false,
            ..PlayerData::new(self.id, self.color)
        });
    }

    /// Flag the player as gone if it has not been seen for a while.
    pub fn check_is_gone(&mut self, t_capture: f64) {
        let timed_out = t_capture - self.last_seen > self.gone_timeout;
        if let Some(data) = self.last_data.as_mut() {
            if timed_out && !data.is_gone {
                log::info!("{} player {} is gone", self.color, self.id);
            }
            data.is_gone = timed_out;
        }
    }

    pub fn update_settings(&mut self, settings: &TrackerSettings) {
        self.track.update_params(track_params(settings));
        self.yaw_filter
            .update_settings(settings.player_yaw_lpf_alpha);
        self.gone_timeout = settings.player_gone_timeout;
    }

    pub fn get(&self) -> Option<&PlayerData> {
        if self.is_init {
            self.last_data.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;
    use holland_core::Vector2;

    use super::*;

    fn detection(x: f64, y: f64, orientation: f64) -> RobotDetection {
        RobotDetection {
            id: PlayerId::new(1),
            color: TeamColor::Blue,
            x,
            y,
            orientation,
            camera_id: 0,
        }
    }

    fn tracker() -> PlayerTracker {
        PlayerTracker::new(PlayerId::new(1), TeamColor::Blue, &TrackerSettings::default())
    }

    #[test]
    fn test_no_player() {
        let tracker = tracker();
        assert!(!tracker.is_init());
        assert!(tracker.get().is_none());
    }

    #[test]
    fn test_no_data_after_one_update() {
        let mut tracker = tracker();
        tracker.update(0.0, &detection(100.0, 200.0, 0.0));
        assert!(!tracker.is_init());
        assert!(tracker.get().is_none());
    }

    #[test]
    fn test_basic_update() {
        let mut tracker = tracker();
        tracker.update(0.0, &detection(100.0, 200.0, 0.0));
        tracker.update(1.0 / 60.0, &detection(100.0, 200.0, 0.0));
        assert!(tracker.is_init());

        let data = tracker.get().unwrap();
        assert_eq!(data.id.as_u32(), 1);
        assert_relative_eq!(data.position, Vector2::new(100.0, 200.0), epsilon = 1e-6);
        assert_relative_eq!(data.velocity, Vector2::zeros(), epsilon = 1e-6);
        assert_eq!(data.yaw, Angle::from_radians(0.0));
    }

    #[test]
    fn test_yaw_is_smoothed() {
        let mut tracker = tracker();
        tracker.update(0.0, &detection(0.0, 0.0, PI / 2.0));
        tracker.update(0.1, &detection(0.0, 0.0, 0.0));
        let data = tracker.get().unwrap();
        assert_relative_eq!(data.raw_yaw.radians(), 0.0);
        assert_relative_eq!(data.yaw.radians(), PI / 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gone_after_timeout() {
        let mut tracker = tracker();
        tracker.update(0.0, &detection(0.0, 0.0, 0.0));
        tracker.update(0.1, &detection(0.0, 0.0, 0.0));
        tracker.check_is_gone(0.3);
        assert!(!tracker.is_gone());
        tracker.check_is_gone(1.0);
        assert!(tracker.is_gone());
        assert!(tracker.get().unwrap().is_gone);

        tracker.update(1.1, &detection(10.0, 0.0, 0.0));
        assert!(!tracker.is_gone());
    }
}
