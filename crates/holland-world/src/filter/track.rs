use holland_core::Vector2;
use nalgebra::{Matrix4, Vector4};

use super::{
    matrix_gen::{constant_velocity, white_noise_1st_order},
    StateModel, Ukf, UkfError,
};

/// Noise and timing parameters of a [`KinematicTrack`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackParams {
    pub lambda: f64,
    pub unit_transition_var: f64,
    pub measurement_var: f64,
    pub velocity_measurement_var: f64,
    /// Used as dt when timestamps do not advance
    pub tick_interval: f64,
    pub max_consecutive_failures: u32,
}

/// Position and velocity belief of one object, fed with raw positions.
///
/// Every observation also yields an instantaneous velocity, `(z - previous
/// mean) / dt`, which is measured together with the position.
#[derive(Debug, Clone)]
pub struct KinematicTrack {
    params: TrackParams,
    ukf: Option<Ukf<4>>,
    last_t: f64,
    failures: u32,
}

impl KinematicTrack {
    pub fn new(params: TrackParams) -> Self {
        Self {
            params,
            ukf: None,
            last_t: 0.0,
            failures: 0,
        }
    }

    pub fn is_init(&self) -> bool {
        self.ukf.is_some()
    }

    pub fn update_params(&mut self, params: TrackParams) {
        self.params = params;
    }

    pub fn position(&self) -> Option<Vector2> {
        self.ukf.as_ref().map(|ukf| {
            let m = ukf.mean();
            Vector2::new(m[0], m[1])
        })
    }

    pub fn velocity(&self) -> Option<Vector2> {
        self.ukf.as_ref().map(|ukf| {
            let m = ukf.mean();
            Vector2::new(m[2], m[3])
        })
    }

    /// Fold in a position seen at time `t`.
    pub fn observe(&mut self, t: f64, z: Vector2) {
        let Some(ukf) = self.ukf.as_mut() else {
            self.restart(t, z);
            return;
        };

        let dt = if t > self.last_t {
            t - self.last_t
        } else {
            self.params.tick_interval
        };
        self.last_t = t.max(self.last_t);

        let prev = Vector2::new(ukf.mean()[0], ukf.mean()[1]);
        let result = step(ukf, &self.params, dt, prev, z);

        match result {
            Ok(()) => self.failures = 0,
            Err(err) => {
                self.failures += 1;
                log::warn!(
                    "Dropping measurement ({} in a row): {}",
                    self.failures,
                    err
                );
                if self.failures >= self.params.max_consecutive_failures {
                    log::warn!("Restarting track at ({:.0}, {:.0})", z.x, z.y);
                    self.restart(t, z);
                }
            }
        }
    }

    fn restart(&mut self, t: f64, z: Vector2) {
        let p = &self.params;
        let initial = StateModel::new(
            Vector4::new(z.x, z.y, 0.0, 0.0),
            Matrix4::from_diagonal(&Vector4::new(
                p.measurement_var,
                p.measurement_var,
                p.velocity_measurement_var,
                p.velocity_measurement_var,
            )),
        );
        match Ukf::new(p.lambda, initial) {
            Ok(ukf) => self.ukf = Some(ukf),
            Err(err) => {
                log::error!("Cannot start track: {}", err);
                self.ukf = None;
            }
        }
        self.last_t = t;
        self.failures = 0;
    }
}

/// Predict over `dt`, then update with the position and derived velocity.
/// A failed update keeps the prediction.
fn step(
    ukf: &mut Ukf<4>,
    params: &TrackParams,
    dt: f64,
    prev: Vector2,
    z: Vector2,
) -> Result<(), UkfError> {
    let q = white_noise_1st_order(dt) * params.unit_transition_var;
    ukf.predict(&constant_velocity(dt), Some(&q))?;

    let v = (z - prev) / dt;
    let measurement = Vector4::new(z.x, z.y, v.x, v.y);
    let r = Matrix4::from_diagonal(&Vector4::new(
        params.measurement_var,
        params.measurement_var,
        params.velocity_measurement_var,
        params.velocity_measurement_var,
    ));
    ukf.update(&Matrix4::identity(), &r, &measurement)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use rand_distr::{Distribution, Normal};

    use super::*;

    fn params() -> TrackParams {
        TrackParams {
            lambda: 2.0,
            unit_transition_var: 2e4,
            measurement_var: 4.0,
            velocity_measurement_var: 3e4,
            tick_interval: 1.0 / 60.0,
            max_consecutive_failures: 5,
        }
    }

    #[test]
    fn first_observation_starts_track() {
        let mut track = KinematicTrack::new(params());
        assert!(!track.is_init());
        track.observe(0.0, Vector2::new(100.0, 200.0));
        assert_eq!(track.position(), Some(Vector2::new(100.0, 200.0)));
        assert_eq!(track.velocity(), Some(Vector2::zeros()));
    }

    #[test]
    fn follows_constant_velocity() {
        let mut track = KinematicTrack::new(params());
        let v = Vector2::new(1200.0, -400.0);
        let dt = 1.0 / 60.0;
        for k in 0..300 {
            let t = k as f64 * dt;
            track.observe(t, Vector2::new(-3000.0, 1000.0) + v * t);
        }
        let est = track.velocity().unwrap();
        assert_relative_eq!(est.x, v.x, epsilon = 10.0);
        assert_relative_eq!(est.y, v.y, epsilon = 10.0);
    }

    #[test]
    fn smooths_noisy_stationary_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 2.0).unwrap();
        let mut track = KinematicTrack::new(params());
        let target = Vector2::new(500.0, -500.0);
        for k in 0..240 {
            let z = target + Vector2::new(noise.sample(&mut rng), noise.sample(&mut rng));
            track.observe(k as f64 / 60.0, z);
        }
        let pos = track.position().unwrap();
        assert!((pos - target).norm() < 8.0);
        assert!(track.velocity().unwrap().norm() < 300.0);
    }

    #[test]
    fn repeated_timestamp_uses_tick_interval() {
        let mut track = KinematicTrack::new(params());
        track.observe(1.0, Vector2::new(0.0, 0.0));
        track.observe(1.0, Vector2::new(10.0, 0.0));
        let v = track.velocity().unwrap();
        assert!(v.x.is_finite() && v.x > 0.0);
    }
}
