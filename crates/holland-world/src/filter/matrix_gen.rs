//! Model matrices for a planar constant-velocity state `(x, y, vx, vy)`.

use nalgebra::{Matrix2, Matrix4};

/// Places a per-axis `(position, velocity)` block on both axes of the state.
fn per_axis(block: &Matrix2<f64>) -> Matrix4<f64> {
    let mut m = Matrix4::zeros();
    for axis in 0..2 {
        let (p, v) = (axis, axis + 2);
        m[(p, p)] = block[(0, 0)];
        m[(p, v)] = block[(0, 1)];
        m[(v, p)] = block[(1, 0)];
        m[(v, v)] = block[(1, 1)];
    }
    m
}

/// Transition matrix assuming constant speed over `delta_t`.
pub fn constant_velocity(delta_t: f64) -> Matrix4<f64> {
    per_axis(&Matrix2::new(1.0, delta_t, 0.0, 1.0))
}

/// Process noise of a white-noise acceleration, for unit variance.
pub fn white_noise_1st_order(delta_t: f64) -> Matrix4<f64> {
    per_axis(&Matrix2::new(
        delta_t.powi(3) / 3.0,
        delta_t.powi(2) / 2.0,
        delta_t.powi(2) / 2.0,
        delta_t,
    ))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    use super::*;

    #[test]
    fn test_constant_velocity_moves_position() {
        let x = constant_velocity(0.5) * Vector4::new(100.0, -100.0, 200.0, 40.0);
        assert_relative_eq!(x, Vector4::new(200.0, -80.0, 200.0, 40.0));
    }

    #[test]
    fn test_white_noise_layout() {
        let q = white_noise_1st_order(2.0);
        assert_relative_eq!(q[(0, 0)], 8.0 / 3.0);
        assert_relative_eq!(q[(1, 3)], 2.0);
        assert_relative_eq!(q[(3, 3)], 2.0);
        assert_relative_eq!(q[(0, 1)], 0.0);
        assert_relative_eq!(q, q.transpose());
    }
}
