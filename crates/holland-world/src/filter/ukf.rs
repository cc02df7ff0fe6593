use nalgebra::{SMatrix, SVector};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum UkfError {
    #[error("scaling constant {0} leaves N + lambda non-positive")]
    InvalidScaling(f64),
    #[error("covariance is not positive definite")]
    NotPositiveDefinite,
    #[error("innovation covariance is singular")]
    SingularInnovation,
}

/// A Gaussian belief over an `N`-dimensional state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateModel<const N: usize> {
    pub mean: SVector<f64, N>,
    pub covariance: SMatrix<f64, N, N>,
}

impl<const N: usize> StateModel<N> {
    pub fn new(mean: SVector<f64, N>, covariance: SMatrix<f64, N, N>) -> Self {
        Self { mean, covariance }
    }
}

/// The `2N + 1` sigma points of a belief: the mean, then `mean + L_i` and
/// `mean - L_i` for every column of the scaled Cholesky factor.
#[derive(Debug, Clone, Copy)]
pub struct SigmaPoints<const N: usize> {
    center: SVector<f64, N>,
    spread: SMatrix<f64, N, N>,
}

impl<const N: usize> SigmaPoints<N> {
    pub fn len(&self) -> usize {
        2 * N + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn point(&self, i: usize) -> SVector<f64, N> {
        match i {
            0 => self.center,
            i if i <= N => self.center + self.spread.column(i - 1),
            i => self.center - self.spread.column(i - 1 - N),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = SVector<f64, N>> + '_ {
        (0..self.len()).map(|i| self.point(i))
    }
}

/// Unscented Kalman filter with linear transition and measurement models.
///
/// All buffers are stack matrices; nothing here allocates.
#[derive(Debug, Clone)]
pub struct Ukf<const N: usize> {
    lambda: f64,
    w0: f64,
    wi: f64,
    state: StateModel<N>,
}

impl<const N: usize> Ukf<N> {
    pub fn new(lambda: f64, initial: StateModel<N>) -> Result<Self, UkfError> {
        let scale = N as f64 + lambda;
        if scale <= 0.0 {
            return Err(UkfError::InvalidScaling(lambda));
        }
        Ok(Self {
            lambda,
            w0: lambda / scale,
            wi: 1.0 / (2.0 * scale),
            state: initial,
        })
    }

    pub fn state(&self) -> &StateModel<N> {
        &self.state
    }

    pub fn mean(&self) -> &SVector<f64, N> {
        &self.state.mean
    }

    pub fn covariance(&self) -> &SMatrix<f64, N, N> {
        &self.state.covariance
    }

    /// Replace the belief, e.g. when a track is restarted.
    pub fn reset(&mut self, state: StateModel<N>) {
        self.state = state;
    }

    pub fn weight(&self, i: usize) -> f64 {
        if i == 0 {
            self.w0
        } else {
            self.wi
        }
    }

    pub fn sigma_points(&self) -> Result<SigmaPoints<N>, UkfError> {
        let scaled = self.state.covariance * (N as f64 + self.lambda);
        let chol = scaled.cholesky().ok_or(UkfError::NotPositiveDefinite)?;
        Ok(SigmaPoints {
            center: self.state.mean,
            spread: chol.l(),
        })
    }

    /// Propagate the belief through `f`, adding the process noise `q` if given.
    ///
    /// The belief is left untouched on error.
    pub fn predict(
        &mut self,
        f: &SMatrix<f64, N, N>,
        q: Option<&SMatrix<f64, N, N>>,
    ) -> Result<(), UkfError> {
        let sigma = self.sigma_points()?;

        let mut mean = SVector::<f64, N>::zeros();
        for (i, x) in sigma.iter().enumerate() {
            mean += (f * x) * self.weight(i);
        }

        let mut covariance = SMatrix::<f64, N, N>::zeros();
        for (i, x) in sigma.iter().enumerate() {
            let d = f * x - mean;
            covariance += (d * d.transpose()) * self.weight(i);
        }
        if let Some(q) = q {
            covariance += q;
        }

        self.state = StateModel::new(mean, symmetrize(covariance));
        Ok(())
    }

    /// Fold the measurement `z` taken through `h` with noise `r` into the belief.
    ///
    /// The belief is left untouched on error.
    pub fn update<const M: usize>(
        &mut self,
        h: &SMatrix<f64, M, N>,
        r: &SMatrix<f64, M, M>,
        z: &SVector<f64, M>,
    ) -> Result<(), UkfError> {
        let sigma = self.sigma_points()?;

        let mut z_mean = SVector::<f64, M>::zeros();
        for (i, x) in sigma.iter().enumerate() {
            z_mean += (h * x) * self.weight(i);
        }

        let mut s = *r;
        let mut cross = SMatrix::<f64, N, M>::zeros();
        for (i, x) in sigma.iter().enumerate() {
            let dz = h * x - z_mean;
            let dx = x - self.state.mean;
            s += (dz * dz.transpose()) * self.weight(i);
            cross += (dx * dz.transpose()) * self.weight(i);
        }

        let s_inv = s.try_inverse().ok_or(UkfError::SingularInnovation)?;
        let gain = cross * s_inv;

        let mean = self.state.mean + gain * (z - z_mean);
        let covariance = self.state.covariance - gain * s * gain.transpose();
        self.state = StateModel::new(mean, symmetrize(covariance));
        Ok(())
    }
}

fn symmetrize<const N: usize>(m: SMatrix<f64, N, N>) -> SMatrix<f64, N, N> {
    (m + m.transpose()) * 0.5
}
