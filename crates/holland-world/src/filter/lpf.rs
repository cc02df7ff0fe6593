use holland_core::Angle;

/// First-order low-pass filter for headings.
///
/// Smoothing happens on the difference to the previous output, so the filter
/// does not swing the long way round when the input crosses `±pi`.
#[derive(Debug, Clone)]
pub struct AngleLowPassFilter {
    /// Weight of the new sample, in `(0, 1]`.
    alpha: f64,
    last_output: Option<f64>,
}

impl AngleLowPassFilter {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(f64::EPSILON, 1.0),
            last_output: None,
        }
    }

    /// Feed a heading in radians and get the filtered heading, in `(-pi, pi]`.
    pub fn update(&mut self, input: f64) -> f64 {
        let output = match self.last_output {
            Some(last) => wrap(last + self.alpha * wrap(input - last)),
            None => wrap(input),
        };
        self.last_output = Some(output);
        output
    }

    pub fn update_settings(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(f64::EPSILON, 1.0);
    }

    pub fn reset(&mut self) {
        self.last_output = None;
    }
}

fn wrap(radians: f64) -> f64 {
    Angle::from_radians(radians).radians()
}
