mod lpf;
mod matrix_gen;
mod track;
pub mod ukf;

pub use lpf::AngleLowPassFilter;
pub use track::{KinematicTrack, TrackParams};
pub use ukf::{SigmaPoints, StateModel, Ukf, UkfError};
