mod goto;

pub use goto::{ramp_speed, GotoPosition, MoveRequest};
