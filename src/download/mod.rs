//! Pacing and retry around engine calls

pub mod retry;
pub mod throttle;

pub use retry::*;
pub use throttle::*;
