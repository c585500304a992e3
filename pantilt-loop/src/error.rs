//! Error types for pantilt-loop

use pantilt_cns::CnsError;
use pantilt_eye::VisionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    /// Frame source failed or delivered an unusable frame
    #[error("Frame acquisition failed: {0}")]
    Acquisition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Actuator error: {0}")]
    Cns(#[from] CnsError),
}
