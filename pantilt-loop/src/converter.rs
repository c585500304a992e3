//! Pixel error to angle conversion

use pantilt_eye::{FrameSize, PixelError};
use serde::{Deserialize, Serialize};

/// Default proportional gain.
pub const DEFAULT_GAIN: f64 = 0.1;

/// Proportional mapping from pixel error to a target angle.
///
/// The full frame width spans 180 degrees before gain is applied. Image y
/// grows downwards, so a target below centre lowers the tilt angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleConverter {
    pub gain: f64,
}

impl Default for AngleConverter {
    fn default() -> Self {
        Self { gain: DEFAULT_GAIN }
    }
}

impl AngleConverter {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }

    /// Target `(pan, tilt)` from the error and the current angles.
    pub fn to_angle(&self, error: PixelError, frame_size: FrameSize, pan: f64, tilt: f64) -> (f64, f64) {
        let deg_per_px_x = 180.0 / f64::from(frame_size.width);
        let deg_per_px_y = 180.0 / f64::from(frame_size.height);
        (
            pan + error.x * deg_per_px_x * self.gain,
            tilt - error.y * deg_per_px_y * self.gain,
        )
    }
}
