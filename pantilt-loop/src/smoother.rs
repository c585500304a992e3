//! Exponential smoothing of commanded angles

use pantilt_cns::CENTER_ANGLE;
use serde::{Deserialize, Serialize};

/// Default smoothing factor.
pub const DEFAULT_SMOOTHING: f64 = 0.7;

/// `previous + (target - previous) * factor`
///
/// Both fixed points are exact: `factor == 1` yields `target` and
/// `target == previous` yields `previous`, with no rounding drift.
pub fn smooth(target: f64, previous: f64, factor: f64) -> f64 {
    if factor == 1.0 {
        return target;
    }
    if target == previous {
        return previous;
    }
    previous + (target - previous) * factor
}

/// Last angles actually commanded, after clamping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingState {
    pub pan: f64,
    pub tilt: f64,
}

impl Default for SmoothingState {
    fn default() -> Self {
        Self::centered()
    }
}

impl SmoothingState {
    pub fn new(pan: f64, tilt: f64) -> Self {
        Self { pan, tilt }
    }

    pub fn centered() -> Self {
        Self::new(CENTER_ANGLE, CENTER_ANGLE)
    }
}

/// Per-axis smoother with a fixed factor in (0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSmoother {
    factor: f64,
}

impl Default for MotionSmoother {
    fn default() -> Self {
        Self { factor: DEFAULT_SMOOTHING }
    }
}

impl MotionSmoother {
    pub fn new(factor: f64) -> Result<Self, String> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(format!("Smoothing factor must be in (0, 1], got {}", factor));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Blend the target pair towards `previous`.
    pub fn smooth(&self, target: (f64, f64), previous: &SmoothingState) -> (f64, f64) {
        (
            smooth(target.0, previous.pan, self.factor),
            smooth(target.1, previous.tilt, self.factor),
        )
    }
}
