//! Angle safety limits
//!
//! Two tiers apply to every command: the servo's mechanical range, then the
//! narrower per-axis range the rig can travel without binding.

use crate::protocol::Axis;
use serde::{Deserialize, Serialize};

/// Closed angle interval in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f64,
    pub max: f64,
}

impl AngleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `max(min, min(angle, max))`; NaN maps to `min`.
    pub fn clamp(&self, angle: f64) -> f64 {
        clamp(angle, self.min, self.max)
    }

    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }

    pub fn is_within(&self, outer: &AngleRange) -> bool {
        self.min >= outer.min && self.max <= outer.max
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(format!("{} range must be finite", name));
        }
        if self.min > self.max {
            return Err(format!(
                "{} range is empty: min {} > max {}",
                name, self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Clamp with deterministic handling of non-finite input.
pub fn clamp(angle: f64, lo: f64, hi: f64) -> f64 {
    if angle.is_nan() {
        return lo;
    }
    lo.max(angle.min(hi))
}

/// Safety limits for the rig
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyLimits {
    /// Servo mechanical range
    pub global: AngleRange,
    /// Pan travel
    pub pan: AngleRange,
    /// Tilt travel
    pub tilt: AngleRange,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            global: AngleRange::new(0.0, 180.0),
            pan: AngleRange::new(30.0, 150.0),
            tilt: AngleRange::new(60.0, 150.0),
        }
    }
}

impl SafetyLimits {
    /// Full mechanical travel on both axes.
    pub fn unrestricted() -> Self {
        let global = AngleRange::new(0.0, 180.0);
        Self {
            global,
            pan: global,
            tilt: global,
        }
    }

    pub fn axis(&self, axis: Axis) -> AngleRange {
        match axis {
            Axis::Pan => self.pan,
            Axis::Tilt => self.tilt,
        }
    }

    /// Validate limits
    pub fn validate(&self) -> Result<(), String> {
        self.global.validate("Global")?;
        self.pan.validate("Pan")?;
        self.tilt.validate("Tilt")?;

        if self.global.min < 0.0 || self.global.max > 999.0 {
            return Err("Global range must lie within 0..=999 degrees".to_string());
        }
        if !self.pan.is_within(&self.global) {
            return Err("Pan range must lie within the global range".to_string());
        }
        if !self.tilt.is_within(&self.global) {
            return Err("Tilt range must lie within the global range".to_string());
        }
        Ok(())
    }
}

/// Applies both clamp tiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorLimiter {
    limits: SafetyLimits,
}

impl ActuatorLimiter {
    pub fn new(limits: SafetyLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SafetyLimits {
        &self.limits
    }

    /// Mechanical range only.
    pub fn clamp_global(&self, angle: f64) -> f64 {
        self.limits.global.clamp(angle)
    }

    /// Mechanical range, then the axis range.
    pub fn limit(&self, axis: Axis, angle: f64) -> f64 {
        self.limits.axis(axis).clamp(self.clamp_global(angle))
    }
}

impl Default for ActuatorLimiter {
    fn default() -> Self {
        Self::new(SafetyLimits::default())
    }
}
