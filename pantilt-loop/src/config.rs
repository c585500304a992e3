//! Tracker configuration
//!
//! One file holds every section. Values are resolved in this order: file
//! (JSON, then TOML), `PANTILT_*` environment variables, command-line flags.

use crate::converter::DEFAULT_GAIN;
use crate::error::ControlError;
use crate::smoother::DEFAULT_SMOOTHING;
use pantilt_cns::ServoConfig;
use pantilt_eye::VisionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Smallest manual step in degrees.
pub const MANUAL_STEP_MIN: u32 = 1;

/// Control law and operator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Proportional gain from pixel error to angle
    pub gain: f64,
    /// Exponential smoothing factor in (0, 1]
    pub smoothing_factor: f64,
    /// Initial manual step in degrees
    pub manual_step: u32,
    /// Upper bound for the manual step
    pub manual_step_max: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            gain: DEFAULT_GAIN,
            smoothing_factor: DEFAULT_SMOOTHING,
            manual_step: 5,
            manual_step_max: 20,
        }
    }
}

impl ControlConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.gain.is_finite() || self.gain <= 0.0 {
            return Err(format!("Gain must be a positive number, got {}", self.gain));
        }

        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(format!(
                "Smoothing factor must be in (0, 1], got {}",
                self.smoothing_factor
            ));
        }

        if self.manual_step_max < MANUAL_STEP_MIN || self.manual_step_max > 90 {
            return Err(format!(
                "Maximum manual step must be between {} and 90",
                MANUAL_STEP_MIN
            ));
        }

        if self.manual_step < MANUAL_STEP_MIN || self.manual_step > self.manual_step_max {
            return Err(format!(
                "Manual step must be between {} and {}",
                MANUAL_STEP_MIN, self.manual_step_max
            ));
        }

        Ok(())
    }
}

/// Complete tracker configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub control: ControlConfig,
    pub vision: VisionConfig,
    pub servo: ServoConfig,
}

impl TrackerConfig {
    /// Read a config file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ControlError> {
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ControlError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ControlError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_str(&content)
    }

    /// Parse configuration from string (JSON, then TOML)
    pub fn from_str(content: &str) -> Result<Self, ControlError> {
        if let Ok(config) = serde_json::from_str::<TrackerConfig>(content) {
            return Ok(config);
        }

        toml::from_str::<TrackerConfig>(content)
            .map_err(|e| ControlError::Config(format!("Unrecognised configuration: {}", e)))
    }

    /// Apply `PANTILT_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ControlError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ControlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PANTILT_PORT") {
            self.servo.port = port;
        }
        if let Some(baud) = parse_var(&lookup, "PANTILT_BAUD_RATE")? {
            self.servo.baud_rate = baud;
        }
        if let Some(delay) = parse_var(&lookup, "PANTILT_SETTLE_DELAY_MS")? {
            self.servo.settle_delay_ms = delay;
        }
        if let Some(camera) = parse_var(&lookup, "PANTILT_CAMERA_ID")? {
            self.vision.camera_id = camera;
        }
        if let Some(area) = parse_var(&lookup, "PANTILT_MIN_AREA")? {
            self.vision.min_area = area;
        }
        if let Some(gain) = parse_var(&lookup, "PANTILT_GAIN")? {
            self.control.gain = gain;
        }
        if let Some(factor) = parse_var(&lookup, "PANTILT_SMOOTHING_FACTOR")? {
            self.control.smoothing_factor = factor;
        }
        if let Some(step) = parse_var(&lookup, "PANTILT_MANUAL_STEP")? {
            self.control.manual_step = step;
        }
        Ok(())
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ControlError> {
        self.vision
            .validate()
            .map_err(|e| ControlError::Config(format!("vision: {}", e)))?;
        self.servo
            .validate()
            .map_err(|e| ControlError::Config(format!("servo: {}", e)))?;
        self.control
            .validate()
            .map_err(|e| ControlError::Config(format!("control: {}", e)))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ControlError> {
        toml::to_string_pretty(self).map_err(|e| ControlError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ControlError> {
        serde_json::to_string_pretty(self).map_err(|e| ControlError::Config(e.to_string()))
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ControlError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ControlError::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.control.gain, 0.1);
        assert_eq!(config.control.smoothing_factor, 0.7);
        assert_eq!(config.control.manual_step, 5);
    }

    #[test]
    fn test_partial_toml() {
        let config = TrackerConfig::from_str(
            r#"
            [control]
            gain = 0.25

            [servo]
            port = "/dev/ttyACM1"

            [vision.color_range]
            low = [100, 150, 50]
            high = [130, 255, 255]
            "#,
        )
        .unwrap();
        assert_eq!(config.control.gain, 0.25);
        assert_eq!(config.control.smoothing_factor, 0.7);
        assert_eq!(config.servo.port, "/dev/ttyACM1");
        assert_eq!(config.vision.color_range.low().h, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = TrackerConfig::from_str(r#"{"vision": {"min_area": 50}}"#).unwrap();
        assert_eq!(config.vision.min_area, 50);
        assert_eq!(config.servo, ServoConfig::default());
    }

    #[test]
    fn test_inverted_hue_rejected_at_parse() {
        let result = TrackerConfig::from_str(
            r#"
            [vision.color_range]
            low = [170, 100, 100]
            high = [10, 255, 255]
            "#,
        );
        assert!(matches!(result, Err(ControlError::Config(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(TrackerConfig::from_str("gain: [").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PANTILT_PORT", "COM9"),
            ("PANTILT_GAIN", "0.05"),
            ("PANTILT_MANUAL_STEP", " 7 "),
            ("PANTILT_SETTLE_DELAY_MS", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = TrackerConfig::default();
        config
            .apply_env_with(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.servo.port, "COM9");
        assert_eq!(config.control.gain, 0.05);
        assert_eq!(config.control.manual_step, 7);
        assert_eq!(config.servo.settle_delay_ms, 0);
        assert_eq!(config.vision.camera_id, 0);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = TrackerConfig::default();
        let result = config.apply_env_with(|key| {
            (key == "PANTILT_BAUD_RATE").then(|| "fast".to_string())
        });
        assert!(matches!(result, Err(ControlError::Config(msg)) if msg.contains("PANTILT_BAUD_RATE")));
    }

    #[test]
    fn test_control_validation() {
        let mut control = ControlConfig::default();
        control.smoothing_factor = 0.0;
        assert!(control.validate().is_err());

        let mut control = ControlConfig::default();
        control.manual_step = 21;
        assert!(control.validate().is_err());

        let mut control = ControlConfig::default();
        control.gain = f64::NAN;
        assert!(control.validate().is_err());
    }

    #[test]
    fn test_validation_names_section() {
        let mut config = TrackerConfig::default();
        config.servo.baud_rate = 0;
        match config.validate() {
            Err(ControlError::Config(msg)) => assert!(msg.starts_with("servo:")),
            other => panic!("Expected servo config error, got {:?}", other),
        }
    }
}
