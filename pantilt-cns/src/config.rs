//! Configuration for pantilt-cns

use crate::safety::SafetyLimits;
use crate::transport::{TransportConfig, TransportType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pause after opening the port before the controller accepts commands.
/// Boards that reset on open need this to finish booting.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Servo link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// Serial device
    pub port: String,
    /// Line speed
    pub baud_rate: u32,
    /// Settle step after connecting, in milliseconds
    pub settle_delay_ms: u64,
    /// Write timeout in milliseconds
    pub timeout_ms: u64,
    /// Angle clamp ranges
    pub limits: SafetyLimits,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: 9600,
            settle_delay_ms: SETTLE_DELAY.as_millis() as u64,
            timeout_ms: 1000,
            limits: SafetyLimits::default(),
        }
    }
}

impl ServoConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port.trim().is_empty() {
            return Err("Serial port must not be empty".to_string());
        }

        if self.baud_rate == 0 {
            return Err("Baud rate must be greater than 0".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Write timeout must be greater than 0".to_string());
        }

        // A minute is far beyond any board's boot time
        if self.settle_delay_ms > 60_000 {
            return Err(format!(
                "Settle delay too long: {} ms (max: 60000)",
                self.settle_delay_ms
            ));
        }

        self.limits.validate()
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Transport settings for this servo link.
    pub fn transport(&self, transport_type: TransportType) -> TransportConfig {
        TransportConfig {
            transport_type,
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            timeout_ms: self.timeout_ms,
        }
    }
}
