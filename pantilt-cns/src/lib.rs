//! pantilt-cns: servo command path for the pan/tilt rig
//!
//! Provides:
//! - The `#<axis><degrees>\n` wire protocol
//! - Two-tier angle safety limits
//! - Pluggable transport layer abstraction (memory, serial)
//! - The actuator link that owns the rig's last known position

pub mod error;
pub mod protocol;
pub mod safety;
pub mod transport;
pub mod link;
pub mod config;

pub use error::CnsError;
pub use protocol::{Axis, WireCommand};
pub use safety::{ActuatorLimiter, AngleRange, SafetyLimits};
pub use transport::{create_transport, MemoryTransport, Transport, TransportConfig, TransportType};
#[cfg(feature = "serial-transport")]
pub use transport::SerialTransport;
pub use link::{ActuatorLink, ActuatorState, CENTER_ANGLE};
pub use config::{ServoConfig, SETTLE_DELAY};
