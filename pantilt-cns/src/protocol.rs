//! Servo wire protocol
//!
//! One ASCII line per command: `#<axis><degrees>\n`. The axis id is a single
//! digit and directly precedes the integer angle with no separator.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rig axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal
    Pan,
    /// Vertical
    Tilt,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Pan, Axis::Tilt];

    /// Wire identifier.
    pub fn id(self) -> u8 {
        match self {
            Axis::Pan => 1,
            Axis::Tilt => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Axis::Pan),
            2 => Some(Axis::Tilt),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Pan => write!(f, "pan"),
            Axis::Tilt => write!(f, "tilt"),
        }
    }
}

/// One servo positioning command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCommand {
    pub axis: Axis,
    pub degrees: u16,
}

impl WireCommand {
    /// Build from an already clamped angle; the fraction is truncated.
    pub fn from_angle(axis: Axis, angle: f64) -> Self {
        Self {
            axis,
            degrees: angle.trunc().max(0.0) as u16,
        }
    }

    pub fn encode(&self) -> Bytes {
        Bytes::from(self.to_string())
    }

    /// Parse one line, with or without the trailing newline.
    pub fn decode(line: &[u8]) -> Option<Self> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let rest = line.strip_prefix(b"#")?;
        let (&axis, digits) = rest.split_first()?;
        let axis = Axis::from_id(axis.checked_sub(b'0')?)?;
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let degrees = std::str::from_utf8(digits).ok()?.parse().ok()?;
        Some(Self { axis, degrees })
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{}{}", self.axis.id(), self.degrees)
    }
}
