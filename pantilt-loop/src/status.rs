//! Loop status snapshot

use crate::state::LoopState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot shown to the operator after every cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopStatus {
    pub state: LoopState,
    pub object_found: bool,
    /// Last location the target was seen at
    pub object_location: Option<(u32, u32)>,
    pub pan: f64,
    pub tilt: f64,
    pub connected: bool,
    pub manual_step: u32,
    /// Cycles completed since start
    pub cycles: u64,
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | pan {:.1} tilt {:.1} | ",
            self.state, self.pan, self.tilt
        )?;
        match (self.object_found, self.object_location) {
            (true, Some((x, y))) => write!(f, "target ({}, {})", x, y)?,
            _ => write!(f, "no target")?,
        }
        if matches!(self.state, LoopState::Manual) {
            write!(f, " | step {}", self.manual_step)?;
        }
        if !self.connected {
            write!(f, " | servo offline")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> LoopStatus {
        LoopStatus {
            state: LoopState::Tracking,
            object_found: true,
            object_location: Some((320, 240)),
            pan: 90.0,
            tilt: 92.3,
            connected: true,
            manual_step: 5,
            cycles: 3,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(status().to_string(), "TRACKING | pan 90.0 tilt 92.3 | target (320, 240)");

        let mut offline = status();
        offline.state = LoopState::Manual;
        offline.object_found = false;
        offline.connected = false;
        assert_eq!(
            offline.to_string(),
            "MANUAL | pan 90.0 tilt 92.3 | no target | step 5 | servo offline"
        );
    }

    #[test]
    fn test_serializes() {
        let json = serde_json::to_value(status()).unwrap();
        assert_eq!(json["state"]["state"], "tracking");
        assert_eq!(json["object_location"][0], 320);
        assert_eq!(json["cycles"], 3);
    }
}
