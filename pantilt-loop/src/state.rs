//! Control loop state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode the loop runs in while not paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveMode {
    Tracking,
    Manual,
}

impl ActiveMode {
    pub fn toggled(self) -> Self {
        match self {
            ActiveMode::Tracking => ActiveMode::Manual,
            ActiveMode::Manual => ActiveMode::Tracking,
        }
    }
}

/// Loop lifecycle
///
/// ```text
/// Idle -> Tracking <-> Manual
///         Tracking | Manual <-> Paused { resume }
///         any active -> ShuttingDown -> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Tracking,
    Manual,
    Paused { resume: ActiveMode },
    ShuttingDown,
}

impl Default for LoopState {
    fn default() -> Self {
        LoopState::Idle
    }
}

impl LoopState {
    /// Tracking, Manual or Paused.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            LoopState::Tracking | LoopState::Manual | LoopState::Paused { .. }
        )
    }

    /// The running mode, if not paused.
    pub fn mode(&self) -> Option<ActiveMode> {
        match self {
            LoopState::Tracking => Some(ActiveMode::Tracking),
            LoopState::Manual => Some(ActiveMode::Manual),
            _ => None,
        }
    }

    pub fn from_mode(mode: ActiveMode) -> Self {
        match mode {
            ActiveMode::Tracking => LoopState::Tracking,
            ActiveMode::Manual => LoopState::Manual,
        }
    }

    /// Result of a pause toggle; non-active states are unchanged.
    pub fn toggle_pause(self) -> Self {
        match self {
            LoopState::Paused { resume } => LoopState::from_mode(resume),
            other => match other.mode() {
                Some(mode) => LoopState::Paused { resume: mode },
                None => other,
            },
        }
    }

    /// Result of a mode toggle; while paused the resume mode flips.
    pub fn toggle_mode(self) -> Self {
        match self {
            LoopState::Paused { resume } => LoopState::Paused {
                resume: resume.toggled(),
            },
            other => match other.mode() {
                Some(mode) => LoopState::from_mode(mode.toggled()),
                None => other,
            },
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Idle => write!(f, "IDLE"),
            LoopState::Tracking => write!(f, "TRACKING"),
            LoopState::Manual => write!(f, "MANUAL"),
            LoopState::Paused { .. } => write!(f, "PAUSED"),
            LoopState::ShuttingDown => write!(f, "SHUTTING DOWN"),
        }
    }
}

/// Operator command delivered between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorEvent {
    TogglePause,
    ToggleMode,
    /// Re-centre and reset smoothing
    Calibrate,
    /// Calibrate and restore the default manual step
    Reset,
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    SpeedUp,
    SpeedDown,
}

impl OperatorEvent {
    pub const ALL: [OperatorEvent; 11] = [
        OperatorEvent::TogglePause,
        OperatorEvent::ToggleMode,
        OperatorEvent::Calibrate,
        OperatorEvent::Reset,
        OperatorEvent::Quit,
        OperatorEvent::MoveUp,
        OperatorEvent::MoveDown,
        OperatorEvent::MoveLeft,
        OperatorEvent::MoveRight,
        OperatorEvent::SpeedUp,
        OperatorEvent::SpeedDown,
    ];

    /// (pan, tilt) direction of a move event. Up lowers the tilt angle.
    pub fn direction(&self) -> Option<(f64, f64)> {
        match self {
            OperatorEvent::MoveUp => Some((0.0, -1.0)),
            OperatorEvent::MoveDown => Some((0.0, 1.0)),
            OperatorEvent::MoveLeft => Some((-1.0, 0.0)),
            OperatorEvent::MoveRight => Some((1.0, 0.0)),
            _ => None,
        }
    }
}
