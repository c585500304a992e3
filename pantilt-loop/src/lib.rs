//! pantilt-loop: closed-loop tracking controller
//!
//! Ties the vision pipeline to the actuator link: pixel error becomes a
//! proportional angle step, exponentially smoothed, then clamped and sent.
//! Operator input switches between tracking, manual jogging and pause.

pub mod config;
pub mod control;
pub mod converter;
pub mod error;
pub mod operator;
pub mod smoother;
pub mod state;
pub mod status;

pub use config::{ControlConfig, TrackerConfig};
pub use control::{ControlLoop, ExitReason};
pub use converter::AngleConverter;
pub use error::ControlError;
pub use operator::{HeadlessOperator, Operator, ScriptedOperator};
pub use smoother::{smooth, MotionSmoother, SmoothingState};
pub use state::{ActiveMode, LoopState, OperatorEvent};
pub use status::LoopStatus;
