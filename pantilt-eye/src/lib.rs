//! pantilt-eye: colour target localisation
//!
//! Turns camera frames into a single tracked point: HSV thresholding,
//! morphological clean-up, region extraction and centroid computation,
//! plus the pixel error of that point from the optical centre.

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod processing;
mod utils;

pub use camera::{FrameSequence, FrameSource};
pub use color::{ColorRange, Hsv};
pub use config::VisionConfig;
pub use error::VisionError;
pub use frame::{Frame, FrameSize};
pub use processing::{DetectionResult, ErrorEstimator, FrameSegmenter, PixelError, TargetStatus};
