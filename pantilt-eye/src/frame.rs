//! Frame types shared by the vision pipeline

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// One RGB camera frame.
pub type Frame = RgbImage;

/// Frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(frame: &Frame) -> Self {
        Self::new(frame.width(), frame.height())
    }

    /// Optical centre; half-pixel for odd sizes.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
