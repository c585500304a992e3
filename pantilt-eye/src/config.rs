//! Configuration for pantilt-eye

use crate::color::ColorRange;
use crate::frame::FrameSize;
use serde::{Deserialize, Serialize};

/// Vision system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// USB camera device index (0, 1, 2, etc.)
    pub camera_id: u32,
    /// Target frame rate (frames per second)
    pub frame_rate: u32,
    /// Session frame size (width, height); frames are resized to this
    pub resolution: (u32, u32),
    /// Regions with an area at or below this many pixels are ignored
    pub min_area: u32,
    /// Draw the detected outline and centroid onto the frame
    pub draw_overlay: bool,
    /// Target colour; hue in `0..=179`, with a high hue of 180 read as 179
    pub color_range: ColorRange,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            camera_id: 0,
            frame_rate: 30,
            resolution: (640, 480),
            min_area: 500,
            draw_overlay: true,
            color_range: ColorRange::red(),
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_rate == 0 || self.frame_rate > 120 {
            return Err("Frame rate must be between 1 and 120".to_string());
        }

        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err("Resolution must be non-zero".to_string());
        }

        if self.resolution.0 > 7680 || self.resolution.1 > 4320 {
            return Err("Resolution too large (max 8K)".to_string());
        }

        let total_pixels = self.resolution.0
            .checked_mul(self.resolution.1)
            .ok_or_else(|| "Resolution would cause integer overflow".to_string())?;

        if self.min_area >= total_pixels {
            return Err(format!(
                "Minimum area {} leaves no detectable region in a {}x{} frame",
                self.min_area, self.resolution.0, self.resolution.1
            ));
        }

        if self.camera_id > 100 {
            return Err("Camera ID too large (max 100)".to_string());
        }

        // Re-check in case the range was built field by field
        ColorRange::new(self.color_range.low(), self.color_range.high())
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Frame dimensions for the session.
    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.resolution.0, self.resolution.1)
    }
}
