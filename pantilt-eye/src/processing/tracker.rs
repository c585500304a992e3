//! Pixel error between the target and the optical centre

use super::segmentation::DetectionResult;
use crate::frame::FrameSize;
use serde::Serialize;

/// Signed pixel offset of the target from the frame centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelError {
    pub x: f64,
    pub y: f64,
}

/// Latest detection status, kept for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetStatus {
    pub found: bool,
    /// Last location the target was seen at; survives misses
    pub last_location: Option<(u32, u32)>,
}

/// Converts centroids into pixel error and remembers the target status
#[derive(Debug, Clone)]
pub struct ErrorEstimator {
    frame_size: FrameSize,
    status: TargetStatus,
}

impl ErrorEstimator {
    pub fn new(frame_size: FrameSize) -> Self {
        Self {
            frame_size,
            status: TargetStatus::default(),
        }
    }

    /// Pure geometric offset: `(cx - w/2, cy - h/2)`.
    pub fn error(centroid: (u32, u32), frame_size: FrameSize) -> PixelError {
        let (center_x, center_y) = frame_size.center();
        PixelError {
            x: centroid.0 as f64 - center_x,
            y: centroid.1 as f64 - center_y,
        }
    }

    /// Record a detection and return the error when the target was found.
    pub fn observe(&mut self, detection: &DetectionResult) -> Option<PixelError> {
        match detection.centroid() {
            Some(centroid) => {
                self.status.found = true;
                self.status.last_location = Some(centroid);
                Some(Self::error(centroid, self.frame_size))
            }
            None => {
                self.status.found = false;
                None
            }
        }
    }

    /// Mark the target as not currently seen, keeping its last location.
    pub fn lose(&mut self) {
        self.status.found = false;
    }

    pub fn status(&self) -> TargetStatus {
        self.status
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }
}
