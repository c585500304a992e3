//! Colour segmentation pipeline

use super::mask::Mask;
use super::morphology;
use super::regions::{extract_regions, RegionMap};
use crate::color::ColorRange;
use crate::config::VisionConfig;
use crate::frame::Frame;
use crate::utils::{draw_disc, draw_points, draw_ring, MARKER_COLOR};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CENTROID_DOT_RADIUS: u32 = 5;
const CENTROID_RING_RADIUS: u32 = 50;

/// Outcome of locating the target in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionResult {
    Found { x: u32, y: u32, area: u64 },
    NotFound,
}

impl DetectionResult {
    pub fn is_found(&self) -> bool {
        matches!(self, DetectionResult::Found { .. })
    }

    pub fn centroid(&self) -> Option<(u32, u32)> {
        match *self {
            DetectionResult::Found { x, y, .. } => Some((x, y)),
            DetectionResult::NotFound => None,
        }
    }

    pub fn area(&self) -> Option<u64> {
        match *self {
            DetectionResult::Found { area, .. } => Some(area),
            DetectionResult::NotFound => None,
        }
    }
}

/// Locates the largest region of the target colour
#[derive(Debug, Clone)]
pub struct FrameSegmenter {
    min_area: u64,
    draw_overlay: bool,
}

impl FrameSegmenter {
    /// Create a segmenter; regions must be strictly larger than `min_area`.
    pub fn new(min_area: u32) -> Self {
        Self {
            min_area: min_area as u64,
            draw_overlay: false,
        }
    }

    pub fn from_config(config: &VisionConfig) -> Self {
        Self::new(config.min_area).with_overlay(config.draw_overlay)
    }

    pub fn with_overlay(mut self, draw_overlay: bool) -> Self {
        self.draw_overlay = draw_overlay;
        self
    }

    pub fn min_area(&self) -> u64 {
        self.min_area
    }

    /// Segment `frame` for `range`, annotating it in place when overlays are on.
    pub fn segment(&self, frame: &mut Frame, range: &ColorRange) -> DetectionResult {
        let mask = morphology::denoise(&Mask::threshold(frame, range));
        let regions = extract_regions(&mask);
        let result = self.select(&regions);

        if self.draw_overlay {
            if let (DetectionResult::Found { x, y, .. }, Some(region)) = (result, regions.largest()) {
                draw_points(frame, &regions.outline(region.label), MARKER_COLOR);
                draw_disc(frame, (x, y), CENTROID_DOT_RADIUS, MARKER_COLOR);
                draw_ring(frame, (x, y), CENTROID_RING_RADIUS, MARKER_COLOR);
            }
        }

        result
    }

    /// Locate the target in an already cleaned mask.
    pub fn locate(&self, mask: &Mask) -> DetectionResult {
        self.select(&extract_regions(mask))
    }

    fn select(&self, regions: &RegionMap) -> DetectionResult {
        let Some(largest) = regions.largest() else {
            debug!("No candidate regions");
            return DetectionResult::NotFound;
        };

        if largest.area <= self.min_area {
            debug!(
                "Largest region area {} does not exceed minimum {}",
                largest.area, self.min_area
            );
            return DetectionResult::NotFound;
        }

        let (x, y) = largest.centroid();
        debug!("Target at ({}, {}) area {}", x, y, largest.area);
        DetectionResult::Found {
            x,
            y,
            area: largest.area,
        }
    }
}
