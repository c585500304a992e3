//! Externally-bounded region extraction
//!
//! A region is an 8-connected foreground component together with every
//! background pixel it encloses. Background counts as enclosed when it is not
//! 4-connected to the image border, so a ring is measured as a disc and a
//! blob sitting inside a hole belongs to the outer region.

use super::mask::{Mask, BACKGROUND, FOREGROUND};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::{BTreeMap, HashSet};

/// Label value for pixels outside every region.
pub const NO_REGION: u32 = 0;

type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Pixel statistics of one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Label in the owning [`RegionMap`]
    pub label: u32,
    /// Pixel count including filled holes
    pub area: u64,
    pub sum_x: u64,
    pub sum_y: u64,
    /// Inclusive bounding box (min_x, min_y, max_x, max_y)
    pub bounds: (u32, u32, u32, u32),
}

impl Region {
    fn seed(label: u32, x: u32, y: u32) -> Self {
        Self {
            label,
            area: 0,
            sum_x: 0,
            sum_y: 0,
            bounds: (x, y, x, y),
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.sum_x += u64::from(x);
        self.sum_y += u64::from(y);
        let (min_x, min_y, max_x, max_y) = self.bounds;
        self.bounds = (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y));
    }

    /// First moments over the zeroth, rounded to the nearest pixel.
    pub fn centroid(&self) -> (u32, u32) {
        let area = self.area.max(1) as f64;
        (
            (self.sum_x as f64 / area).round() as u32,
            (self.sum_y as f64 / area).round() as u32,
        )
    }
}

/// Per-pixel region labels plus region statistics
#[derive(Debug, Clone)]
pub struct RegionMap {
    labels: LabelImage,
    filled: GrayImage,
    regions: Vec<Region>,
}

impl RegionMap {
    fn empty(width: u32, height: u32) -> Self {
        Self {
            labels: LabelImage::new(width, height),
            filled: GrayImage::new(width, height),
            regions: Vec::new(),
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region with the largest area; ties go to the first found in scan order.
    pub fn largest(&self) -> Option<&Region> {
        self.regions.iter().fold(None, |best: Option<&Region>, r| match best {
            Some(b) if b.area >= r.area => Some(b),
            _ => Some(r),
        })
    }

    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels
            .get_pixel_checked(x, y)
            .map_or(NO_REGION, |p| p[0])
    }

    /// Outer border pixels of `label`, in tracing order.
    pub fn outline(&self, label: u32) -> Vec<(u32, u32)> {
        if label == NO_REGION {
            return Vec::new();
        }
        find_contours::<u32>(&self.filled)
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer))
            .find(|c| {
                c.points
                    .first()
                    .map_or(false, |p| self.label_at(p.x, p.y) == label)
            })
            .map(|c| c.points.iter().map(|p| (p.x, p.y)).collect())
            .unwrap_or_default()
    }
}

/// Foreground plus every background pixel that cannot reach the border
/// through 4-connected background.
fn fill_holes(mask: &Mask) -> GrayImage {
    let (w, h) = (mask.width(), mask.height());
    // Label the background: foreground pixels take the "background" role here.
    let background = connected_components(mask.as_image(), Connectivity::Four, Luma([FOREGROUND]));

    let mut outside = HashSet::new();
    for x in 0..w {
        outside.insert(background.get_pixel(x, 0)[0]);
        outside.insert(background.get_pixel(x, h - 1)[0]);
    }
    for y in 0..h {
        outside.insert(background.get_pixel(0, y)[0]);
        outside.insert(background.get_pixel(w - 1, y)[0]);
    }

    GrayImage::from_fn(w, h, |x, y| {
        let hole = background.get_pixel(x, y)[0];
        let filled = hole == NO_REGION || !outside.contains(&hole);
        Luma([if filled { FOREGROUND } else { BACKGROUND }])
    })
}

/// Label the externally-bounded regions of a mask.
pub fn extract_regions(mask: &Mask) -> RegionMap {
    if mask.width() == 0 || mask.height() == 0 || mask.is_empty() {
        return RegionMap::empty(mask.width(), mask.height());
    }

    let filled = fill_holes(mask);
    let labels = connected_components(&filled, Connectivity::Eight, Luma([BACKGROUND]));

    let mut stats: BTreeMap<u32, Region> = BTreeMap::new();
    for (x, y, p) in labels.enumerate_pixels() {
        let label = p[0];
        if label != NO_REGION {
            stats
                .entry(label)
                .or_insert_with(|| Region::seed(label, x, y))
                .add(x, y);
        }
    }

    RegionMap {
        labels,
        filled,
        regions: stats.into_values().collect(),
    }
}
