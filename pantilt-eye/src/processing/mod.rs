//! Vision processing pipelines

pub mod mask;
pub mod morphology;
pub mod regions;
pub mod segmentation;
pub mod tracker;

pub use mask::Mask;
pub use regions::{extract_regions, Region, RegionMap};
pub use segmentation::{DetectionResult, FrameSegmenter};
pub use tracker::{ErrorEstimator, PixelError, TargetStatus};
