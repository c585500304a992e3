//! HSV colour values and target colour ranges
//!
//! Hue uses the 8-bit camera convention: half-degrees in `0..=179`.
//! Saturation and value span the full `0..=255`.

use crate::error::VisionError;
use palette::{IntoColor, Srgb};
use serde::{Deserialize, Serialize};

/// Largest representable hue (half-degrees).
pub const HUE_MAX: u8 = 179;

/// Top-of-circle hue some configs use as an upper bound; read as [`HUE_MAX`].
pub const HUE_WRAP: u8 = 180;

/// 8-bit hue/saturation/value triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u8, u8, u8)", into = "(u8, u8, u8)")]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Convert an RGB pixel.
    ///
    /// Hue is halved and rounded; 359.x degrees rounds to 180 and wraps to 0.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let hsv: palette::Hsv = Srgb::new(r, g, b).into_format::<f32>().into_color();
        let half = (hsv.hue.into_positive_degrees() / 2.0).round() as u16;
        Self {
            h: if half > HUE_MAX as u16 { 0 } else { half as u8 },
            s: to_byte(hsv.saturation),
            v: to_byte(hsv.value),
        }
    }
}

fn to_byte(unit: f32) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl From<(u8, u8, u8)> for Hsv {
    fn from((h, s, v): (u8, u8, u8)) -> Self {
        Self { h, s, v }
    }
}

impl From<Hsv> for (u8, u8, u8) {
    fn from(hsv: Hsv) -> Self {
        (hsv.h, hsv.s, hsv.v)
    }
}

/// Inclusive HSV box selecting the target colour.
///
/// Every channel must satisfy `low <= high`. Hue ranges that wrap past 0
/// (for example 170..10 for red) are not representable; a target whose hue
/// straddles the wrap has to be tracked with one side of it only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColorRange")]
pub struct ColorRange {
    low: Hsv,
    high: Hsv,
}

#[derive(Deserialize)]
struct RawColorRange {
    low: Hsv,
    high: Hsv,
}

impl TryFrom<RawColorRange> for ColorRange {
    type Error = VisionError;

    fn try_from(raw: RawColorRange) -> Result<Self, Self::Error> {
        ColorRange::new(raw.low, raw.high)
    }
}

impl ColorRange {
    /// Build a validated range.
    ///
    /// A high hue of 180 is accepted and stored as 179.
    pub fn new(low: Hsv, mut high: Hsv) -> Result<Self, VisionError> {
        if high.h == HUE_WRAP {
            high.h = HUE_MAX;
        }
        if low.h > HUE_MAX || high.h > HUE_MAX {
            return Err(VisionError::InvalidColorRange(format!(
                "hue must be within 0..={}, got {}..{}",
                HUE_MAX, low.h, high.h
            )));
        }
        if low.h > high.h {
            return Err(VisionError::InvalidColorRange(format!(
                "low hue {} > high hue {} (hue wrap-around is not supported)",
                low.h, high.h
            )));
        }
        if low.s > high.s {
            return Err(VisionError::InvalidColorRange(format!(
                "low saturation {} > high saturation {}",
                low.s, high.s
            )));
        }
        if low.v > high.v {
            return Err(VisionError::InvalidColorRange(format!(
                "low value {} > high value {}",
                low.v, high.v
            )));
        }
        Ok(Self { low, high })
    }

    /// Saturated red, the default target.
    pub fn red() -> Self {
        Self {
            low: Hsv::new(0, 100, 100),
            high: Hsv::new(10, 255, 255),
        }
    }

    /// Broad skin-tone range for face/hand following.
    pub fn skin() -> Self {
        Self {
            low: Hsv::new(0, 20, 70),
            high: Hsv::new(20, 255, 255),
        }
    }

    pub fn low(&self) -> Hsv {
        self.low
    }

    pub fn high(&self) -> Hsv {
        self.high
    }

    /// Componentwise inclusive membership.
    #[inline]
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.low.h..=self.high.h).contains(&hsv.h)
            && (self.low.s..=self.high.s).contains(&hsv.s)
            && (self.low.v..=self.high.v).contains(&hsv.v)
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self::red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Hsv::from_rgb(255, 0, 0), Hsv::new(0, 255, 255));
        assert_eq!(Hsv::from_rgb(0, 255, 0), Hsv::new(60, 255, 255));
        assert_eq!(Hsv::from_rgb(0, 0, 255), Hsv::new(120, 255, 255));
    }

    #[test]
    fn test_hsv_greys_have_no_hue_or_saturation() {
        assert_eq!(Hsv::from_rgb(0, 0, 0), Hsv::new(0, 0, 0));
        assert_eq!(Hsv::from_rgb(128, 128, 128), Hsv::new(0, 0, 128));
        assert_eq!(Hsv::from_rgb(255, 255, 255), Hsv::new(0, 0, 255));
    }

    #[test]
    fn test_hsv_near_wrap_rounds_to_zero() {
        // 359.x degrees rounds up to 180 half-degrees, which wraps to 0
        let hsv = Hsv::from_rgb(255, 0, 1);
        assert_eq!(hsv.h, 0);
    }

    #[test]
    fn test_hsv_magenta_side_of_red() {
        let hsv = Hsv::from_rgb(255, 0, 60);
        assert!(hsv.h > 170);
        assert!(hsv.h <= HUE_MAX);
    }

    #[test]
    fn test_color_range_contains_is_inclusive() {
        let range = ColorRange::new(Hsv::new(10, 50, 50), Hsv::new(20, 200, 200)).unwrap();
        assert!(range.contains(Hsv::new(10, 50, 50)));
        assert!(range.contains(Hsv::new(20, 200, 200)));
        assert!(!range.contains(Hsv::new(21, 100, 100)));
        assert!(!range.contains(Hsv::new(15, 49, 100)));
        assert!(!range.contains(Hsv::new(15, 100, 201)));
    }

    #[test]
    fn test_color_range_rejects_wrapped_hue() {
        let result = ColorRange::new(Hsv::new(170, 100, 100), Hsv::new(10, 255, 255));
        assert!(matches!(result, Err(VisionError::InvalidColorRange(_))));
    }

    #[test]
    fn test_color_range_rejects_hue_out_of_range() {
        let result = ColorRange::new(Hsv::new(0, 0, 0), Hsv::new(200, 255, 255));
        assert!(result.is_err());
    }

    #[test]
    fn test_color_range_reads_high_hue_180_as_179() {
        let range = ColorRange::new(Hsv::new(170, 100, 100), Hsv::new(180, 255, 255)).unwrap();
        assert_eq!(range.high().h, HUE_MAX);
        assert!(range.contains(Hsv::new(179, 200, 200)));

        assert!(ColorRange::new(Hsv::new(180, 100, 100), Hsv::new(180, 255, 255)).is_err());
        assert!(ColorRange::new(Hsv::new(170, 100, 100), Hsv::new(181, 255, 255)).is_err());
    }

    #[test]
    fn test_color_range_rejects_inverted_saturation_and_value() {
        assert!(ColorRange::new(Hsv::new(0, 200, 0), Hsv::new(10, 100, 255)).is_err());
        assert!(ColorRange::new(Hsv::new(0, 0, 200), Hsv::new(10, 255, 100)).is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        for range in [ColorRange::red(), ColorRange::skin()] {
            assert!(ColorRange::new(range.low(), range.high()).is_ok());
        }
    }

    #[test]
    fn test_color_range_deserialize_validates() {
        let ok: ColorRange =
            serde_json::from_str(r#"{"low":[0,100,100],"high":[10,255,255]}"#).unwrap();
        assert_eq!(ok, ColorRange::red());

        let bad = serde_json::from_str::<ColorRange>(r#"{"low":[170,100,100],"high":[10,255,255]}"#);
        assert!(bad.is_err());

        let upper: ColorRange =
            serde_json::from_str(r#"{"low":[170,100,100],"high":[180,255,255]}"#).unwrap();
        assert_eq!(upper.high(), Hsv::new(179, 255, 255));
    }
}
