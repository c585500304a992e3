//! Binary foreground masks

use crate::color::{ColorRange, Hsv};
use crate::frame::Frame;
use image::{GrayImage, Luma, Rgb};
use imageproc::map::map_colors;

/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;
/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;

/// Binary mask stored as a grey image of `FOREGROUND`/`BACKGROUND` pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    /// All-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        Self {
            image: GrayImage::from_fn(width, height, |x, y| pixel(f(x, y))),
        }
    }

    /// Any non-zero pixel is foreground.
    pub fn from_image(image: GrayImage) -> Self {
        Self {
            image: map_colors(&image, |p: Luma<u8>| pixel(p[0] != BACKGROUND)),
        }
    }

    /// Threshold a frame against a colour range.
    pub fn threshold(frame: &Frame, range: &ColorRange) -> Self {
        Self {
            image: map_colors(frame, |p: Rgb<u8>| {
                pixel(range.contains(Hsv::from_rgb(p[0], p[1], p[2])))
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Out-of-bounds reads are background.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.image
            .get_pixel_checked(x, y)
            .map_or(false, |p| p[0] != BACKGROUND)
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if let Some(p) = self.image.get_pixel_mut_checked(x, y) {
            *p = pixel(value);
        }
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.image.pixels().filter(|p| p[0] != BACKGROUND).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.image.pixels().any(|p| p[0] != BACKGROUND)
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

#[inline]
fn pixel(foreground: bool) -> Luma<u8> {
    Luma([if foreground { FOREGROUND } else { BACKGROUND }])
}
