//! Binary morphology for mask clean-up

use super::mask::{Mask, BACKGROUND, FOREGROUND};
use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask as Kernel};

/// Structuring element anchored at its centre
pub struct StructuringElement {
    kernel: Kernel,
}

impl StructuringElement {
    /// 5x5 ellipse, the shape used for speckle removal:
    ///
    /// ```text
    /// . . # . .
    /// # # # # #
    /// # # # # #
    /// # # # # #
    /// . . # . .
    /// ```
    pub fn ellipse5() -> Self {
        let shape = GrayImage::from_fn(5, 5, |x, y| {
            let corner = (y == 0 || y == 4) && x != 2;
            Luma([if corner { BACKGROUND } else { FOREGROUND }])
        });
        Self {
            kernel: Kernel::from_image(&shape, 2, 2),
        }
    }

    /// Full square of side `2 * radius + 1`.
    pub fn square(radius: u8) -> Self {
        Self {
            kernel: Kernel::square(radius),
        }
    }
}

/// Pixels outside the image never switch a pixel on.
pub fn dilate(mask: &Mask, element: &StructuringElement) -> Mask {
    Mask::from_image(grayscale_dilate(mask.as_image(), &element.kernel))
}

/// Pixels outside the image never switch a pixel off.
pub fn erode(mask: &Mask, element: &StructuringElement) -> Mask {
    Mask::from_image(grayscale_erode(mask.as_image(), &element.kernel))
}

/// Dilate then erode: fills small holes and gaps.
pub fn close(mask: &Mask, element: &StructuringElement) -> Mask {
    erode(&dilate(mask, element), element)
}

/// Erode then dilate: removes specks smaller than the element.
pub fn open(mask: &Mask, element: &StructuringElement) -> Mask {
    dilate(&erode(mask, element), element)
}

/// Closing followed by opening with the 5x5 ellipse.
pub fn denoise(mask: &Mask) -> Mask {
    let element = StructuringElement::ellipse5();
    open(&close(mask, &element), &element)
}
