//! Image preprocessing for OCR
//!
//! Only a grayscale conversion is applied; rendered UI text on flat
//! backgrounds reads well enough without thresholding or sharpening.

use image::{GenericImageView, GrayImage, Luma, Pixel};

/// Convert an image to single-channel 8-bit grayscale.
///
/// Uses the standard luminance weights in integer arithmetic, so a pixel with
/// equal channels keeps its value and converting a grayscale image is a no-op.
/// Alpha is ignored.
pub fn to_grayscale<I>(image: &I) -> GrayImage
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = image.get_pixel(x, y).to_rgb().0;
        Luma([luma(r, g, b)])
    })
}

/// Weighted luminance of an RGB triple, rounded to nearest
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}
