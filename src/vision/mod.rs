//! Vision/OCR Layer
//!
//! Turns captured frames into text. Frames are reduced to grayscale and
//! handed to an external Tesseract engine.

pub mod preprocess;
pub mod tesseract;

use anyhow::Result;
use image::GrayImage;

pub use preprocess::to_grayscale;
pub use tesseract::TesseractOcr;

/// English recognition model, as named by Tesseract
pub const ENGLISH: &str = "eng";

/// Extracts text from a grayscale image
pub trait TextRecognizer {
    /// Recognize the text in `image`.
    ///
    /// `language` selects a recognition model; `None` uses the engine default.
    /// The result is trimmed of surrounding whitespace and may be empty.
    fn recognize(&self, image: &GrayImage, language: Option<&str>) -> Result<String>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, image: &GrayImage, language: Option<&str>) -> Result<String> {
        (**self).recognize(image, language)
    }
}
