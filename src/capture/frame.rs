//! Frame data structures for captured screen content

use image::RgbaImage;
use std::time::Instant;

use super::ScreenRegion;

/// A captured screen region
#[derive(Debug)]
pub struct CapturedFrame {
    /// RGBA pixel data
    image: RgbaImage,
    /// Region that was requested
    region: ScreenRegion,
    /// Timestamp when frame was captured
    timestamp: Instant,
}

impl CapturedFrame {
    /// Create a new captured frame
    pub fn new(image: RgbaImage, region: ScreenRegion) -> Self {
        Self {
            image,
            region,
            timestamp: Instant::now(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn region(&self) -> &ScreenRegion {
        &self.region
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Buffer shape as (rows, columns, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        let (width, height) = self.dimensions();
        (height as usize, width as usize, 4)
    }
}
