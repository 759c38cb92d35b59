//! Screen Capture Layer
//!
//! Grabs fixed rectangles of the desktop through `xcap`.
//! This is a read-only operation that copies pixels without any game interaction.

pub mod frame;

use anyhow::{anyhow, bail, Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};
use xcap::Monitor;

pub use frame::CapturedFrame;

/// A rectangle of the screen in desktop pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRegion {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ScreenRegion {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// A region with no pixels in it
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the point lies inside this region (right/bottom edges excluded)
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        let (px, py) = (px as i64, py as i64);
        let (x, y) = (self.x as i64, self.y as i64);
        px >= x && py >= y && px < x + self.width as i64 && py < y + self.height as i64
    }
}

impl fmt::Display for ScreenRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// Produces a frame holding the current contents of a screen region
pub trait RegionCapturer {
    fn capture(&self, region: &ScreenRegion) -> Result<CapturedFrame>;
}

impl<T: RegionCapturer + ?Sized> RegionCapturer for &T {
    fn capture(&self, region: &ScreenRegion) -> Result<CapturedFrame> {
        (**self).capture(region)
    }
}

/// Information about a connected display
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    /// Position in the enumeration order
    pub index: usize,
    /// Display name, when the platform reports one
    pub name: Option<String>,
    /// Desktop area covered by the display
    pub bounds: ScreenRegion,
    /// Whether this is the primary display
    pub is_primary: bool,
}

/// List the displays available for capture
pub fn list_monitors() -> Result<Vec<MonitorInfo>> {
    let monitors = Monitor::all().context("Failed to enumerate monitors")?;

    monitors
        .iter()
        .enumerate()
        .map(|(index, monitor)| -> Result<MonitorInfo> {
            Ok(MonitorInfo {
                index,
                name: monitor.name().ok(),
                bounds: monitor_bounds(monitor)?,
                is_primary: monitor.is_primary().unwrap_or(false),
            })
        })
        .collect()
}

/// Region capturer backed by `xcap` monitor screenshots
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Self {
        Self
    }
}

impl RegionCapturer for ScreenCapture {
    fn capture(&self, region: &ScreenRegion) -> Result<CapturedFrame> {
        if region.is_empty() {
            bail!("Cannot capture empty region {}", region);
        }

        let start = Instant::now();

        let mut target = None;
        for monitor in Monitor::all().context("Failed to enumerate monitors")? {
            let bounds = monitor_bounds(&monitor)?;
            if bounds.contains_point(region.x, region.y) {
                target = Some((monitor, bounds));
                break;
            }
        }
        let (monitor, bounds) = target
            .ok_or_else(|| anyhow!("Region {} does not start on any connected display", region))?;

        let screenshot = monitor.capture_image().context(
            "Failed to capture display. \
             On macOS, grant Screen Recording permission to the terminal",
        )?;

        // xcap may be built against another `image` release, so go through raw bytes
        let (width, height) = (screenshot.width(), screenshot.height());
        let full = RgbaImage::from_raw(width, height, screenshot.into_raw())
            .ok_or_else(|| anyhow!("Display returned a malformed {}x{} buffer", width, height))?;

        let image = crop_to_region(&full, &bounds, region);
        if image.width() != region.width || image.height() != region.height {
            warn!(
                "Region {} extends past its display ({}); captured {}x{}",
                region,
                bounds,
                image.width(),
                image.height()
            );
        }

        debug!("Captured {} in {:?}", region, start.elapsed());

        Ok(CapturedFrame::new(image, *region))
    }
}

/// Crop `region` (desktop coordinates) out of a screenshot of the display at `display`.
///
/// Display geometry may be reported in logical units while the screenshot is in
/// physical pixels; the crop is scaled by their ratio and resized back to the
/// region's size. Parts of the region outside the screenshot are clipped.
fn crop_to_region(
    screenshot: &RgbaImage,
    display: &ScreenRegion,
    region: &ScreenRegion,
) -> RgbaImage {
    let scale_x = screenshot.width() as f64 / display.width.max(1) as f64;
    let scale_y = screenshot.height() as f64 / display.height.max(1) as f64;

    let local_x = (region.x as i64 - display.x as i64).max(0) as f64;
    let local_y = (region.y as i64 - display.y as i64).max(0) as f64;

    let cropped = imageops::crop_imm(
        screenshot,
        (local_x * scale_x).round() as u32,
        (local_y * scale_y).round() as u32,
        (region.width as f64 * scale_x).round() as u32,
        (region.height as f64 * scale_y).round() as u32,
    )
    .to_image();

    let width = ((cropped.width() as f64 / scale_x).round() as u32).max(1);
    let height = ((cropped.height() as f64 / scale_y).round() as u32).max(1);
    if cropped.width() == 0 || cropped.height() == 0 || (width, height) == cropped.dimensions() {
        return cropped;
    }
    imageops::resize(&cropped, width, height, FilterType::Triangle)
}

fn monitor_bounds(monitor: &Monitor) -> Result<ScreenRegion> {
    Ok(ScreenRegion {
        x: monitor.x().context("Failed to read monitor position")?,
        y: monitor.y().context("Failed to read monitor position")?,
        width: monitor.width().context("Failed to read monitor size")?,
        height: monitor.height().context("Failed to read monitor size")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn test_region_is_empty() {
        assert!(ScreenRegion::new(0, 0, 0, 10).is_empty());
        assert!(ScreenRegion::new(0, 0, 10, 0).is_empty());
        assert!(!ScreenRegion::new(2, 125, 500, 20).is_empty());
    }

    #[test]
    fn test_region_contains_point() {
        let display = ScreenRegion::new(-1920, 0, 1920, 1080);
        assert!(display.contains_point(-1920, 0));
        assert!(display.contains_point(-1, 1079));
        assert!(!display.contains_point(0, 0));
        assert!(!display.contains_point(-100, 1080));
    }

    #[test]
    fn test_region_display() {
        let region = ScreenRegion::new(500, 300, 200, 30);
        assert_eq!(region.to_string(), "200x30 at (500, 300)");
    }

    #[test]
    fn test_crop_to_region_on_primary_display() {
        let screenshot = gradient(100, 80);
        let display = ScreenRegion::new(0, 0, 100, 80);
        let region = ScreenRegion::new(10, 20, 30, 5);

        let cropped = crop_to_region(&screenshot, &display, &region);

        assert_eq!(cropped.dimensions(), (30, 5));
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([10, 20, 0, 255]));
        assert_eq!(cropped.get_pixel(29, 4), &Rgba([39, 24, 0, 255]));
    }

    #[test]
    fn test_crop_to_region_on_offset_display() {
        let screenshot = gradient(100, 80);
        let display = ScreenRegion::new(1920, 0, 100, 80);
        let region = ScreenRegion::new(1925, 3, 4, 4);

        let cropped = crop_to_region(&screenshot, &display, &region);

        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([5, 3, 0, 255]));
    }

    #[test]
    fn test_crop_clips_overhanging_region() {
        let screenshot = gradient(100, 80);
        let display = ScreenRegion::new(0, 0, 100, 80);
        let region = ScreenRegion::new(90, 70, 50, 50);

        let cropped = crop_to_region(&screenshot, &display, &region);

        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn test_crop_on_scaled_display() {
        // 2x display: 100x80 logical, 200x160 physical, white band on physical rows 30..70
        let screenshot = RgbaImage::from_fn(200, 160, |_, y| {
            if (30..70).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let display = ScreenRegion::new(0, 0, 100, 80);
        let region = ScreenRegion::new(10, 20, 30, 5);

        let cropped = crop_to_region(&screenshot, &display, &region);

        assert_eq!(cropped.dimensions(), (30, 5));
        assert!(cropped.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_crop_clips_overhanging_region_on_scaled_display() {
        let screenshot = gradient(200, 160);
        let display = ScreenRegion::new(0, 0, 100, 80);
        let region = ScreenRegion::new(90, 70, 50, 50);

        let cropped = crop_to_region(&screenshot, &display, &region);

        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn test_capture_rejects_empty_region() {
        let result = ScreenCapture::new().capture(&ScreenRegion::new(0, 0, 0, 20));
        assert!(result.is_err());
    }

    #[test]
    #[ignore = "requires a graphical display and screen recording permission"]
    fn test_capture_console_region_shape() {
        let region = ScreenRegion::new(2, 125, 500, 20);
        let frame = ScreenCapture::new().capture(&region).unwrap();
        assert_eq!(frame.shape(), (20, 500, 4));
    }
}
