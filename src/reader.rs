//! Capture-and-recognize pipeline for the configured screen regions

use anyhow::{Context, Result};
use std::time::Instant;
use tracing::debug;

use crate::capture::{RegionCapturer, ScreenRegion};
use crate::config::AppConfig;
use crate::vision::{to_grayscale, TextRecognizer};

/// A region to read and the recognition model to read it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTarget {
    pub region: ScreenRegion,
    /// `None` leaves the choice to the engine
    pub language: Option<String>,
}

/// Reads text from the console and name regions
pub struct TextReader<C, R> {
    capturer: C,
    recognizer: R,
    console: ReadTarget,
    name: ReadTarget,
}

impl<C: RegionCapturer, R: TextRecognizer> TextReader<C, R> {
    pub fn new(capturer: C, recognizer: R, console: ReadTarget, name: ReadTarget) -> Self {
        Self {
            capturer,
            recognizer,
            console,
            name,
        }
    }

    /// Build a reader for the regions and languages in `config`
    pub fn from_config(capturer: C, recognizer: R, config: &AppConfig) -> Self {
        let console = ReadTarget {
            region: config.regions.console,
            language: config.engine.console_language.clone(),
        };
        let name = ReadTarget {
            region: config.regions.name,
            language: config.engine.name_language.clone(),
        };
        Self::new(capturer, recognizer, console, name)
    }

    /// Read the game console line
    pub fn read_console(&self) -> Result<String> {
        self.read(&self.console)
    }

    /// Read the character name plate
    pub fn read_name(&self) -> Result<String> {
        self.read(&self.name)
    }

    /// Capture `target.region`, convert it to grayscale and recognize its text
    pub fn read(&self, target: &ReadTarget) -> Result<String> {
        let frame = self
            .capturer
            .capture(&target.region)
            .with_context(|| format!("Failed to capture region {}", target.region))?;

        let gray = to_grayscale(frame.image());
        let text = self
            .recognizer
            .recognize(&gray, target.language.as_deref())
            .with_context(|| format!("Failed to recognize text in region {}", target.region))?;

        debug!(
            "Read {:?} from {} ({:?} buffer, {:?} after capture)",
            text,
            frame.region(),
            frame.shape(),
            Instant::now().duration_since(frame.timestamp())
        );

        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::capture::CapturedFrame;
    use anyhow::bail;
    use image::{GrayImage, Rgba, RgbaImage};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Capturer returning a solid frame of the requested size
    #[derive(Default)]
    pub(crate) struct FakeCapturer {
        pub regions: RefCell<Vec<ScreenRegion>>,
        pub fail: bool,
    }

    impl RegionCapturer for FakeCapturer {
        fn capture(&self, region: &ScreenRegion) -> Result<CapturedFrame> {
            if self.fail {
                bail!("no display available");
            }
            self.regions.borrow_mut().push(*region);
            let image = RgbaImage::from_pixel(region.width, region.height, Rgba([30, 60, 90, 255]));
            Ok(CapturedFrame::new(image, *region))
        }
    }

    /// Recognizer replaying scripted results, then empty strings
    #[derive(Default)]
    pub(crate) struct FakeRecognizer {
        pub replies: RefCell<VecDeque<String>>,
        pub calls: RefCell<Vec<((u32, u32), Option<String>)>>,
    }

    impl FakeRecognizer {
        pub fn with_replies(replies: &[&str]) -> Self {
            Self {
                replies: RefCell::new(replies.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }
        }
    }

    impl TextRecognizer for FakeRecognizer {
        fn recognize(&self, image: &GrayImage, language: Option<&str>) -> Result<String> {
            self.calls
                .borrow_mut()
                .push((image.dimensions(), language.map(str::to_string)));
            Ok(self.replies.borrow_mut().pop_front().unwrap_or_default())
        }
    }

    #[test]
    fn test_read_console_uses_console_region_and_default_language() {
        let capturer = FakeCapturer::default();
        let recognizer = FakeRecognizer::with_replies(&["HP: 100"]);
        let reader = TextReader::from_config(&capturer, &recognizer, &AppConfig::default());

        assert_eq!(reader.read_console().unwrap(), "HP: 100");

        assert_eq!(*capturer.regions.borrow(), vec![ScreenRegion::new(2, 125, 500, 20)]);
        assert_eq!(*recognizer.calls.borrow(), vec![((500, 20), None)]);
    }

    #[test]
    fn test_read_name_requests_english() {
        let capturer = FakeCapturer::default();
        let recognizer = FakeRecognizer::default();
        let reader = TextReader::from_config(&capturer, &recognizer, &AppConfig::default());

        assert_eq!(reader.read_name().unwrap(), "");

        assert_eq!(*capturer.regions.borrow(), vec![ScreenRegion::new(500, 300, 200, 30)]);
        assert_eq!(
            *recognizer.calls.borrow(),
            vec![((200, 30), Some("eng".to_string()))]
        );
    }

    #[test]
    fn test_capture_failure_propagates() {
        let capturer = FakeCapturer {
            fail: true,
            ..Default::default()
        };
        let recognizer = FakeRecognizer::default();
        let reader = TextReader::from_config(&capturer, &recognizer, &AppConfig::default());

        let err = reader.read_console().unwrap_err();

        assert!(format!("{:#}", err).contains("no display available"));
        assert!(recognizer.calls.borrow().is_empty());
    }
}
