//! Tesseract OCR backend
//!
//! Runs the Tesseract command-line engine at a configured path. The image is
//! PNG-encoded and piped to the engine's stdin; the transcription is read back
//! from its stdout.

use image::{GrayImage, ImageFormat};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use super::TextRecognizer;

/// Errors raised while running the OCR engine
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine not found at {path:?}; install Tesseract or set engine.engine_path")]
    EngineNotFound { path: PathBuf },

    #[error("failed to start OCR engine {path:?}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode image for OCR")]
    Encode(#[from] image::ImageError),

    #[error("failed to exchange data with OCR engine")]
    Io(#[from] io::Error),

    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: ExitStatus, stderr: String },
}

/// Tesseract engine invoked as an external process
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    engine_path: PathBuf,
}

impl TesseractOcr {
    /// Use the engine executable at `engine_path` (a bare name is looked up on `PATH`)
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
        }
    }

    pub fn engine_path(&self) -> &Path {
        &self.engine_path
    }

    /// Recognize text in a grayscale image, returning it trimmed
    pub fn recognize_text(
        &self,
        image: &GrayImage,
        language: Option<&str>,
    ) -> Result<String, OcrError> {
        let start = Instant::now();
        let png = encode_png(image)?;

        let mut child = Command::new(&self.engine_path)
            .args(engine_args(language))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => OcrError::EngineNotFound {
                    path: self.engine_path.clone(),
                },
                _ => OcrError::Spawn {
                    path: self.engine_path.clone(),
                    source,
                },
            })?;

        // Dropping stdin closes the pipe so the engine sees end of input.
        // An engine that rejects its arguments exits without reading, so the
        // write error only matters once the exit status is known.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();

        debug!(
            "Tesseract ({}) read {} chars from {}x{} image in {:?}",
            language.unwrap_or("default"),
            text.len(),
            image.width(),
            image.height(),
            start.elapsed()
        );

        Ok(text)
    }
}

impl TextRecognizer for TesseractOcr {
    fn recognize(&self, image: &GrayImage, language: Option<&str>) -> anyhow::Result<String> {
        Ok(self.recognize_text(image, language)?)
    }
}

/// Command line for reading an image from stdin and writing text to stdout
fn engine_args(language: Option<&str>) -> Vec<&str> {
    let mut args = vec!["stdin", "stdout"];
    if let Some(lang) = language {
        args.extend(["-l", lang]);
    }
    args
}

fn encode_png(image: &GrayImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
