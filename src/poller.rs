//! Console polling loop
//!
//! Reads the console region on a fixed cadence and prints whatever text it
//! finds. Runs until the shutdown channel fires (or an iteration limit is
//! reached); capture and recognition errors end the loop.

use anyhow::Result;
use crossbeam_channel::{select, Receiver, TryRecvError};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

use crate::capture::RegionCapturer;
use crate::reader::TextReader;
use crate::vision::TextRecognizer;

/// Totals for a finished polling run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Console reads performed
    pub iterations: u64,
    /// Reads that produced text
    pub lines_printed: u64,
}

/// Polls the console region and writes detected text
pub struct ConsolePoller<C, R> {
    reader: TextReader<C, R>,
    interval: Duration,
    max_iterations: Option<u64>,
}

impl<C: RegionCapturer, R: TextRecognizer> ConsolePoller<C, R> {
    pub fn new(reader: TextReader<C, R>, interval: Duration) -> Self {
        Self {
            reader,
            interval,
            max_iterations: None,
        }
    }

    /// Stop after `limit` reads; `None` polls until shutdown
    pub fn with_max_iterations(mut self, limit: Option<u64>) -> Self {
        self.max_iterations = limit;
        self
    }

    /// Run the loop, writing one `Text detected: ...` line per non-empty read.
    ///
    /// A message on `shutdown`, or all senders being dropped, stops the loop
    /// before the next read, including while waiting out the interval.
    pub fn run<W: Write>(&self, shutdown: &Receiver<()>, out: &mut W) -> Result<PollSummary> {
        let mut summary = PollSummary::default();

        loop {
            if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
                info!("Shutdown requested, stopping console polling");
                break;
            }

            let text = self.reader.read_console()?;
            summary.iterations += 1;

            if text.is_empty() {
                debug!("No text in console region");
            } else {
                writeln!(out, "Text detected: {}", text)?;
                out.flush()?;
                summary.lines_printed += 1;
            }

            if self
                .max_iterations
                .is_some_and(|limit| summary.iterations >= limit)
            {
                break;
            }

            // A disconnected channel also wakes the wait early
            let interrupted = select! {
                recv(shutdown) -> _ => true,
                default(self.interval) => false,
            };
            if interrupted {
                info!("Shutdown requested, stopping console polling");
                break;
            }
        }

        Ok(summary)
    }
}
