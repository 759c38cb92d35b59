//! console-ocr - Reads in-game console text off the screen
//!
//! Captures a fixed screen region every few seconds, runs it through
//! Tesseract OCR and prints whatever text it finds.

mod capture;
mod config;
mod poller;
mod reader;
mod vision;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::capture::{list_monitors, ScreenCapture};
use crate::config::AppConfig;
use crate::poller::ConsolePoller;
use crate::reader::TextReader;
use crate::vision::TesseractOcr;

/// console-ocr - Print the text shown in a game console region
#[derive(Parser, Debug)]
#[command(name = "console-ocr")]
#[command(about = "Polls a screen region and prints the text recognized in it")]
struct Args {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between console reads, overriding the configuration
    #[arg(short, long)]
    interval: Option<f64>,

    /// Read the console region once and exit
    #[arg(long)]
    once: bool,

    /// Read the name region once and exit
    #[arg(long)]
    read_name: bool,

    /// List available monitors and exit
    #[arg(long)]
    list_monitors: bool,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only recognized text
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    if args.list_monitors {
        print_monitors()?;
        return Ok(());
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };

    if args.write_default_config {
        config::save_config(&AppConfig::default(), &config_path)?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let mut config = config::load_or_default(&config_path, args.config.is_some())?;
    if let Some(secs) = args.interval {
        config.polling.interval_secs = secs;
        config.validate()?;
    }

    let recognizer = TesseractOcr::new(&config.engine.engine_path);
    info!("Using OCR engine {:?}", recognizer.engine_path());
    let reader = TextReader::from_config(ScreenCapture::new(), recognizer, &config);

    if args.read_name {
        let name = reader.read_name()?;
        if !name.is_empty() {
            println!("{}", name);
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .context("Failed to install Ctrl+C handler")?;

    info!(
        "Reading console region {} every {:?} (Ctrl+C to stop)",
        config.regions.console,
        config.polling.interval()
    );

    let poller = ConsolePoller::new(reader, config.polling.interval())
        .with_max_iterations(args.once.then_some(1));
    let summary = poller.run(&shutdown_rx, &mut std::io::stdout().lock())?;

    info!(
        "Stopped after {} reads ({} with text)",
        summary.iterations, summary.lines_printed
    );

    Ok(())
}

/// Print connected displays so regions can be calibrated
fn print_monitors() -> Result<()> {
    let monitors = list_monitors()?;
    println!("Available monitors:");
    if monitors.is_empty() {
        println!("  No monitors detected");
    }
    for monitor in &monitors {
        println!(
            "  [{}] {} - {}{}",
            monitor.index,
            monitor.name.as_deref().unwrap_or("Unknown"),
            monitor.bounds,
            if monitor.is_primary { " (primary)" } else { "" }
        );
    }
    Ok(())
}
