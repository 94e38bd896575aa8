use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

/// Download a file in concurrent byte-range chunks
#[derive(Debug, Parser)]
#[command(name = "chunkdl", version, about)]
pub(crate) struct App {
    /// File download url
    #[arg(short = 'u', long = "url")]
    pub(crate) url: String,
    /// Concurrent downloader count, clamped to 1..=16
    #[arg(
        short = 'c',
        long = "concurrency",
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub(crate) concurrency: i64,
    /// Location to save the file, defaults to ./Downloads
    #[arg(short = 'l', long = "location")]
    pub(crate) location: Option<PathBuf>,
    /// File name to save as, defaults to the last segment of the url
    #[arg(short = 'n', long = "name")]
    pub(crate) name: Option<String>,
    /// Do not draw progress rows
    #[arg(long = "no-progress")]
    pub(crate) no_progress: bool,
    #[command(flatten)]
    pub(crate) verbose: Verbosity<WarnLevel>,
}

impl App {
    pub(crate) fn new() -> Self {
        Self::parse()
    }
    pub(crate) fn init_logging(&self) {
        pretty_env_logger::formatted_builder()
            .filter_level(self.verbose.log_level_filter())
            .init()
    }
}
