//! Fast chunked downloads
//!
//! Downloads a single file over HTTP(S) by splitting it into byte ranges, fetching
//! the ranges concurrently into part files and concatenating the parts in order.
//! Each chunk can draw its own progress row in the terminal.
//!
//! The crate exposes debug logs through the [`tracing`][tracing] crate
//!
//! ## Feature flags
//!
//! - `progress`: Enables per-chunk progress rows using `crossterm`, on by default
//! - `rustls`: Use rustls for HTTPS, on by default
//! - `openssl`: Use openssl for HTTPS
//!
//! ## Crate usage
//!
//! ```no_run
//! use chunkdl::{Downloader, TransferRequest};
//! #[tokio::main]
//! async fn main() -> Result<(), chunkdl::Error> {
//!     let request = TransferRequest::builder()
//!         .url("https://example.com/archive.zip")
//!         .concurrency(5)
//!         .directory("/tmp")
//!         .build()?;
//!     let path = Downloader::new(&request)?.download().await?;
//!     println!("saved to {}", path.display());
//!     Ok(())
//! }
//! ```

mod assemble;
mod config;
mod downloader;
mod error;
pub mod plan;
mod probe;
#[cfg(feature = "progress")]
pub mod progress;
mod worker;

pub use assemble::assemble;
pub use config::{
    Target, TransferRequest, TransferRequestBuilder, TransferRequestBuilderError, BUFFER_SIZE,
    DEFAULT_CONCURRENCY, DEFAULT_DIRECTORY, MAX_CONCURRENCY,
};
pub use downloader::{Downloader, Stage};
pub use error::{Error, Result};
pub use plan::{plan, ByteRange, Chunk, ChunkPlan};
pub use probe::{probe, TransferMetadata};
#[cfg(feature = "progress")]
pub use progress::{ProgressRenderer, Terminal};
pub use reqwest::{header, Client, Url};
