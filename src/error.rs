use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::TransferRequestBuilderError;

/// Error definition for possible errors in this crate
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the request carries no URL at all
    #[error("Please provide a valid url")]
    EmptyUrl,
    /// Returned when the url couldn't be parsed
    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),
    /// Returned when there's no filename in the url and none was given
    #[error("No filename in url {0}")]
    NoFilename(String),
    /// A required request field was missing
    #[error("Invalid transfer request: {0}")]
    Request(#[from] TransferRequestBuilderError),
    /// The HEAD request failed to complete
    #[error("Metadata probe failed: {0}")]
    Probe(#[source] reqwest::Error),
    /// The HEAD request was answered with a non-success status
    #[error("Invalid file url, server answered {0}")]
    ProbeStatus(StatusCode),
    /// Network or stream failure while fetching a chunk
    #[error("Chunk {index} failed: {source}")]
    Fetch {
        index: usize,
        #[source]
        source: reqwest::Error,
    },
    /// The GET for a chunk was answered with a non-success status
    #[error("Chunk {index} failed, server answered {status}")]
    FetchStatus { index: usize, status: StatusCode },
    /// Writing a chunk to its part file failed
    #[error("Chunk {index} failed writing {}: {source}", path.display())]
    PartFile {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The server sent a different amount of bytes than the requested range
    #[error("Chunk {index} expected {expected} bytes, received {received}")]
    ChunkLength {
        index: usize,
        expected: u64,
        received: u64,
    },
    /// A worker task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// Copying a part file into the destination failed
    #[error("Failed to assemble {}: {source}", path.display())]
    Assembly {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Represents problems with Tokio based IO
    #[error("Tokio IO error: {0}")]
    Io(#[from] io::Error),
}

/// Alias for Result<T, chunkdl::Error>
pub type Result<T> = std::result::Result<T, Error>;
