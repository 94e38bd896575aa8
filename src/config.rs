use crate::plan::clamp_concurrency;
use crate::{Error, Result};
use derive_builder::Builder;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use url::Url;

/// Concurrency used when none (or a value below 1) is requested
pub const DEFAULT_CONCURRENCY: usize = 1;
/// Upper bound for concurrent chunk workers
pub const MAX_CONCURRENCY: usize = 16;
/// Size of the intermediate buffers used for part files and assembly
pub const BUFFER_SIZE: usize = 1024 * 1024;
/// Directory, relative to the working directory, used when none is given
pub const DEFAULT_DIRECTORY: &str = "Downloads";

/// What to download and where to put it
///
/// # Example
///
/// ```no_run
/// use chunkdl::TransferRequest;
/// # fn main() -> Result<(), chunkdl::Error> {
/// let request = TransferRequest::builder()
///     .url("https://example.com/file.iso")
///     .concurrency(4)
///     .directory("/tmp")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct TransferRequest {
    url: String,
    /// Requested worker count, clamped to `1..=MAX_CONCURRENCY` on use
    #[builder(default = "DEFAULT_CONCURRENCY as i64")]
    concurrency: i64,
    #[builder(default, setter(into, strip_option))]
    directory: Option<PathBuf>,
    #[builder(default, setter(into, strip_option))]
    file_name: Option<String>,
}

impl TransferRequest {
    pub fn builder() -> TransferRequestBuilder {
        TransferRequestBuilder::default()
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn concurrency(&self) -> i64 {
        self.concurrency
    }
    /// Fill in the defaults and reject unusable input
    #[instrument(skip(self), fields(URL = %self.url))]
    pub fn resolve(&self) -> Result<Target> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(Error::EmptyUrl);
        }
        let url = Url::parse(raw)?;
        let file_name = match self.file_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => url_to_filename(&url)?,
        };
        let directory = match &self.directory {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => std::env::current_dir()?.join(DEFAULT_DIRECTORY),
        };
        let concurrency = clamp_concurrency(self.concurrency);
        debug!(
            "Resolved {} into {} with {} workers",
            url,
            directory.join(&file_name).display(),
            concurrency
        );
        Ok(Target {
            url,
            directory,
            file_name,
            concurrency,
        })
    }
}

/// A validated [`TransferRequest`]
#[derive(Debug, Clone)]
pub struct Target {
    url: Url,
    directory: PathBuf,
    file_name: String,
    concurrency: usize,
}

impl Target {
    pub fn url(&self) -> &Url {
        &self.url
    }
    pub fn directory(&self) -> &Path {
        &self.directory
    }
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
    /// Path of the assembled file
    pub fn destination(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
    /// Path of the part file holding chunk `index`
    pub fn part_path(&self, index: usize) -> PathBuf {
        self.directory
            .join(format!("{}.{}.part", self.file_name, index))
    }
}

pub(crate) fn url_to_filename(url: &Url) -> Result<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| {
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .ok_or_else(|| Error::NoFilename(url.to_string()))
}
