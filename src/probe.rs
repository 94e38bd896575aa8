use crate::{Error, Result};
use reqwest::header::{HeaderMap, ACCEPT_RANGES, CONTENT_LENGTH};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

/// What the server told us about the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferMetadata {
    accepts_ranges: bool,
    content_length: Option<u64>,
}

impl TransferMetadata {
    pub fn new(accepts_ranges: bool, content_length: Option<u64>) -> Self {
        Self {
            accepts_ranges,
            content_length: content_length.filter(|len| *len > 0),
        }
    }
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        let accepts_ranges = headers
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                let v = v.trim();
                !v.is_empty() && !v.eq_ignore_ascii_case("none")
            })
            .unwrap_or(false);
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        Self::new(accepts_ranges, content_length)
    }
    pub fn accepts_ranges(&self) -> bool {
        self.accepts_ranges
    }
    /// `None` when the length is unknown
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

/// Issue a HEAD request and read range support and content length from it
///
/// A missing or unparsable length is not an error, the transfer then falls back
/// to a single unranged fetch.
#[instrument(skip(client, url), fields(URL=%url))]
pub async fn probe(client: &Client, url: &Url) -> Result<TransferMetadata> {
    let resp = client
        .head(url.clone())
        .send()
        .await
        .map_err(Error::Probe)?;
    debug!("Response code: {}", resp.status());
    debug!("Received HEAD response: {:?}", resp.headers());
    if !resp.status().is_success() {
        return Err(Error::ProbeStatus(resp.status()));
    }
    // the header is read directly, `Response::content_length` reports the empty HEAD body
    Ok(TransferMetadata::from_headers(resp.headers()))
}
