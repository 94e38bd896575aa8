use crate::config::BUFFER_SIZE;
use crate::plan::Chunk;
use crate::{Error, Result};
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::RANGE;
use reqwest::{Client, Url};
use std::io::Write;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

/// Fetches one chunk into its part file
#[derive(Debug)]
pub(crate) struct ChunkWorker {
    client: Client,
    url: Url,
    chunk: Chunk,
    path: PathBuf,
    part: File,
}

impl ChunkWorker {
    /// `part` is the already created part file at `path`
    pub(crate) fn new(client: Client, url: Url, chunk: Chunk, path: PathBuf, part: File) -> Self {
        Self {
            client,
            url,
            chunk,
            path,
            part,
        }
    }

    /// Stream the chunk into the part file, passing every buffer through `progress` as well
    #[instrument(skip(self, progress), fields(index = self.chunk.index, range = ?self.chunk.range))]
    pub(crate) async fn run<P: Write>(self, mut progress: P) -> Result<u64> {
        let index = self.chunk.index;
        let mut req = self.client.get(self.url.clone());
        if let Some(range) = self.chunk.range {
            req = req.header(RANGE, range.header_value());
        }
        let resp = req
            .send()
            .await
            .map_err(|source| Error::Fetch { index, source })?;
        debug!(
            "Response code: {}, headers: {:?}",
            resp.status(),
            resp.headers()
        );
        if !resp.status().is_success() {
            return Err(Error::FetchStatus {
                index,
                status: resp.status(),
            });
        }
        let path = self.path;
        let part_err = |source| Error::PartFile {
            index,
            path: path.clone(),
            source,
        };
        let mut part = BufWriter::with_capacity(BUFFER_SIZE, self.part);
        let mut received = 0u64;
        let mut body = resp.bytes_stream();
        while let Some(buf) = body.next().await {
            let buf: Bytes = buf.map_err(|source| Error::Fetch { index, source })?;
            part.write_all(&buf).await.map_err(part_err)?;
            progress.write_all(&buf)?;
            received += buf.len() as u64;
        }
        part.flush().await.map_err(part_err)?;
        if let Some(expected) = self.chunk.expected_len() {
            if received != expected {
                return Err(Error::ChunkLength {
                    index,
                    expected,
                    received,
                });
            }
        }
        info!("Chunk {} done, {} bytes", index, received);
        Ok(received)
    }
}
