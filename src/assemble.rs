use crate::config::BUFFER_SIZE;
use crate::{Error, Result};
use std::path::PathBuf;
use tokio::fs::{self, File};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, instrument};

/// Append every part file to `destination` in the given order, deleting each one once copied
///
/// `parts` has to be in ascending chunk order, the bytes of each part are copied as is.
#[instrument(skip(destination, parts), fields(parts = parts.len()))]
pub async fn assemble<W>(destination: &mut W, parts: &[PathBuf]) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut total = 0;
    for path in parts {
        let err = |source| Error::Assembly {
            path: path.clone(),
            source,
        };
        let part = File::open(path).await.map_err(err)?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, part);
        let copied = tokio::io::copy_buf(&mut reader, destination)
            .await
            .map_err(err)?;
        fs::remove_file(path).await.map_err(err)?;
        debug!("Appended {} bytes from {}", copied, path.display());
        total += copied;
    }
    destination.flush().await?;
    Ok(total)
}
