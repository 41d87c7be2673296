use axum::extract::multipart::{Field, MultipartError};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload stream interrupted: {0}")]
    Stream(#[from] MultipartError),
    #[error("failed to write upload to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Streams one multipart field to `path` chunk by chunk, returning the
/// number of bytes written. A partially written file is left for the caller
/// to clean up.
pub async fn stream_to_file(mut field: Field<'_>, path: &Path) -> Result<u64, UploadError> {
    let write_err = |source| UploadError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Stream error while writing {}: {}", path.display(), e);
                return Err(e.into());
            }
        };

        writer.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(write_err)?;
    debug!("Wrote {} bytes to {}", written, path.display());
    Ok(written)
}
