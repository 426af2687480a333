//! Picking a file from disk for upload.

use std::path::Path;

use clauselens_core::UploadFile;
use clauselens_core::document::is_accepted_extension;
use tracing::debug;

use crate::http::ClientError;

/// 10 MiB, the backend's default upload limit.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read `path` into an [`UploadFile`], applying the picker's filters.
///
/// Rejects extensions other than `.pdf`/`.docx`, empty files, and files
/// larger than `max_size`. Oversized files are rejected from their metadata
/// without being read.
pub async fn load_upload(path: &Path, max_size: u64) -> Result<UploadFile, ClientError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_accepted_extension(&name) {
        return Err(ClientError::Unsupported(name));
    }

    let file_error = |source: std::io::Error| ClientError::File {
        path: path.to_path_buf(),
        source,
    };
    let listed = tokio::fs::metadata(path).await.map_err(file_error)?.len();
    if listed > max_size {
        return Err(ClientError::TooLarge {
            size: listed,
            max: max_size,
        });
    }

    // The file may have changed since the metadata call.
    let bytes = tokio::fs::read(path).await.map_err(file_error)?;
    let size = bytes.len() as u64;
    if size == 0 {
        return Err(ClientError::Empty);
    }
    if size > max_size {
        return Err(ClientError::TooLarge {
            size,
            max: max_size,
        });
    }

    debug!(name = %name, size, "loaded upload from disk");
    Ok(UploadFile::new(name, bytes))
}
