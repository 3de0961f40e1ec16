use std::fs;
use std::path::Path;

use bytes::Bytes;

use crate::{GatewayError, GatewayErrorKind};

/// A document ready to be sent to the ingest endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for(&filename);
        Self {
            filename,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Reads `path` fully; the file name becomes the multipart file name.
    pub fn from_path(path: &Path) -> Result<Self, GatewayError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                GatewayError::new(
                    GatewayErrorKind::Io,
                    format!("not a file path: {}", path.display()),
                )
            })?
            .to_string();
        let bytes = fs::read(path).map_err(|err| {
            GatewayError::new(
                GatewayErrorKind::Io,
                format!("{}: {err}", path.display()),
            )
        })?;
        Ok(Self::new(filename, bytes))
    }

    /// Body size announced in the multipart part header.
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
