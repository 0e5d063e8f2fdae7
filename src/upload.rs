//! Upload handling: turns a user-selected photo into request material.

use crate::error::{Result, StudioError};
use crate::types::ImageFormat;
use base64::Engine;
use std::path::Path;

/// Largest accepted upload payload.
pub const MAX_UPLOAD_BYTES: u64 = 4 * 1024 * 1024;

pub(crate) const OVERSIZE_MESSAGE: &str = "The file must not exceed 4 MB.";
pub(crate) const UNSUPPORTED_MESSAGE: &str = "Only PNG, JPEG and WEBP images are supported.";

/// A photo uploaded for the editing tools, held in memory only.
///
/// The payload is kept base64-encoded, ready for an inline-image request
/// segment; the preview URL is a data URI a front end can render directly.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    base64: String,
    format: ImageFormat,
    preview_url: String,
}

impl UploadedImage {
    /// Builds an upload from raw image bytes.
    ///
    /// Enforces the size cap and accepts only payloads whose magic bytes
    /// identify a supported format; the filename is never consulted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(StudioError::Validation(OVERSIZE_MESSAGE.into()));
        }

        let format = ImageFormat::from_magic_bytes(bytes)
            .ok_or_else(|| StudioError::Validation(UNSUPPORTED_MESSAGE.into()))?;

        let base64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        let preview_url = format!("data:{};base64,{}", format.mime_type(), base64);

        Ok(Self {
            base64,
            format,
            preview_url,
        })
    }

    /// Reads an upload from a file path.
    ///
    /// The size cap is checked against file metadata before the payload is
    /// read at all.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let metadata =
            std::fs::metadata(path).map_err(|e| StudioError::Read(e.to_string()))?;
        if metadata.len() > MAX_UPLOAD_BYTES {
            return Err(StudioError::Validation(OVERSIZE_MESSAGE.into()));
        }

        let bytes = std::fs::read(path).map_err(|e| StudioError::Read(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the base64-encoded payload.
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// Returns the sniffed image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Returns the MIME type of the payload.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Returns a data URI suitable for previewing the upload.
    pub fn preview_url(&self) -> &str {
        &self.preview_url
    }
}
