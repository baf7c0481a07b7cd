//! `data:<mimetype>;base64,<payload>` handling

use crate::error::AnalysisError;
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Borrowed view of a base64 image data URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDataUri<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

impl<'a> ImageDataUri<'a> {
    /// Split a data URI. The payload itself is not decoded or inspected.
    pub fn parse(uri: &'a str) -> Result<Self> {
        let rest = uri.trim().strip_prefix("data:").ok_or_else(|| {
            AnalysisError::InvalidInput("Image must be a data URI (data:<mimetype>;base64,...)".to_string())
        })?;

        let (header, data) = rest.split_once(',').ok_or_else(|| {
            AnalysisError::InvalidInput("Data URI has no payload".to_string())
        })?;

        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            AnalysisError::InvalidInput("Data URI must use base64 encoding".to_string())
        })?;

        if mime_type.is_empty() || data.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Data URI is missing a media type or payload".to_string(),
            ));
        }

        Ok(Self { mime_type, data })
    }

    /// Short SHA-256 of the payload for log lines
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.data.as_bytes());
        hex::encode(&hash[..8])
    }
}

/// Build a data URI from raw bytes
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Media type from a file extension, defaulting to PNG
pub fn mime_type_for_extension(extension: Option<&str>) -> &'static str {
    match extension.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/png",
    }
}
