//! File type and size checks run before anything reaches the parsing service

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

pub const DEFAULT_ALLOWED_MIME_TYPES: [&str; 4] =
    ["application/pdf", "image/png", "image/jpeg", "image/jpg"];

pub const NO_FILE_MESSAGE: &str = "No file uploaded";
pub const UNSUPPORTED_TYPE_MESSAGE: &str =
    "Unsupported file type. Please upload a PDF or image file.";

/// A file handed in by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    fn is_missing(&self) -> bool {
        self.filename.trim().is_empty() && self.content.is_empty()
    }
}

/// Accepted types and size ceiling for uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_file_size_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl UploadPolicy {
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    pub fn with_allowed_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn accepts_type(&self, file: &UploadFile) -> bool {
        let mime = essence(&file.content_type);
        self.allowed_mime_types
            .iter()
            .any(|allowed| essence(allowed) == mime)
    }

    pub fn accepts_size(&self, file: &UploadFile) -> bool {
        validate_file_size(file, self.max_file_size_bytes)
    }

    /// Missing file, then type, then size
    pub fn validate(&self, file: &UploadFile) -> Result<(), DomainError> {
        if file.is_missing() {
            return Err(DomainError::validation(NO_FILE_MESSAGE));
        }

        if !self.accepts_type(file) {
            return Err(DomainError::validation(UNSUPPORTED_TYPE_MESSAGE));
        }

        if !self.accepts_size(file) {
            return Err(DomainError::validation(self.too_large_message()));
        }

        Ok(())
    }

    pub fn too_large_message(&self) -> String {
        format!(
            "File is too large. Please keep uploads under {}.",
            human_size(self.max_file_size_bytes)
        )
    }
}

/// Type check against the default allow-list
pub fn validate_file_type(file: &UploadFile) -> bool {
    UploadPolicy::default().accepts_type(file)
}

pub fn validate_file_size(file: &UploadFile, max_bytes: u64) -> bool {
    file.size() <= max_bytes
}

/// `Image/PNG; charset=binary` -> `image/png`
fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}
