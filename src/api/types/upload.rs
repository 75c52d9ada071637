//! Multipart upload form and parse response

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Chunk, RenderedDocument, UploadFile, UploadOptions, UploadPolicy};

use super::ApiError;

const FILE_FIELD: &str = "file";
const HIGH_RES_FIELDS: [&str; 3] = ["hi_res", "highRes", "isHighRes"];
const FORMAT_FIELD: &str = "format";

/// Fields of an upload form
#[derive(Debug, Clone)]
pub struct UploadForm {
    /// Empty (no name, no bytes) when the form carried no file
    pub file: UploadFile,
    pub high_res: bool,
    /// `format=raw` was requested
    pub raw: bool,
}

impl UploadForm {
    pub fn options(&self) -> UploadOptions {
        UploadOptions {
            high_res: self.high_res,
        }
    }
}

/// Response of the stateless parse endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub request_id: String,
    pub chunks: Vec<Chunk>,
    pub rendered: RenderedDocument,
}

/// Read an upload form, tolerating unknown fields
pub async fn read_upload_form(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<UploadForm, ApiError> {
    let mut file = UploadFile::new("", "", Vec::new());
    let mut high_res = false;
    let mut raw = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, policy))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty() && s != "application/octet-stream")
                .unwrap_or_else(|| {
                    mime_guess::from_path(&filename)
                        .first_or_octet_stream()
                        .to_string()
                });

            let content = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, policy))?;

            debug!(
                filename = %filename,
                content_type = %content_type,
                size = content.len(),
                "Read upload field"
            );
            file = UploadFile::new(filename, content_type, content);
        } else if HIGH_RES_FIELDS.contains(&name.as_str()) {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, policy))?;
            high_res = parse_flag(&value);
        } else if name == FORMAT_FIELD {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, policy))?;
            raw = value.trim().eq_ignore_ascii_case("raw");
        }
    }

    Ok(UploadForm {
        file,
        high_res,
        raw,
    })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

fn multipart_error(err: MultipartError, policy: &UploadPolicy) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large(policy.too_large_message());
    }

    ApiError::bad_request(format!("Failed to read multipart field: {}", err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(parse_flag("on"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
