//! Request and response types of the HTTP API

pub mod error;
pub mod upload;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use upload::{ParseResponse, UploadForm, read_upload_form};
