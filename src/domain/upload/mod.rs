//! Upload validation and orchestration

mod orchestrator;
mod state;
mod validator;

pub use orchestrator::{PendingUpload, UploadOptions, UploadOrchestrator, UploadOutcome};
pub use state::{EMPTY_RESULT_MESSAGE, UploadAction, UploadState, UploadStatus};
pub use validator::{
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_FILE_SIZE_BYTES, NO_FILE_MESSAGE,
    UNSUPPORTED_TYPE_MESSAGE, UploadFile, UploadPolicy, validate_file_size, validate_file_type,
};
