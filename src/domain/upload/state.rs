//! Upload state and the transitions that mutate it

use serde::{Deserialize, Serialize};

use crate::domain::chunk::Chunk;

pub const EMPTY_RESULT_MESSAGE: &str = "No readable content found.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Ready,
    Error,
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Uploading => write!(f, "uploading"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Observable state of the upload orchestrator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadState {
    pub status: UploadStatus,
    pub chunks: Option<Vec<Chunk>>,
    pub error_message: Option<String>,
    pub show_raw_json: bool,
    /// Token of the most recently started attempt, 0 before the first one
    pub upload_id: u64,
    pub filename: Option<String>,
}

/// Every way the state can change
#[derive(Debug, Clone, PartialEq)]
pub enum UploadAction {
    /// Mints a new token and enters `uploading`
    Start { filename: String },
    /// Mints a new token and fails immediately (validation)
    Reject { filename: String, message: String },
    /// Gateway result for attempt `upload_id`
    Complete { upload_id: u64, chunks: Vec<Chunk> },
    /// Gateway failure for attempt `upload_id`
    Fail { upload_id: u64, message: String },
    ToggleShowRaw,
    SetError { message: String },
    /// Back to idle; mints a token so in-flight attempts are discarded
    Reset,
}

impl UploadState {
    /// Apply `action`, returning whether anything changed
    pub fn apply(&mut self, action: UploadAction) -> bool {
        match action {
            UploadAction::Start { filename } => {
                self.upload_id += 1;
                self.status = UploadStatus::Uploading;
                self.chunks = None;
                self.error_message = None;
                self.show_raw_json = false;
                self.filename = Some(filename);
                true
            }
            UploadAction::Reject { filename, message } => {
                self.upload_id += 1;
                self.status = UploadStatus::Error;
                self.chunks = None;
                self.error_message = Some(message);
                self.show_raw_json = false;
                self.filename = Some(filename);
                true
            }
            UploadAction::Complete { upload_id, chunks } => {
                if upload_id != self.upload_id {
                    return false;
                }

                if chunks.is_empty() {
                    self.status = UploadStatus::Error;
                    self.chunks = None;
                    self.error_message = Some(EMPTY_RESULT_MESSAGE.to_string());
                } else {
                    self.status = UploadStatus::Ready;
                    self.chunks = Some(chunks);
                    self.error_message = None;
                }
                true
            }
            UploadAction::Fail { upload_id, message } => {
                if upload_id != self.upload_id {
                    return false;
                }

                self.status = UploadStatus::Error;
                self.error_message = Some(message);
                true
            }
            UploadAction::ToggleShowRaw => {
                self.show_raw_json = !self.show_raw_json;
                true
            }
            UploadAction::SetError { message } => {
                self.status = UploadStatus::Error;
                self.error_message = Some(message);
                true
            }
            UploadAction::Reset => {
                self.upload_id += 1;
                self.status = UploadStatus::Idle;
                self.chunks = None;
                self.error_message = None;
                self.show_raw_json = false;
                self.filename = None;
                true
            }
        }
    }
}
