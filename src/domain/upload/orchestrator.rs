//! Upload orchestration with token-based supersession
//!
//! Every started attempt mints a new token. A gateway result is applied only
//! while its token is still the current one, so a slow first upload can never
//! overwrite the outcome of a newer one.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::chunk::organize;
use crate::domain::gateway::{ParsingGateway, PartitionRequest, Strategy};

use super::state::{UploadAction, UploadState, UploadStatus};
use super::validator::{UploadFile, UploadPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub high_res: bool,
}

/// How a settled attempt affected the shared state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Applied(UploadStatus),
    /// A newer attempt (or a reset) took over before this one settled
    Superseded,
}

/// An attempt that has entered `uploading` and awaits the gateway
#[derive(Debug, Clone)]
pub struct PendingUpload {
    upload_id: u64,
    request: PartitionRequest,
}

impl PendingUpload {
    pub fn upload_id(&self) -> u64 {
        self.upload_id
    }
}

/// Owns the lifecycle of uploads and the state observers subscribe to
pub struct UploadOrchestrator {
    gateway: Arc<dyn ParsingGateway>,
    policy: UploadPolicy,
    state: watch::Sender<UploadState>,
}

impl UploadOrchestrator {
    pub fn new(gateway: Arc<dyn ParsingGateway>, policy: UploadPolicy) -> Self {
        let (state, _) = watch::channel(UploadState::default());

        Self {
            gateway,
            policy,
            state,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Snapshot of the current state
    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    /// Apply an action atomically; returns whether the state changed
    pub fn dispatch(&self, action: UploadAction) -> bool {
        self.state.send_if_modified(|state| state.apply(action))
    }

    /// Validate, run the gateway and apply the result if still current
    pub async fn upload_document(&self, file: UploadFile, options: UploadOptions) -> UploadOutcome {
        match self.begin_upload(file, options) {
            Some(pending) => self.finish_upload(pending).await,
            None => UploadOutcome::Applied(UploadStatus::Error),
        }
    }

    /// First half of an upload: validation and the transition to `uploading`.
    ///
    /// Returns `None` when validation failed; the state is then `error` and
    /// the gateway must not be called.
    pub fn begin_upload(&self, file: UploadFile, options: UploadOptions) -> Option<PendingUpload> {
        if let Err(e) = self.policy.validate(&file) {
            warn!(
                event = "upload_rejected",
                filename = %file.filename,
                content_type = %file.content_type,
                size = file.size(),
                error = %e,
                "Upload failed validation"
            );

            self.dispatch(UploadAction::Reject {
                filename: file.filename,
                message: e.to_string(),
            });
            return None;
        }

        let mut upload_id = 0;
        self.state.send_if_modified(|state| {
            let changed = state.apply(UploadAction::Start {
                filename: file.filename.clone(),
            });
            upload_id = state.upload_id;
            changed
        });

        let strategy = Strategy::from_high_res(options.high_res);

        info!(
            event = "upload_started",
            upload_id,
            filename = %file.filename,
            size = file.size(),
            strategy = %strategy,
            "Upload started"
        );

        Some(PendingUpload {
            upload_id,
            request: PartitionRequest::new(file.content, file.filename).with_strategy(strategy),
        })
    }

    /// Second half of an upload: call the gateway and settle
    pub async fn finish_upload(&self, pending: PendingUpload) -> UploadOutcome {
        let PendingUpload { upload_id, request } = pending;

        let action = match self.gateway.partition(request).await {
            Ok(elements) => {
                let element_count = elements.len();
                let chunks = organize(elements);

                debug!(
                    upload_id,
                    elements = element_count,
                    chunks = chunks.len(),
                    "Gateway returned elements"
                );

                UploadAction::Complete { upload_id, chunks }
            }
            Err(e) => {
                warn!(
                    event = "upload_failed",
                    upload_id,
                    status = ?e.status_code(),
                    error = %e,
                    "Gateway call failed"
                );

                UploadAction::Fail {
                    upload_id,
                    message: e.to_string(),
                }
            }
        };

        let mut status = None;
        self.state.send_if_modified(|state| {
            let changed = state.apply(action);
            if changed {
                status = Some(state.status);
            }
            changed
        });

        match status {
            Some(status) => {
                info!(event = "upload_completed", upload_id, status = %status, "Upload settled");
                UploadOutcome::Applied(status)
            }
            None => {
                debug!(upload_id, "Discarding result of superseded upload");
                UploadOutcome::Superseded
            }
        }
    }

    pub fn toggle_show_raw(&self) {
        self.dispatch(UploadAction::ToggleShowRaw);
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.dispatch(UploadAction::SetError {
            message: message.into(),
        });
    }

    pub fn reset(&self) {
        self.dispatch(UploadAction::Reset);
    }
}

impl std::fmt::Debug for UploadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOrchestrator")
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
