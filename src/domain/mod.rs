//! Domain layer - document model, chunking and upload lifecycle

pub mod chunk;
pub mod clock;
pub mod element;
pub mod error;
pub mod gateway;
pub mod render;
pub mod upload;

pub use chunk::{Chunk, organize};
pub use clock::{Clock, ManualClock, SystemClock};
pub use element::{Element, ElementKind, ElementMetadata};
pub use error::DomainError;
pub use gateway::{ParsingGateway, PartitionRequest, Strategy};
pub use render::{RenderedDocument, render_chunks, render_document, render_element};
pub use upload::{
    UploadAction, UploadFile, UploadOptions, UploadOrchestrator, UploadOutcome, UploadPolicy,
    UploadState, UploadStatus,
};
