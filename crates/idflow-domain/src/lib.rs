// idflow-domain library entry point
pub mod batch;
pub mod error;
pub mod item;
pub use batch::{BatchResponse, BatchStatusReport, BatchSubmission, ProcessedItem, UserProfile};
pub use error::DomainError;
pub use item::{CaptureArtifact, CapturedItem, DocumentType, ItemIdentity, ItemKind, ItemStatus};
