//! Contratos de los colaboradores externos que consume el core.
//!
//! Cada llamada devuelve un único resultado asíncrono (valor o fallo
//! etiquetado). No hay listeners ni callbacks: el SDK nativo, el subsistema de
//! permisos y el backend se adaptan fuera del core a estos traits.
use async_trait::async_trait;
use idflow_domain::{BatchResponse, BatchStatusReport, CaptureArtifact, CapturedItem, DocumentType};
use thiserror::Error;

use crate::errors::FlowError;

/// Fallos que puede reportar el SDK de captura.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureFailure {
    #[error("user closed the camera")]
    UserCancelled,
    #[error("capture session timed out")]
    Timeout,
    #[error("sdk error {code}: {description}")]
    SdkError { code: String, description: String },
    #[error("camera failed: {0}")]
    CameraFailed(String),
}

impl From<CaptureFailure> for FlowError {
    fn from(f: CaptureFailure) -> Self {
        match f {
            CaptureFailure::UserCancelled => FlowError::UserCancelled,
            CaptureFailure::Timeout => FlowError::Timeout,
            CaptureFailure::SdkError { code, description } => FlowError::SdkError { code, description },
            CaptureFailure::CameraFailed(msg) => FlowError::CameraFailed(msg),
        }
    }
}

/// Fallo de transporte o del servicio de backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl From<BackendError> for FlowError {
    fn from(e: BackendError) -> Self {
        FlowError::BackendFailure(e.0)
    }
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn check_camera_permission(&self) -> bool;
    async fn request_camera_permission(&self) -> bool;
    async fn open_settings(&self);
}

#[async_trait]
pub trait CaptureProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_version(&self) -> &str;

    /// Prueba básica del puente con el módulo nativo.
    async fn test_connection(&self) -> Result<String, CaptureFailure>;

    async fn capture_selfie(&self) -> Result<CaptureArtifact, CaptureFailure>;

    async fn capture_document(&self, document_type: DocumentType) -> Result<CaptureArtifact, CaptureFailure>;
}

#[async_trait]
pub trait BatchProvider: Send + Sync {
    async fn submit_batch(&self, items: &[CapturedItem]) -> Result<BatchResponse, BackendError>;

    /// `Ok(None)` cuando el backend no tiene información disponible.
    async fn check_batch_status(&self, batch_id: &str) -> Result<Option<BatchStatusReport>, BackendError>;
}
