//! Taxonomía de errores del core.
//!
//! Ningún error es fatal: cada comando devuelve su fallo al llamador (la UI),
//! que decide si reintenta re-emitiendo el comando.

use idflow_domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Etiqueta plana del tipo de fallo, pensada para que la UI elija cómo
/// presentarlo sin inspeccionar mensajes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    PermissionDenied,
    UserCancelled,
    Timeout,
    SdkError,
    CameraFailed,
    ValidationError,
    Busy,
    BackendFailure,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum FlowError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("capture cancelled by the user")]
    UserCancelled,
    #[error("capture session timed out")]
    Timeout,
    #[error("capture sdk error {code}: {description}")]
    SdkError { code: String, description: String },
    #[error("camera failed: {0}")]
    CameraFailed(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("busy: {0} in progress")]
    Busy(String),
    #[error("backend failure: {0}")]
    BackendFailure(String),
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::PermissionDenied => ErrorKind::PermissionDenied,
            FlowError::UserCancelled => ErrorKind::UserCancelled,
            FlowError::Timeout => ErrorKind::Timeout,
            FlowError::SdkError { .. } => ErrorKind::SdkError,
            FlowError::CameraFailed(_) => ErrorKind::CameraFailed,
            FlowError::Validation(_) => ErrorKind::ValidationError,
            FlowError::Busy(_) => ErrorKind::Busy,
            FlowError::BackendFailure(_) => ErrorKind::BackendFailure,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        FlowError::Validation(msg.into())
    }
}

impl From<DomainError> for FlowError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ValidationError(msg) => FlowError::Validation(msg),
            other => FlowError::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_variants() {
        assert_eq!(FlowError::Busy("capture".into()).kind(), ErrorKind::Busy);
        assert_eq!(FlowError::SdkError { code: "73".into(), description: "x".into() }.kind(), ErrorKind::SdkError);
        assert_eq!(FlowError::validation("empty").kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn sdk_error_message_carries_code() {
        let e = FlowError::SdkError { code: "73001".into(),
                                      description: "face not detected".into() };
        assert_eq!(e.to_string(), "capture sdk error 73001: face not detected");
    }

    #[test]
    fn domain_validation_maps_to_validation() {
        let e: FlowError = DomainError::ValidationError("bad".into()).into();
        assert_eq!(e, FlowError::Validation("bad".into()));
    }
}
