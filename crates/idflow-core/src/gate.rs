//! Compuerta de operación única.
//!
//! Como máximo una llamada asíncrona a colaboradores (captura nativa, backend)
//! puede estar en curso por sesión. La compuerta guarda la identidad explícita
//! de la petición pendiente; el permiso la libera al soltarse (`Drop`), tanto
//! en el camino de éxito como en el de error o si el futuro se descarta.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use idflow_domain::{DocumentType, ItemIdentity};
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CaptureSelfie,
    CaptureDocument(DocumentType),
    SubmitBatch,
    CheckBatchStatus,
    Diagnostics,
}

impl Operation {
    pub fn capture(target: ItemIdentity) -> Self {
        match target {
            ItemIdentity::Selfie => Operation::CaptureSelfie,
            ItemIdentity::Document(d) => Operation::CaptureDocument(d),
        }
    }

    /// Texto corto para la UI ("Capturing selfie", "Submitting batch", ...).
    pub fn label(&self) -> String {
        match self {
            Operation::CaptureSelfie => "Capturing selfie".to_string(),
            Operation::CaptureDocument(d) => format!("Capturing {d}"),
            Operation::SubmitBatch => "Submitting batch".to_string(),
            Operation::CheckBatchStatus => "Checking batch status".to_string(),
            Operation::Diagnostics => "Running diagnostics".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub request_id: Uuid,
    pub operation: Operation,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct OperationGate {
    pending: Arc<Mutex<Option<PendingOperation>>>,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserva la compuerta para `operation` o falla con `Busy` si ya hay
    /// otra petición pendiente. Nunca encola.
    pub fn try_acquire(&self, operation: Operation) -> Result<OperationPermit, FlowError> {
        let mut slot = self.pending.lock();
        if let Some(current) = slot.as_ref() {
            debug!("gate:rejected requested={:?} pending={} op={:?}", operation, current.request_id, current.operation);
            return Err(FlowError::Busy(current.operation.label()));
        }
        let request_id = Uuid::new_v4();
        *slot = Some(PendingOperation { request_id,
                                        operation,
                                        started_at: Utc::now() });
        debug!("gate:acquired request={request_id} op={operation:?}");
        Ok(OperationPermit { gate: self.clone(), request_id })
    }

    /// `Err(Busy)` si hay una operación pendiente. Usado por los comandos
    /// síncronos, que no reservan la compuerta.
    pub fn ensure_idle(&self) -> Result<(), FlowError> {
        match self.pending.lock().as_ref() {
            Some(current) => Err(FlowError::Busy(current.operation.label())),
            None => Ok(()),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.lock().is_some()
    }

    pub fn current(&self) -> Option<PendingOperation> {
        self.pending.lock().clone()
    }

    pub fn current_label(&self) -> Option<String> {
        self.pending.lock().as_ref().map(|p| p.operation.label())
    }
}

/// Permiso exclusivo sobre la compuerta. Se libera al soltarse.
#[derive(Debug)]
pub struct OperationPermit {
    gate: OperationGate,
    request_id: Uuid,
}

impl OperationPermit {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        let mut slot = self.gate.pending.lock();
        if slot.as_ref().map(|p| p.request_id) == Some(self.request_id) {
            *slot = None;
            debug!("gate:released request={}", self.request_id);
        }
    }
}
