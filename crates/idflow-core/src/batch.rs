//! Coordinador del envío en lote.
//!
//! Secuencia: compuerta → validación → `Sending` → una llamada al backend → `Sent` o
//! `Error`. Sólo un fallo marca `Error`; el éxito nunca termina en `Error`.
//! La colección se conserva tras un fallo para permitir reintentar.
use std::sync::Arc;

use idflow_domain::{BatchResponse, BatchStatusReport, CapturedItem, ItemStatus};
use log::{info, warn};
use parking_lot::Mutex;

use crate::errors::FlowError;
use crate::event::FlowEventKind;
use crate::gate::{Operation, OperationGate};
use crate::providers::BatchProvider;
use crate::session::SessionState;

/// Precondición del envío: al menos un item y al menos una selfie.
pub fn validate_submission(items: &[CapturedItem]) -> Result<(), FlowError> {
    if items.is_empty() {
        return Err(FlowError::validation("no items to submit"));
    }
    if !items.iter().any(|i| i.is_selfie()) {
        return Err(FlowError::validation("at least one selfie is required"));
    }
    Ok(())
}

pub struct BatchCoordinator {
    backend: Arc<dyn BatchProvider>,
    gate: OperationGate,
}

impl BatchCoordinator {
    pub fn new(backend: Arc<dyn BatchProvider>, gate: OperationGate) -> Self {
        Self { backend, gate }
    }

    /// Envía la colección actual de la sesión.
    ///
    /// `Ok` sólo si el backend respondió `success = true`. Una respuesta con
    /// `success = false` o un error de transporte devuelven `BackendFailure`;
    /// en ambos casos la respuesta (real o sintetizada) queda registrada en la
    /// sesión.
    pub async fn submit(&self, session: &Mutex<SessionState>) -> Result<BatchResponse, FlowError> {
        let permit = self.gate.try_acquire(Operation::SubmitBatch)?;

        let items = {
            let mut state = session.lock();
            validate_submission(state.store.items())?;
            state.set_all_status(ItemStatus::Sending);
            state.store.items().to_vec()
        };
        info!("batch:submit items={} request={}", items.len(), permit.request_id());

        let mut in_flight = InFlightSubmission { session, armed: true };
        let outcome = self.backend.submit_batch(&items).await;
        in_flight.armed = false;

        let mut state = session.lock();
        match outcome {
            Ok(response) if response.success => {
                state.set_all_status(ItemStatus::Sent);
                state.last_batch_response = Some(response.clone());
                state.record(FlowEventKind::BatchSubmitted { batch_id: response.batch_id.clone(),
                                                             message: response.message.clone() });
                state.check_terminal_step();
                info!("batch:accepted batch={:?}", response.batch_id);
                Ok(response)
            }
            Ok(response) => {
                warn!("batch:rejected message={}", response.message);
                state.set_all_status(ItemStatus::Error);
                state.last_batch_response = Some(response.clone());
                state.record(FlowEventKind::BatchFailed { message: response.message.clone() });
                Err(FlowError::BackendFailure(response.message))
            }
            Err(e) => {
                warn!("batch:transport error={e}");
                state.set_all_status(ItemStatus::Error);
                let response = BatchResponse::failure("batch submission failed", Some(e.0.clone()));
                state.record(FlowEventKind::BatchFailed { message: response.message.clone() });
                state.last_batch_response = Some(response);
                Err(e.into())
            }
        }
    }

    /// Consulta informativa del estado de un lote. No toca items ni flujo.
    pub async fn check_status(&self, batch_id: &str) -> Result<Option<BatchStatusReport>, FlowError> {
        let _permit = self.gate.try_acquire(Operation::CheckBatchStatus)?;
        if batch_id.trim().is_empty() {
            return Err(FlowError::validation("batch id is required"));
        }
        Ok(self.backend.check_batch_status(batch_id).await?)
    }
}

/// Envío en curso. Si el futuro se descarta antes de que el backend
/// responda, los items pasan a `Error` para poder reintentar.
struct InFlightSubmission<'a> {
    session: &'a Mutex<SessionState>,
    armed: bool,
}

impl Drop for InFlightSubmission<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.session.lock();
        warn!("batch:interrupted session={}", state.session_id());
        state.set_all_status(ItemStatus::Error);
        let response = BatchResponse::failure("batch submission interrupted", None);
        state.record(FlowEventKind::BatchFailed { message: response.message.clone() });
        state.last_batch_response = Some(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idflow_domain::{CaptureArtifact, DocumentType};

    #[test]
    fn empty_submission_is_rejected() {
        assert_eq!(validate_submission(&[]), Err(FlowError::Validation("no items to submit".into())));
    }

    #[test]
    fn submission_without_selfie_is_rejected() {
        let items = vec![CapturedItem::document(DocumentType::IdFront, CaptureArtifact::new("b", "e"))];
        assert!(matches!(validate_submission(&items), Err(FlowError::Validation(_))));
    }

    #[test]
    fn selfie_alone_is_enough_to_submit() {
        let items = vec![CapturedItem::selfie(CaptureArtifact::new("b", "e"))];
        assert!(validate_submission(&items).is_ok());
    }
}
