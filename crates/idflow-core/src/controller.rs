//! Controlador de alto nivel: la única superficie de comandos que usa la UI.
//!
//! Compone store, flujo guiado, orquestador de captura y coordinador de envío.
//! Todos los métodos toman `&self`: el estado vive detrás de un mutex que
//! nunca se retiene durante un `.await`, de modo que dos comandos solapados
//! son posibles y el segundo se rechaza con `Busy` en lugar de intercalarse.
use std::sync::Arc;

use idflow_domain::{BatchResponse, BatchStatusReport, CapturedItem, DocumentType, ItemIdentity};
use log::info;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::batch::BatchCoordinator;
use crate::capture::CaptureOrchestrator;
use crate::errors::FlowError;
use crate::event::{EventStore, FlowEvent, FlowEventKind};
use crate::flow::{can_execute, default_steps, FlowStep, GuidedFlow, StepId};
use crate::gate::OperationGate;
use crate::providers::{BatchProvider, CaptureProvider, PermissionProvider};
use crate::session::SessionState;

/// Vista de sólo lectura del estado entre comandos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub items: Vec<CapturedItem>,
    pub flow: Option<GuidedFlow>,
    pub is_guided_flow_active: bool,
    pub last_batch_response: Option<BatchResponse>,
    pub busy: bool,
    pub current_operation_label: Option<String>,
    pub is_flow_completed: bool,
}

/// Resultado de ejecutar el paso actual del flujo guiado.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Captured(CapturedItem),
    Submitted(BatchResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub provider: String,
    pub bridge: String,
    pub camera_permission: bool,
}

pub struct VerificationController {
    session: Mutex<SessionState>,
    gate: OperationGate,
    orchestrator: CaptureOrchestrator,
    coordinator: BatchCoordinator,
    steps: Vec<FlowStep>,
}

impl VerificationController {
    pub fn new(permissions: Arc<dyn PermissionProvider>, capture: Arc<dyn CaptureProvider>, backend: Arc<dyn BatchProvider>) -> Self {
        let gate = OperationGate::new();
        Self { session: Mutex::new(SessionState::default()),
               orchestrator: CaptureOrchestrator::new(permissions, capture, gate.clone()),
               coordinator: BatchCoordinator::new(backend, gate.clone()),
               gate,
               steps: default_steps() }
    }

    /// Reemplaza la secuencia de pasos usada por `start_flow`.
    pub fn with_steps(mut self, steps: Vec<FlowStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_event_store(self, events: Box<dyn EventStore>) -> Self {
        Self { session: Mutex::new(SessionState::new(events)), ..self }
    }

    pub fn session_id(&self) -> Uuid {
        self.session.lock().session_id()
    }

    /// Vacía la colección y crea un flujo nuevo en el índice 0.
    pub fn start_flow(&self) -> Result<GuidedFlow, FlowError> {
        self.gate.ensure_idle()?;
        let mut state = self.session.lock();
        state.clear_items();
        state.last_batch_response = None;
        state.flow_completed = false;
        let flow = GuidedFlow::new(self.steps.clone());
        state.flow = Some(flow.clone());
        state.record(FlowEventKind::FlowStarted { step_count: flow.len() });
        info!("controller:start_flow session={} steps={}", state.session_id(), flow.len());
        Ok(flow)
    }

    pub fn cancel_flow(&self) -> Result<(), FlowError> {
        self.gate.ensure_idle()?;
        self.session.lock().cancel_flow();
        Ok(())
    }

    pub async fn capture_selfie(&self) -> Result<CapturedItem, FlowError> {
        self.orchestrator.capture(&self.session, ItemIdentity::Selfie).await
    }

    pub async fn capture_document(&self, document_type: DocumentType) -> Result<CapturedItem, FlowError> {
        self.orchestrator.capture(&self.session, ItemIdentity::Document(document_type)).await
    }

    pub async fn submit_batch(&self) -> Result<BatchResponse, FlowError> {
        self.coordinator.submit(&self.session).await
    }

    pub async fn check_batch_status(&self, batch_id: &str) -> Result<Option<BatchStatusReport>, FlowError> {
        self.coordinator.check_status(batch_id).await
    }

    /// Ejecuta la acción del paso actual: captura para los pasos de captura,
    /// envío para `Submit` (sólo con selfie, frente y reverso presentes).
    pub async fn execute_current_step(&self) -> Result<StepOutcome, FlowError> {
        self.gate.ensure_idle()?;
        let (step, ready) = {
            let state = self.session.lock();
            let step = state.flow()
                            .and_then(|f| f.current_step_id())
                            .ok_or_else(|| FlowError::validation("no active guided flow"))?;
            (step, state.store().has_all_required())
        };
        match step.capture_target() {
            Some(target) => Ok(StepOutcome::Captured(self.orchestrator.capture(&self.session, target).await?)),
            None if !ready => Err(FlowError::validation(self.missing_items_message())),
            None => Ok(StepOutcome::Submitted(self.submit_batch().await?)),
        }
    }

    fn missing_items_message(&self) -> String {
        let state = self.session.lock();
        let missing: Vec<&str> = [StepId::Selfie, StepId::DocumentFront, StepId::DocumentBack]
            .iter()
            .filter(|s| !s.is_complete(state.store().items(), None))
            .map(|s| s.as_str())
            .collect();
        format!("complete the previous steps before submitting (missing: {})", missing.join(", "))
    }

    pub fn remove_item(&self, item_id: &str) -> Result<Option<CapturedItem>, FlowError> {
        self.gate.ensure_idle()?;
        let mut state = self.session.lock();
        let removed = state.store.remove(item_id);
        if let Some(item) = removed.as_ref() {
            state.record(FlowEventKind::ItemRemoved { item_id: item.id.clone() });
        }
        Ok(removed)
    }

    /// Vacía la colección y cancela el flujo. No afecta al backend.
    pub fn clear_all(&self) -> Result<(), FlowError> {
        self.gate.ensure_idle()?;
        let mut state = self.session.lock();
        state.clear_items();
        state.cancel_flow();
        Ok(())
    }

    /// Confirmación del usuario tras un envío exitoso en el paso terminal:
    /// descarta colección y flujo.
    pub fn acknowledge_completion(&self) -> Result<(), FlowError> {
        self.gate.ensure_idle()?;
        let mut state = self.session.lock();
        if !state.flow_completed {
            return Err(FlowError::validation("guided flow has not been completed"));
        }
        state.clear_items();
        state.flow = None;
        state.flow_completed = false;
        state.record(FlowEventKind::CompletionAcknowledged);
        Ok(())
    }

    pub async fn open_settings(&self) {
        self.orchestrator.open_settings().await
    }

    pub async fn diagnostics(&self) -> Result<Diagnostics, FlowError> {
        let bridge = self.orchestrator.test_connection().await?;
        let camera_permission = self.orchestrator.check_camera_permission().await;
        Ok(Diagnostics { provider: self.orchestrator.provider_name(),
                         bridge,
                         camera_permission })
    }

    pub fn events_since(&self, from_seq: u64) -> Vec<FlowEvent> {
        self.session.lock().events_since(from_seq)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.session.lock();
        SessionSnapshot { items: state.store().items().to_vec(),
                          flow: state.flow().cloned(),
                          is_guided_flow_active: state.flow().is_some(),
                          last_batch_response: state.last_batch_response().cloned(),
                          busy: self.gate.is_busy(),
                          current_operation_label: self.gate.current_label(),
                          is_flow_completed: state.flow_completed }
    }

    pub fn can_execute_current_step(&self) -> bool {
        let state = self.session.lock();
        state.flow().is_some_and(|f| can_execute(f, state.store().items()))
    }

    pub fn is_current_step_completed(&self) -> bool {
        let state = self.session.lock();
        state.flow()
             .and_then(|f| f.current_step_id())
             .is_some_and(|s| s.is_complete(state.store().items(), state.last_batch_response()))
    }
}
