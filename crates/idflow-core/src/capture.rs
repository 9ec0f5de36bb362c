//! Orquestador de captura: permiso → captura nativa → inserción → avance.
//!
//! La captura nativa es el único punto de suspensión y queda protegida por la
//! compuerta de operación: una segunda captura mientras otra está pendiente
//! se rechaza con `Busy`, no se encola.
use std::sync::Arc;

use idflow_domain::{CaptureArtifact, CapturedItem, ItemIdentity};
use log::{info, warn};
use parking_lot::Mutex;

use crate::errors::FlowError;
use crate::event::FlowEventKind;
use crate::flow::StepId;
use crate::gate::{Operation, OperationGate};
use crate::providers::{CaptureProvider, PermissionProvider};
use crate::session::SessionState;

pub struct CaptureOrchestrator {
    permissions: Arc<dyn PermissionProvider>,
    capture: Arc<dyn CaptureProvider>,
    gate: OperationGate,
}

impl CaptureOrchestrator {
    pub fn new(permissions: Arc<dyn PermissionProvider>, capture: Arc<dyn CaptureProvider>, gate: OperationGate) -> Self {
        Self { permissions, capture, gate }
    }

    /// Verifica el permiso de cámara y, si falta, lo solicita una vez.
    pub async fn ensure_camera_permission(&self) -> bool {
        if self.permissions.check_camera_permission().await {
            return true;
        }
        self.permissions.request_camera_permission().await
    }

    /// Ejecuta una captura completa de `target` sobre la sesión.
    ///
    /// En cualquier fallo no se inserta nada; el fallo queda registrado como
    /// evento `CaptureFailed` (salvo `Busy`, que no llega a iniciar nada).
    pub async fn capture(&self, session: &Mutex<SessionState>, target: ItemIdentity) -> Result<CapturedItem, FlowError> {
        let operation = Operation::capture(target);
        let permit = self.gate.try_acquire(operation)?;
        info!("capture:start target={target} request={}", permit.request_id());

        let outcome = self.acquire_artifact(target).await;

        let mut state = session.lock();
        let artifact = match outcome {
            Ok(artifact) => artifact,
            Err(error) => {
                warn!("capture:failed target={target} error={error}");
                state.record(FlowEventKind::CaptureFailed { operation: operation.label(), error: error.clone() });
                return Err(error);
            }
        };
        let item = CapturedItem::new(target, artifact);
        state.insert_item(item.clone());
        if let Some(step) = StepId::for_identity(&target) {
            state.try_advance(step, Some(&target));
        }
        info!("capture:done target={target} item={}", item.id);
        Ok(item)
    }

    async fn acquire_artifact(&self, target: ItemIdentity) -> Result<CaptureArtifact, FlowError> {
        if !self.ensure_camera_permission().await {
            return Err(FlowError::PermissionDenied);
        }
        let artifact = match target {
            ItemIdentity::Selfie => self.capture.capture_selfie().await?,
            ItemIdentity::Document(document_type) => self.capture.capture_document(document_type).await?,
        };
        Ok(artifact)
    }

    /// Prueba del puente con el módulo nativo (diagnóstico).
    pub async fn test_connection(&self) -> Result<String, FlowError> {
        let _permit = self.gate.try_acquire(Operation::Diagnostics)?;
        Ok(self.capture.test_connection().await?)
    }

    pub async fn check_camera_permission(&self) -> bool {
        self.permissions.check_camera_permission().await
    }

    pub async fn open_settings(&self) {
        self.permissions.open_settings().await
    }

    pub fn provider_name(&self) -> String {
        format!("{} {}", self.capture.get_name(), self.capture.get_version())
    }
}
