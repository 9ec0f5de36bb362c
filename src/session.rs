//! Sesión simulada de punta a punta: arma un `VerificationController` con los
//! colaboradores simulados a partir de la configuración y recorre el flujo
//! guiado como lo haría la UI (ejecutar paso actual hasta completar o fallar).
use std::sync::Arc;
use std::time::Duration;

use idflow_adapters::{BackendMode, SimulatedBatchProvider, SimulatedCaptureProvider, StaticPermissionProvider};
use idflow_core::{CaptureFailure, Diagnostics, ErrorKind, FlowError, FlowEvent, SessionSnapshot, StepId, StepOutcome, VerificationController};
use idflow_domain::BatchStatusReport;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;

/// Variaciones del escenario simulado.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Permiso de cámara ausente y rechazado al solicitarlo.
    pub deny_camera: bool,
    /// El usuario cierra la cámara al llegar a este paso.
    pub cancel_at: Option<StepId>,
    /// El backend no responde.
    pub backend_down: bool,
}

/// Resultado serializable de una sesión guiada.
#[derive(Debug, Serialize)]
pub struct GuidedReport {
    pub session_id: Uuid,
    pub completed: bool,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    /// Estado del lote tras un envío exitoso.
    pub status_report: Option<BatchStatusReport>,
    pub snapshot: SessionSnapshot,
    pub events: Vec<FlowEvent>,
}

pub struct SimulatedSession {
    controller: VerificationController,
    capture: Arc<SimulatedCaptureProvider>,
    options: SimulationOptions,
}

impl SimulatedSession {
    pub fn new(config: &AppConfig, options: SimulationOptions) -> Self {
        let permissions = if options.deny_camera {
            StaticPermissionProvider::denied()
        } else {
            StaticPermissionProvider::granted()
        };
        let capture = Arc::new(SimulatedCaptureProvider::new());
        let mode = if options.backend_down {
            BackendMode::Unreachable(format!("{} unreachable", config.backend.url))
        } else {
            BackendMode::Accept
        };
        let latency = (Duration::from_millis(config.backend.submit_latency_ms), Duration::from_millis(config.backend.status_latency_ms));
        let backend = SimulatedBatchProvider::new(config.user.clone()).with_device(&config.device.platform, &config.device.device_info)
                                                                      .with_latency(latency.0, latency.1)
                                                                      .with_mode(mode);
        let controller = VerificationController::new(Arc::new(permissions), capture.clone(), Arc::new(backend));
        Self { controller, capture, options }
    }

    pub fn controller(&self) -> &VerificationController {
        &self.controller
    }

    /// Recorre el flujo guiado completo. Se detiene en el primer fallo; el
    /// fallo queda en el reporte, no se propaga.
    pub async fn run_guided(&self) -> Result<GuidedReport, FlowError> {
        let flow = self.controller.start_flow()?;
        info!(session = %self.controller.session_id(), steps = flow.len(), "guided session started");

        let mut failure: Option<FlowError> = None;
        let mut status_report = None;
        // Un intento por paso como máximo.
        for _ in 0..flow.len() {
            let Some(step) = self.controller.snapshot().flow.and_then(|f| f.current_step_id()) else {
                break;
            };
            if self.options.cancel_at == Some(step) {
                self.capture.push_failure(CaptureFailure::UserCancelled);
            }
            match self.controller.execute_current_step().await {
                Ok(StepOutcome::Captured(item)) => info!(step = %step, item = %item.id, "step captured"),
                Ok(StepOutcome::Submitted(response)) => {
                    info!(batch = ?response.batch_id, "batch submitted");
                    if let Some(batch_id) = response.batch_id.as_deref() {
                        status_report = self.controller.check_batch_status(batch_id).await?;
                    }
                    break;
                }
                Err(e) => {
                    warn!(step = %step, error = %e, "guided session stopped");
                    failure = Some(e);
                    break;
                }
            }
        }

        let snapshot = self.controller.snapshot();
        Ok(GuidedReport { session_id: self.controller.session_id(),
                          completed: snapshot.is_flow_completed,
                          error_kind: failure.as_ref().map(FlowError::kind),
                          error: failure.map(|e| e.to_string()),
                          status_report,
                          snapshot,
                          events: self.controller.events_since(0) })
    }

    pub async fn diagnostics(&self) -> Result<Diagnostics, FlowError> {
        self.controller.diagnostics().await
    }

    pub async fn batch_status(&self, batch_id: &str) -> Result<Option<BatchStatusReport>, FlowError> {
        self.controller.check_batch_status(batch_id).await
    }
}
