//! Tipos de evento de la sesión y estructura `FlowEvent`.
//!
//! Rol en el flujo:
//! - Cada mutación del store o del flujo guiado emite un evento.
//! - La UI consume los eventos entre comandos (`events_since`) para mostrar
//!   avisos y refrescar su vista; el core no depende de ella.
use chrono::{DateTime, Utc};
use idflow_domain::{ItemIdentity, ItemStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FlowError;
use crate::flow::StepId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Flujo guiado creado en el índice 0 (colección vacía).
    FlowStarted { step_count: usize },
    /// Flujo cancelado explícitamente o vía `clear_all`.
    FlowCancelled,
    /// Item insertado. `replaced` es el id del item con la misma identidad que
    /// salió del store, si lo había.
    ItemCaptured {
        item_id: String,
        identity: ItemIdentity,
        replaced: Option<String>,
    },
    ItemRemoved { item_id: String },
    ItemsCleared { count: usize },
    ItemsStatusChanged { status: ItemStatus, count: usize },
    /// El flujo avanzó por la acción propia del paso `from`.
    StepAdvanced { from: usize, to: usize, step_id: StepId },
    CaptureFailed { operation: String, error: FlowError },
    BatchSubmitted { batch_id: Option<String>, message: String },
    BatchFailed { message: String },
    /// El paso de envío quedó completo (respuesta exitosa en `Submit`).
    FlowCompleted { batch_id: Option<String> },
    /// El usuario confirmó el cierre; colección y flujo se descartan.
    CompletionAcknowledged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub session_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>,
}
