//! Estado vivo de una sesión de verificación.
//!
//! El controlador es el único dueño de este estado; orquestador y coordinador
//! lo reciben prestado sólo durante un comando y nunca guardan la referencia.
//! Cada mutación deja un evento en el `EventStore`.
use idflow_domain::{BatchResponse, CapturedItem, ItemIdentity, ItemStatus};
use log::{debug, info};
use uuid::Uuid;

use crate::event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
use crate::flow::{check_and_advance, GuidedFlow, StepId};
use crate::store::CapturedItemStore;

pub struct SessionState {
    pub(crate) session_id: Uuid,
    pub(crate) store: CapturedItemStore,
    pub(crate) flow: Option<GuidedFlow>,
    pub(crate) last_batch_response: Option<BatchResponse>,
    pub(crate) flow_completed: bool,
    events: Box<dyn EventStore>,
}

impl SessionState {
    pub fn new(events: Box<dyn EventStore>) -> Self {
        Self { session_id: Uuid::new_v4(),
               store: CapturedItemStore::new(),
               flow: None,
               last_batch_response: None,
               flow_completed: false,
               events }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn store(&self) -> &CapturedItemStore {
        &self.store
    }

    pub fn flow(&self) -> Option<&GuidedFlow> {
        self.flow.as_ref()
    }

    pub fn last_batch_response(&self) -> Option<&BatchResponse> {
        self.last_batch_response.as_ref()
    }

    pub(crate) fn record(&mut self, kind: FlowEventKind) -> FlowEvent {
        self.events.append_kind(self.session_id, kind)
    }

    pub(crate) fn events_since(&self, from_seq: u64) -> Vec<FlowEvent> {
        self.events.list_since(from_seq)
    }

    pub(crate) fn insert_item(&mut self, item: CapturedItem) {
        let item_id = item.id.clone();
        let identity = item.identity;
        let replaced = self.store.insert(item).map(|old| old.id);
        debug!("session:insert item={item_id} identity={identity} replaced={replaced:?}");
        self.record(FlowEventKind::ItemCaptured { item_id, identity, replaced });
    }

    pub(crate) fn set_all_status(&mut self, status: ItemStatus) {
        let count = self.store.set_all_status(status);
        self.record(FlowEventKind::ItemsStatusChanged { status, count });
    }

    pub(crate) fn clear_items(&mut self) {
        let count = self.store.clear();
        if count > 0 {
            self.record(FlowEventKind::ItemsCleared { count });
        }
    }

    /// Descarta el flujo activo (si lo hay).
    pub(crate) fn cancel_flow(&mut self) {
        self.flow_completed = false;
        if self.flow.take().is_some() {
            self.record(FlowEventKind::FlowCancelled);
        }
    }

    /// Avance con alcance tras la acción de `trigger_step`. Sin flujo activo
    /// es un no-op.
    pub(crate) fn try_advance(&mut self, trigger_step: StepId, trigger: Option<&ItemIdentity>) -> bool {
        let Some(flow) = self.flow.as_ref() else {
            return false;
        };
        let from = flow.current_index();
        match check_and_advance(flow, trigger_step, trigger, self.store.items(), self.last_batch_response.as_ref()) {
            Some(next) => {
                let to = next.current_index();
                info!("flow:advance session={} step={} {from}->{to}", self.session_id, trigger_step);
                self.flow = Some(next);
                self.record(FlowEventKind::StepAdvanced { from, to, step_id: trigger_step });
                true
            }
            None => false,
        }
    }

    /// Chequeo del paso terminal tras un envío exitoso: `Submit` no avanza,
    /// sólo se marca el flujo como completado.
    pub(crate) fn check_terminal_step(&mut self) -> bool {
        let Some(flow) = self.flow.as_ref() else {
            return false;
        };
        let on_submit = flow.current_step_id() == Some(StepId::Submit);
        if on_submit && !self.flow_completed && StepId::Submit.is_complete(self.store.items(), self.last_batch_response.as_ref()) {
            self.flow_completed = true;
            let batch_id = self.last_batch_response.as_ref().and_then(|r| r.batch_id.clone());
            info!("flow:completed session={} batch={batch_id:?}", self.session_id);
            self.record(FlowEventKind::FlowCompleted { batch_id });
            return true;
        }
        false
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Box::new(InMemoryEventStore::default()))
    }
}
