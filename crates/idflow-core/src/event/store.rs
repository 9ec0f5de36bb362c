use chrono::Utc;
use uuid::Uuid;

use super::{FlowEvent, FlowEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore: Send {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, session_id: Uuid, kind: FlowEventKind) -> FlowEvent;
    /// Lista todos los eventos (orden ascendente por seq).
    fn list(&self) -> Vec<FlowEvent>;
    /// Eventos con `seq >= from_seq`.
    fn list_since(&self, from_seq: u64) -> Vec<FlowEvent> {
        self.list().into_iter().filter(|e| e.seq >= from_seq).collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: Vec<FlowEvent>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, session_id: Uuid, kind: FlowEventKind) -> FlowEvent {
        let seq = self.inner.len() as u64;
        let ev = FlowEvent { seq, session_id, kind, ts: Utc::now() };
        self.inner.push(ev.clone());
        ev
    }
    fn list(&self) -> Vec<FlowEvent> { self.inner.clone() }
    fn list_since(&self, from_seq: u64) -> Vec<FlowEvent> {
        self.inner.iter().skip(from_seq as usize).cloned().collect()
    }
}
