//! Eventos de sesión y su almacenamiento append-only.
pub mod store;
pub mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{FlowEvent, FlowEventKind};
