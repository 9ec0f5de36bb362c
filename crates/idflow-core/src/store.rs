//! Colección deduplicada de items capturados.
//!
//! Invariante: como máximo una selfie y como máximo un item por
//! `DocumentType`. Insertar un item con la misma identidad reemplaza al
//! anterior (last-write-wins), nunca se acumula.
use idflow_domain::{CapturedItem, DocumentType, ItemIdentity, ItemStatus};
use log::warn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedItemStore {
    items: Vec<CapturedItem>,
}

impl CapturedItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta `item`, retirando antes el item con la misma identidad.
    /// Devuelve el item reemplazado, si existía.
    pub fn insert(&mut self, item: CapturedItem) -> Option<CapturedItem> {
        let replaced = self.items
                           .iter()
                           .position(|i| i.identity == item.identity)
                           .map(|pos| self.items.remove(pos));
        self.items.push(item);
        replaced
    }

    /// Elimina por id; no-op si no existe.
    pub fn remove(&mut self, id: &str) -> Option<CapturedItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Transición masiva de estado. Devuelve cuántos items se tocaron.
    pub fn set_all_status(&mut self, status: ItemStatus) -> usize {
        for item in self.items.iter_mut() {
            if item.status != status && !item.status.can_transition_to(status) {
                warn!("store:set_all_status non-forward transition item={} from={} to={}", item.id, item.status, status);
            }
            item.status = status;
        }
        self.items.len()
    }

    pub fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    pub fn has_selfie(&self) -> bool {
        self.items.iter().any(|i| i.is_selfie())
    }

    pub fn has_document(&self, document_type: DocumentType) -> bool {
        self.contains(&ItemIdentity::Document(document_type))
    }

    pub fn contains(&self, identity: &ItemIdentity) -> bool {
        self.items.iter().any(|i| &i.identity == identity)
    }

    /// Selfie + frente + reverso del documento: lo necesario para el paso final.
    pub fn has_all_required(&self) -> bool {
        self.has_selfie() && self.has_document(DocumentType::IdFront) && self.has_document(DocumentType::IdBack)
    }

    pub fn get(&self, id: &str) -> Option<&CapturedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn items(&self) -> &[CapturedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
