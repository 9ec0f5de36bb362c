//! Entidades de captura: el artifact opaco que produce el SDK biométrico y el
//! `CapturedItem` que lo envuelve dentro de la sesión.
//!
//! La identidad de un item (`ItemIdentity`) es el par (tipo, subtipo de
//! documento). Es lo que usa el store para deduplicar: una selfie reemplaza a
//! la anterior, un `ID_FRONT` reemplaza al `ID_FRONT` previo, etc.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Tipo general del item capturado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Selfie,
    Document,
}

/// Enumeración cerrada de documentos soportados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// Frente del documento de identidad.
    IdFront,
    /// Reverso del documento de identidad.
    IdBack,
    /// Documento de registro fiscal (variante nacional).
    Cpf,
    /// Documento de registro general (variante nacional).
    Rg,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [DocumentType::IdFront, DocumentType::IdBack, DocumentType::Cpf, DocumentType::Rg];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::IdFront => "ID_FRONT",
            DocumentType::IdBack => "ID_BACK",
            DocumentType::Cpf => "CPF",
            DocumentType::Rg => "RG",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL.iter()
                         .copied()
                         .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
                         .ok_or_else(|| DomainError::ValidationError(format!("unknown document type '{s}'")))
    }
}

/// Estado de un item a lo largo del envío.
///
/// Transiciones válidas:
/// - `Captured` -> `Sending`
/// - `Sending` -> `Sent`
/// - `Sending` -> `Error`
/// - `Error` -> `Sending` (reintento explícito del usuario)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Captured,
    Sending,
    Sent,
    Error,
}

impl ItemStatus {
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        matches!((self, next),
                 (ItemStatus::Captured, ItemStatus::Sending)
                 | (ItemStatus::Sending, ItemStatus::Sent)
                 | (ItemStatus::Sending, ItemStatus::Error)
                 | (ItemStatus::Error, ItemStatus::Sending))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Captured => "captured",
            ItemStatus::Sending => "sending",
            ItemStatus::Sent => "sent",
            ItemStatus::Error => "error",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identidad de deduplicación de un item. También sirve como objetivo de una
/// captura: lo que se pide al SDK es exactamente lo que luego se inserta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "document_type", rename_all = "snake_case")]
pub enum ItemIdentity {
    Selfie,
    Document(DocumentType),
}

impl ItemIdentity {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemIdentity::Selfie => ItemKind::Selfie,
            ItemIdentity::Document(_) => ItemKind::Document,
        }
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        match self {
            ItemIdentity::Selfie => None,
            ItemIdentity::Document(d) => Some(*d),
        }
    }

    /// Clave estable usada en mapas por item (`SELFIE`, `ID_FRONT`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            ItemIdentity::Selfie => "SELFIE",
            ItemIdentity::Document(d) => d.as_str(),
        }
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ItemIdentity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("SELFIE") {
            return Ok(ItemIdentity::Selfie);
        }
        s.parse::<DocumentType>().map(ItemIdentity::Document)
    }
}

/// Payload opaco devuelto por el SDK de captura. El core nunca lo decodifica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureArtifact {
    pub raw_bytes_base64: String,
    pub encrypted_payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness: Option<bool>,
}

impl CaptureArtifact {
    pub fn new(raw_bytes_base64: impl Into<String>, encrypted_payload: impl Into<String>) -> Self {
        Self { raw_bytes_base64: raw_bytes_base64.into(),
               encrypted_payload: encrypted_payload.into(),
               confidence: None,
               liveness: None }
    }
}

/// Un artifact capturado dentro de la sesión.
///
/// El subtipo de documento existe si y sólo si el item es un documento: se
/// deriva de `identity`, por lo que no hay forma de construir un item
/// inconsistente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedItem {
    pub id: String,
    pub identity: ItemIdentity,
    pub artifact: CaptureArtifact,
    pub captured_at: DateTime<Utc>,
    pub status: ItemStatus,
}

impl CapturedItem {
    /// Crea un item recién capturado (`Captured`, id nuevo, timestamp actual).
    pub fn new(identity: ItemIdentity, artifact: CaptureArtifact) -> Self {
        let id = format!("{}_{}", identity.key().to_ascii_lowercase(), Uuid::new_v4().simple());
        Self { id,
               identity,
               artifact,
               captured_at: Utc::now(),
               status: ItemStatus::Captured }
    }

    pub fn selfie(artifact: CaptureArtifact) -> Self {
        Self::new(ItemIdentity::Selfie, artifact)
    }

    pub fn document(document_type: DocumentType, artifact: CaptureArtifact) -> Self {
        Self::new(ItemIdentity::Document(document_type), artifact)
    }

    pub fn kind(&self) -> ItemKind {
        self.identity.kind()
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        self.identity.document_type()
    }

    pub fn is_selfie(&self) -> bool {
        matches!(self.identity, ItemIdentity::Selfie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> CaptureArtifact {
        CaptureArtifact::new("aGVsbG8=", "enc")
    }

    #[test]
    fn document_type_parses_case_insensitive() {
        assert_eq!("id_front".parse::<DocumentType>().unwrap(), DocumentType::IdFront);
        assert_eq!(" RG ".parse::<DocumentType>().unwrap(), DocumentType::Rg);
        assert!("passport".parse::<DocumentType>().is_err());
    }

    #[test]
    fn identity_parses_selfie_and_documents() {
        assert_eq!("selfie".parse::<ItemIdentity>().unwrap(), ItemIdentity::Selfie);
        assert_eq!("ID_BACK".parse::<ItemIdentity>().unwrap(), ItemIdentity::Document(DocumentType::IdBack));
    }

    #[test]
    fn document_subtype_present_iff_document() {
        let s = CapturedItem::selfie(artifact());
        let d = CapturedItem::document(DocumentType::Cpf, artifact());
        assert_eq!(s.kind(), ItemKind::Selfie);
        assert_eq!(s.document_type(), None);
        assert_eq!(d.kind(), ItemKind::Document);
        assert_eq!(d.document_type(), Some(DocumentType::Cpf));
    }

    #[test]
    fn new_items_start_captured_with_unique_ids() {
        let a = CapturedItem::selfie(artifact());
        let b = CapturedItem::selfie(artifact());
        assert_eq!(a.status, ItemStatus::Captured);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("selfie_"));
    }

    #[test]
    fn status_transitions_are_forward_only() {
        assert!(ItemStatus::Captured.can_transition_to(ItemStatus::Sending));
        assert!(ItemStatus::Sending.can_transition_to(ItemStatus::Sent));
        assert!(ItemStatus::Sending.can_transition_to(ItemStatus::Error));
        assert!(ItemStatus::Error.can_transition_to(ItemStatus::Sending));
        assert!(!ItemStatus::Captured.can_transition_to(ItemStatus::Error));
        assert!(!ItemStatus::Sent.can_transition_to(ItemStatus::Sending));
    }

    #[test]
    fn identity_serializes_with_kind_tag() {
        let v = serde_json::to_value(ItemIdentity::Document(DocumentType::IdFront)).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "document", "document_type": "ID_FRONT"}));
        let v = serde_json::to_value(ItemIdentity::Selfie).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "selfie"}));
    }
}
