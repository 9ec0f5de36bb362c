//! Tipos del envío en lote hacia el backend de verificación.
//!
//! - `BatchResponse`: resultado terminal de un envío.
//! - `BatchStatusReport`: consulta informativa posterior (no altera estado).
//! - `BatchSubmission`: payload neutro que un backend puede serializar; el
//!   core no lo construye, lo hace el proveedor de backend.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::item::{CapturedItem, DocumentType, ItemIdentity};

/// Estado reportado por el backend para un item concreto del lote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedItem {
    pub process_id: String,
    pub status: String,
}

/// Resultado terminal de un envío en lote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub message: String,
    /// Clave: `ItemIdentity::key()` (`SELFIE`, `ID_FRONT`, ...). Mantiene el
    /// orden de los items enviados.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_item_status: Option<IndexMap<String, ProcessedItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    pub fn accepted(batch_id: impl Into<String>, message: impl Into<String>, per_item_status: IndexMap<String, ProcessedItem>) -> Self {
        Self { success: true,
               batch_id: Some(batch_id.into()),
               message: message.into(),
               per_item_status: Some(per_item_status),
               error: None }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self { success: false,
               batch_id: None,
               message: message.into(),
               per_item_status: None,
               error }
    }

    pub fn item_status(&self, identity: &ItemIdentity) -> Option<&ProcessedItem> {
        self.per_item_status.as_ref().and_then(|m| m.get(identity.key()))
    }
}

/// Reporte de estado de un lote, tal como lo entrega el backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatusReport {
    pub batch_id: String,
    pub overall_status: String,
    /// Resultados por item en formato libre; el core no los interpreta.
    pub details: Value,
    pub checked_at: DateTime<Utc>,
}

/// Datos del usuario que acompañan al envío.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub cpf: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedSelfie {
    pub encrypted: String,
    pub base64: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedDocument {
    pub document_type: DocumentType,
    pub encrypted: String,
    pub base64: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCaptures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selfie: Option<SubmittedSelfie>,
    pub documents: Vec<SubmittedDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub submission_timestamp: DateTime<Utc>,
    pub device_info: String,
    pub platform: String,
    pub total_items: usize,
}

/// Payload completo de un envío en lote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSubmission {
    pub user: UserProfile,
    pub captures: SubmissionCaptures,
    pub metadata: SubmissionMetadata,
}

impl BatchSubmission {
    /// Agrupa los items en selfie + documentos. Requiere exactamente lo mismo
    /// que el coordinador: al menos un item y una selfie.
    pub fn from_items(user: UserProfile, items: &[CapturedItem], platform: &str, device_info: &str) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::ValidationError("no items to submit".into()));
        }
        let selfie = items.iter()
                          .find(|i| i.is_selfie())
                          .map(|i| SubmittedSelfie { encrypted: i.artifact.encrypted_payload.clone(),
                                                     base64: i.artifact.raw_bytes_base64.clone(),
                                                     timestamp: i.captured_at })
                          .ok_or_else(|| DomainError::ValidationError("a selfie is required".into()))?;
        let documents = items.iter()
                             .filter_map(|i| {
                                 i.document_type().map(|document_type| SubmittedDocument { document_type,
                                                                                            encrypted: i.artifact.encrypted_payload.clone(),
                                                                                            base64: i.artifact.raw_bytes_base64.clone(),
                                                                                            timestamp: i.captured_at })
                             })
                             .collect();
        Ok(Self { user,
                  captures: SubmissionCaptures { selfie: Some(selfie), documents },
                  metadata: SubmissionMetadata { submission_timestamp: Utc::now(),
                                                 device_info: device_info.to_string(),
                                                 platform: platform.to_string(),
                                                 total_items: items.len() } })
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        Ok(serde_json::to_string(self)?)
    }
}
