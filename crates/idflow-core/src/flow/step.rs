use std::fmt;

use idflow_domain::{BatchResponse, CapturedItem, DocumentType, ItemIdentity};
use serde::{Deserialize, Serialize};

use super::machine::GuidedFlow;

/// Pasos conocidos del flujo guiado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Selfie,
    DocumentFront,
    DocumentBack,
    Submit,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Selfie => "selfie",
            StepId::DocumentFront => "document_front",
            StepId::DocumentBack => "document_back",
            StepId::Submit => "submit",
        }
    }

    /// Paso cuya acción es capturar `identity`, si existe.
    pub fn for_identity(identity: &ItemIdentity) -> Option<StepId> {
        match identity {
            ItemIdentity::Selfie => Some(StepId::Selfie),
            ItemIdentity::Document(DocumentType::IdFront) => Some(StepId::DocumentFront),
            ItemIdentity::Document(DocumentType::IdBack) => Some(StepId::DocumentBack),
            ItemIdentity::Document(DocumentType::Cpf | DocumentType::Rg) => None,
        }
    }

    /// Qué captura ejecuta este paso. `Submit` no captura nada.
    pub fn capture_target(&self) -> Option<ItemIdentity> {
        match self {
            StepId::Selfie => Some(ItemIdentity::Selfie),
            StepId::DocumentFront => Some(ItemIdentity::Document(DocumentType::IdFront)),
            StepId::DocumentBack => Some(ItemIdentity::Document(DocumentType::IdBack)),
            StepId::Submit => None,
        }
    }

    /// Predicado de completitud del paso.
    pub fn is_complete(&self, items: &[CapturedItem], last_response: Option<&BatchResponse>) -> bool {
        let has = |identity: ItemIdentity| items.iter().any(|i| i.identity == identity);
        match self {
            StepId::Selfie => has(ItemIdentity::Selfie),
            StepId::DocumentFront => has(ItemIdentity::Document(DocumentType::IdFront)),
            StepId::DocumentBack => has(ItemIdentity::Document(DocumentType::IdBack)),
            StepId::Submit => last_response.is_some_and(|r| r.success),
        }
    }

    /// Compuerta de avance: sólo la acción propia del paso puede hacerlo
    /// avanzar. `Submit` nunca avanza (no hay paso siguiente).
    pub fn accepts(&self, trigger: Option<&ItemIdentity>) -> bool {
        match self {
            StepId::Selfie => trigger == Some(&ItemIdentity::Selfie),
            StepId::DocumentFront => trigger == Some(&ItemIdentity::Document(DocumentType::IdFront)),
            StepId::DocumentBack => trigger == Some(&ItemIdentity::Document(DocumentType::IdBack)),
            StepId::Submit => false,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Avance con alcance: evalúa únicamente `trigger_step`. Devuelve el flujo
/// avanzado, o `None` si el paso actual no es `trigger_step`, la compuerta no
/// acepta el disparador o el paso no está completo.
pub fn check_and_advance(flow: &GuidedFlow,
                         trigger_step: StepId,
                         trigger: Option<&ItemIdentity>,
                         items: &[CapturedItem],
                         last_response: Option<&BatchResponse>)
                         -> Option<GuidedFlow> {
    if flow.current_step_id() != Some(trigger_step) {
        return None;
    }
    if !trigger_step.accepts(trigger) {
        return None;
    }
    if !trigger_step.is_complete(items, last_response) {
        return None;
    }
    Some(flow.advance())
}

/// Si el usuario puede ejecutar el paso actual. Para `Submit` exige selfie,
/// frente y reverso; el resto de pasos siempre es ejecutable.
pub fn can_execute(flow: &GuidedFlow, items: &[CapturedItem]) -> bool {
    match flow.current_step_id() {
        None => false,
        Some(StepId::Submit) => {
            [StepId::Selfie, StepId::DocumentFront, StepId::DocumentBack].iter().all(|s| s.is_complete(items, None))
        }
        Some(_) => true,
    }
}
