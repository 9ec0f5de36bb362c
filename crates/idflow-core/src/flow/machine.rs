use serde::{Deserialize, Serialize};

use super::step::StepId;

/// Descriptor estático de un paso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    pub id: StepId,
    pub title: String,
    pub description: String,
}

impl FlowStep {
    pub fn new(id: StepId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { id,
               title: title.into(),
               description: description.into() }
    }
}

/// Secuencia canónica: selfie → frente → reverso → envío.
pub fn default_steps() -> Vec<FlowStep> {
    vec![FlowStep::new(StepId::Selfie, "Capture selfie", "First, take a selfie"),
         FlowStep::new(StepId::DocumentFront, "Document front", "Now capture the front of your ID"),
         FlowStep::new(StepId::DocumentBack, "Document back", "Finally, capture the back of your ID"),
         FlowStep::new(StepId::Submit, "Submit", "All set! Send everything for verification"),]
}

/// Flujo guiado: pasos ordenados + puntero al paso actual.
///
/// `current_index` siempre está en `[0, len)` cuando hay pasos. El último paso
/// es terminal respecto al avance: `advance()` no lo supera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidedFlow {
    steps: Vec<FlowStep>,
    current_index: usize,
}

impl GuidedFlow {
    pub fn new(steps: Vec<FlowStep>) -> Self {
        Self { steps, current_index: 0 }
    }

    pub fn with_default_steps() -> Self {
        Self::new(default_steps())
    }

    /// Siguiente paso; idempotente en el paso terminal.
    pub fn advance(&self) -> GuidedFlow {
        if self.current_index + 1 < self.steps.len() {
            Self { steps: self.steps.clone(),
                   current_index: self.current_index + 1 }
        } else {
            self.clone()
        }
    }

    pub fn reset(&self) -> GuidedFlow {
        Self::new(self.steps.clone())
    }

    pub fn current_step(&self) -> Option<&FlowStep> {
        self.steps.get(self.current_index)
    }

    pub fn current_step_id(&self) -> Option<StepId> {
        self.current_step().map(|s| s.id)
    }

    pub fn is_terminal(&self) -> bool {
        self.steps.len().checked_sub(1) == Some(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_the_default_sequence() {
        let flow = GuidedFlow::with_default_steps();
        assert_eq!(flow.current_step_id(), Some(StepId::Selfie));
        let flow = flow.advance().advance();
        assert_eq!(flow.current_index(), 2);
        assert_eq!(flow.current_step_id(), Some(StepId::DocumentBack));
        assert!(!flow.is_terminal());
        let flow = flow.advance();
        assert!(flow.is_terminal());
        assert_eq!(flow.current_step_id(), Some(StepId::Submit));
    }

    #[test]
    fn advance_is_idempotent_at_terminal() {
        let terminal = GuidedFlow::with_default_steps().advance().advance().advance();
        let once = terminal.advance();
        let twice = once.advance();
        assert_eq!(once.current_index(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn transitions_do_not_mutate_the_source_value() {
        let flow = GuidedFlow::with_default_steps();
        let next = flow.advance();
        assert_eq!(flow.current_index(), 0);
        assert_eq!(next.current_index(), 1);
    }

    #[test]
    fn reset_returns_to_first_step() {
        for n in 0..4 {
            let mut flow = GuidedFlow::with_default_steps();
            for _ in 0..n {
                flow = flow.advance();
            }
            let reset = flow.reset();
            assert_eq!(reset.current_index(), 0);
            assert_eq!(reset, GuidedFlow::with_default_steps());
        }
    }

    #[test]
    fn empty_flow_has_no_current_step() {
        let flow = GuidedFlow::new(vec![]);
        assert!(flow.current_step().is_none());
        assert!(!flow.is_terminal());
        assert_eq!(flow.advance(), flow);
        assert!(flow.is_empty());
    }
}
