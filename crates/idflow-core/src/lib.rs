//! idflow-core: orquestación de la verificación de identidad (captura guiada + envío en lote)
pub mod batch;
pub mod capture;
pub mod controller;
pub mod errors;
pub mod event;
pub mod flow;
pub mod gate;
pub mod providers;
pub mod session;
pub mod store;

pub use batch::{validate_submission, BatchCoordinator};
pub use capture::CaptureOrchestrator;
pub use controller::{Diagnostics, SessionSnapshot, StepOutcome, VerificationController};
pub use errors::{ErrorKind, FlowError};
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use flow::{can_execute, check_and_advance, default_steps, FlowStep, GuidedFlow, StepId};
pub use gate::{Operation, OperationGate, OperationPermit, PendingOperation};
pub use providers::{BackendError, BatchProvider, CaptureFailure, CaptureProvider, PermissionProvider};
pub use session::SessionState;
pub use store::CapturedItemStore;
