//! idflow-adapters: implementaciones simuladas de los colaboradores externos
//! (permisos, SDK de captura, backend) para la CLI y los tests.
pub mod backend;
pub mod capture;
pub mod permissions;

pub use backend::{BackendMode, SimulatedBatchProvider};
pub use capture::SimulatedCaptureProvider;
pub use permissions::StaticPermissionProvider;
