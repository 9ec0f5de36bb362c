//! Máquina de estados del flujo guiado.
//!
//! - `GuidedFlow`: valor inmutable (pasos + índice actual). Cada transición
//!   devuelve un valor nuevo.
//! - `StepId`: enumeración cerrada de pasos; los predicados de completitud y
//!   de avance son `match` sobre ella, así que añadir un paso se verifica en
//!   compilación.
//! - `check_and_advance`: avance con alcance (sólo el paso que disparó la
//!   acción puede avanzar).

pub mod machine;
pub mod step;

pub use machine::{default_steps, FlowStep, GuidedFlow};
pub use step::{can_execute, check_and_advance, StepId};
