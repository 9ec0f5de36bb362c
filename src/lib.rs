//! idflow Rust Library
//!
//! Capa de aplicación sobre `idflow-core`:
//! - `config`: configuración desde entorno / `.env`.
//! - `session`: sesión simulada que recorre el flujo guiado.
//! - `cli`: parsing de argumentos y códigos de salida del binario.

pub mod cli;
pub mod config;
pub mod session;
