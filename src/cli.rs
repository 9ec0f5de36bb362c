//! Parsing mínimo de argumentos del binario `idflow` y códigos de salida.
//!
//! Uso:
//! - `idflow guided [--deny-camera] [--cancel-at selfie|front|back] [--backend-down]`
//! - `idflow status --batch <ID>`
//! - `idflow diagnostics`
use idflow_core::{FlowError, StepId};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::session::SimulationOptions;

pub const USAGE: &str = "Uso: idflow guided [--deny-camera] [--cancel-at selfie|front|back] [--backend-down]\n     idflow status --batch <ID>\n     idflow diagnostics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Guided(SimulationOptions),
    Status { batch_id: String },
    Diagnostics,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),
    #[error("{0}")]
    Flow(#[from] FlowError),
    #[error("no hay información para el lote {0}")]
    NotFound(String),
    #[error("error de salida: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// 2 = uso, 4 = rechazo del flujo o del backend, 5 = error interno.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Flow(_) | CliError::NotFound(_) => 4,
            CliError::Output(_) => 5,
        }
    }
}

fn parse_cancel_step(value: &str) -> Result<StepId, CliError> {
    match value {
        "selfie" => Ok(StepId::Selfie),
        "front" => Ok(StepId::DocumentFront),
        "back" => Ok(StepId::DocumentBack),
        other => Err(CliError::Usage(format!("--cancel-at inválido: {other}"))),
    }
}

/// Filtro de logs a partir de `RUST_LOG`; sin valor (o inválido) queda en `warn`.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives.and_then(|d| EnvFilter::try_new(d).ok())
              .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// `args` sin el nombre del binario.
pub fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(CliError::Usage("falta el comando".into()));
    };
    match command.as_str() {
        "guided" => {
            let mut options = SimulationOptions::default();
            let mut i = 0;
            while i < rest.len() {
                match rest[i].as_str() {
                    "--deny-camera" => options.deny_camera = true,
                    "--backend-down" => options.backend_down = true,
                    "--cancel-at" => {
                        i += 1;
                        let value = rest.get(i).ok_or_else(|| CliError::Usage("--cancel-at requiere un valor".into()))?;
                        options.cancel_at = Some(parse_cancel_step(value)?);
                    }
                    other => return Err(CliError::Usage(format!("opción desconocida: {other}"))),
                }
                i += 1;
            }
            Ok(Command::Guided(options))
        }
        "status" => match rest {
            [flag, id] if flag == "--batch" => Ok(Command::Status { batch_id: id.clone() }),
            _ => Err(CliError::Usage("status requiere --batch <ID>".into())),
        },
        "diagnostics" => Ok(Command::Diagnostics),
        other => Err(CliError::Usage(format!("comando desconocido: {other}"))),
    }
}
