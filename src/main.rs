use idflow_rust::cli::{log_filter, parse_args, CliError, Command};
use idflow_rust::config::{init_dotenv, CONFIG};
use idflow_rust::session::SimulatedSession;

async fn run(command: Command) -> Result<i32, CliError> {
    match command {
        Command::Guided(options) => {
            let session = SimulatedSession::new(&CONFIG, options);
            let report = session.run_guided().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.error.is_some() { 4 } else { 0 })
        }
        Command::Status { batch_id } => {
            let session = SimulatedSession::new(&CONFIG, Default::default());
            match session.batch_status(&batch_id).await? {
                Some(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(0)
                }
                None => Err(CliError::NotFound(batch_id)),
            }
        }
        Command::Diagnostics => {
            let session = SimulatedSession::new(&CONFIG, Default::default());
            let diagnostics = session.diagnostics().await?;
            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
            Ok(0)
        }
    }
}

#[tokio::main]
async fn main() {
    // Cargar .env si existe (RUST_LOG incluido)
    init_dotenv();
    let rust_log = std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt().with_env_filter(log_filter(rust_log.as_deref()))
                             .with_writer(std::io::stderr)
                             .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match parse_args(&args) {
        Ok(command) => match run(command).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("[idflow] {e}");
                e.exit_code()
            }
        },
        Err(e) => {
            eprintln!("[idflow] {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
