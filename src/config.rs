//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone una estructura
//! inmutable (`CONFIG`). Todas las variables son opcionales: un valor ausente
//! o mal formado cae al default, nunca aborta.
use std::env;
use std::str::FromStr;

use idflow_domain::UserProfile;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
});

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Datos del usuario que acompañan cada envío.
    pub user: UserProfile,
    pub device: DeviceConfig,
}

/// Parámetros del backend de verificación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    /// Latencia simulada del envío en lote (ms).
    pub submit_latency_ms: u64,
    /// Latencia simulada de la consulta de estado (ms).
    pub status_latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub platform: String,
    pub device_info: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).ok()
                 .map(|v| v.trim().to_string())
                 .filter(|v| !v.is_empty())
                 .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self { backend: BackendConfig { url: var_or("IDFLOW_BACKEND_URL", "http://localhost:8080/api/verification"),
                                        submit_latency_ms: parse_or("IDFLOW_SUBMIT_LATENCY_MS", 300),
                                        status_latency_ms: parse_or("IDFLOW_STATUS_LATENCY_MS", 100) },
               user: UserProfile { cpf: var_or("IDFLOW_USER_CPF", "00000000000"),
                                   name: var_or("IDFLOW_USER_NAME", "Demo User"),
                                   email: var_or("IDFLOW_USER_EMAIL", "demo@example.com"),
                                   phone: var_or("IDFLOW_USER_PHONE", "+55 00 00000-0000") },
               device: DeviceConfig { platform: var_or("IDFLOW_PLATFORM", env::consts::OS),
                                      device_info: var_or("IDFLOW_DEVICE_INFO", "idflow-cli") } }
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Forzar carga temprana de .env desde el binario si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
