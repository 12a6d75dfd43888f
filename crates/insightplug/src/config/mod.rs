use crate::limiter::LimiterConfig;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub limiter: LimiterSettings,
    pub advisor: AdvisorConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match optional_var("APP_LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Compact,
        };

        let defaults = LimiterConfig::default();
        let limiter = LimiterSettings {
            limits: LimiterConfig {
                max_per_window: parse_var("CHAT_MAX_PER_WINDOW", defaults.max_per_window)?,
                window_duration_ms: parse_var("CHAT_WINDOW_MS", defaults.window_duration_ms)?,
                max_lifetime: parse_var("CHAT_MAX_LIFETIME", defaults.max_lifetime)?,
            },
            state_dir: optional_var("CHAT_LIMITER_STATE_DIR").map(PathBuf::from),
        };

        let advisor = AdvisorConfig::from_env()?;

        let catalog = CatalogConfig {
            regions_csv: optional_var("CATALOG_REGIONS_CSV").map(PathBuf::from),
            ev_models_csv: optional_var("CATALOG_EV_MODELS_CSV").map(PathBuf::from),
            electricity_csv: optional_var("CATALOG_ELECTRICITY_CSV").map(PathBuf::from),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            limiter,
            advisor,
            catalog,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Chat limiter quotas plus where its state lives.
#[derive(Debug, Clone)]
pub struct LimiterSettings {
    pub limits: LimiterConfig,
    /// Directory for durable per-key state; in-memory when unset.
    pub state_dir: Option<PathBuf>,
}

/// Optional CSV files replacing the built-in reference tables.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub regions_csv: Option<PathBuf>,
    pub ev_models_csv: Option<PathBuf>,
    pub electricity_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorProvider {
    Local,
    OpenAi,
    Gemini,
}

impl AdvisorProvider {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

impl FromStr for AdvisorProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "offline" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// API credential whose `Debug` output never reveals the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Remote chat provider selection and credentials.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub provider: AdvisorProvider,
    pub openai_api_key: Option<ApiKey>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub gemini_api_key: Option<ApiKey>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            provider: AdvisorProvider::Local,
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-3-flash-preview".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl AdvisorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let openai_api_key = optional_var("OPENAI_API_KEY").map(ApiKey::new);
        let gemini_api_key = optional_var("GEMINI_API_KEY").map(ApiKey::new);

        let provider = match optional_var("ADVISOR_PROVIDER") {
            Some(raw) => raw.parse::<AdvisorProvider>()?,
            None if openai_api_key.is_some() => AdvisorProvider::OpenAi,
            None if gemini_api_key.is_some() => AdvisorProvider::Gemini,
            None => AdvisorProvider::Local,
        };

        match provider {
            AdvisorProvider::OpenAi if openai_api_key.is_none() => {
                return Err(ConfigError::MissingApiKey {
                    var: "OPENAI_API_KEY",
                })
            }
            AdvisorProvider::Gemini if gemini_api_key.is_none() => {
                return Err(ConfigError::MissingApiKey {
                    var: "GEMINI_API_KEY",
                })
            }
            _ => {}
        }

        let timeout_secs = parse_var("ADVISOR_TIMEOUT_SECS", defaults.timeout.as_secs())?;

        Ok(Self {
            provider,
            openai_api_key,
            openai_model: optional_var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: optional_var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            gemini_api_key,
            gemini_model: optional_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: optional_var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var: name }),
        None => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
    UnknownProvider(String),
    MissingApiKey { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative integer")
            }
            ConfigError::UnknownProvider(value) => write!(
                f,
                "ADVISOR_PROVIDER '{value}' is not one of local, openai, gemini"
            ),
            ConfigError::MissingApiKey { var } => {
                write!(f, "{var} is required for the selected advisor provider")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "CHAT_MAX_PER_WINDOW",
            "CHAT_WINDOW_MS",
            "CHAT_MAX_LIFETIME",
            "CHAT_LIMITER_STATE_DIR",
            "ADVISOR_PROVIDER",
            "OPENAI_API_KEY",
            "OPENAI_MODEL",
            "OPENAI_BASE_URL",
            "GEMINI_API_KEY",
            "GEMINI_MODEL",
            "GEMINI_BASE_URL",
            "ADVISOR_TIMEOUT_SECS",
            "CATALOG_REGIONS_CSV",
            "CATALOG_EV_MODELS_CSV",
            "CATALOG_ELECTRICITY_CSV",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.limiter.limits.max_per_window, 6);
        assert_eq!(config.limiter.limits.window_duration_ms, 60_000);
        assert_eq!(config.limiter.limits.max_lifetime, 20);
        assert!(config.limiter.state_dir.is_none());
        assert_eq!(config.advisor.provider, AdvisorProvider::Local);
        assert!(config.catalog.regions_csv.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn limiter_quotas_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CHAT_MAX_PER_WINDOW", "3");
        env::set_var("CHAT_WINDOW_MS", "1000");
        env::set_var("CHAT_MAX_LIFETIME", "9");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.limiter.limits.max_per_window, 3);
        assert_eq!(config.limiter.limits.window_duration_ms, 1000);
        assert_eq!(config.limiter.limits.max_lifetime, 9);

        env::set_var("CHAT_WINDOW_MS", "soon");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { var }) => assert_eq!(var, "CHAT_WINDOW_MS"),
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn openai_key_selects_provider_and_stays_redacted() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("OPENAI_API_KEY", "sk-test-secret");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.advisor.provider, AdvisorProvider::OpenAi);
        let rendered = format!("{:?}", config.advisor);
        assert!(!rendered.contains("sk-test-secret"));
        reset_env();
    }

    #[test]
    fn explicit_provider_requires_its_key() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADVISOR_PROVIDER", "gemini");
        match AppConfig::load() {
            Err(ConfigError::MissingApiKey { var }) => assert_eq!(var, "GEMINI_API_KEY"),
            other => panic!("expected missing key, got {other:?}"),
        }

        env::set_var("ADVISOR_PROVIDER", "claude");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::UnknownProvider(_))
        ));
        reset_env();
    }
}
