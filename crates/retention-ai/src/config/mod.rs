use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::engine::normalizer::DEFAULT_FILLER_RECOMMENDATIONS;

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
    pub engine: EngineConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig::from_env()?,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const DEFAULT_GENERATIVE_TIMEOUT_MS: u64 = 15_000;

/// Knobs for the risk assessment engine.
///
/// When `endpoint_url` is absent every assessment fast-fails the generative
/// path and runs the heuristic scorer instead.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub filler_recommendations: Vec<String>,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint_url = env::var("GENERATIVE_ENDPOINT_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let api_key = env::var("GENERATIVE_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let timeout_ms = match env::var("GENERATIVE_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidTimeout { value: raw })?,
            Err(_) => DEFAULT_GENERATIVE_TIMEOUT_MS,
        };

        let filler_recommendations = match env::var("HEURISTIC_FILLER_RECOMMENDATIONS") {
            Ok(raw) => {
                let entries: Vec<String> = raw
                    .split('|')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect();
                // Fewer than three filler entries cannot uphold the
                // 3-recommendation floor on sparse heuristic output.
                if entries.len() < 3 {
                    return Err(ConfigError::FillerListTooShort {
                        found: entries.len(),
                    });
                }
                entries
            }
            Err(_) => DEFAULT_FILLER_RECOMMENDATIONS
                .iter()
                .map(|entry| entry.to_string())
                .collect(),
        };

        Ok(Self {
            endpoint_url,
            api_key,
            timeout_ms,
            filler_recommendations,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            api_key: None,
            timeout_ms: DEFAULT_GENERATIVE_TIMEOUT_MS,
            filler_recommendations: DEFAULT_FILLER_RECOMMENDATIONS
                .iter()
                .map(|entry| entry.to_string())
                .collect(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout { value: String },
    FillerListTooShort { found: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout { value } => {
                write!(
                    f,
                    "GENERATIVE_TIMEOUT_MS must be a positive integer, got '{value}'"
                )
            }
            ConfigError::FillerListTooShort { found } => {
                write!(
                    f,
                    "HEURISTIC_FILLER_RECOMMENDATIONS needs at least 3 '|'-separated entries, found {found}"
                )
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("GENERATIVE_ENDPOINT_URL");
        env::remove_var("GENERATIVE_API_KEY");
        env::remove_var("GENERATIVE_TIMEOUT_MS");
        env::remove_var("HEURISTIC_FILLER_RECOMMENDATIONS");
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
        assert!(config.engine.endpoint_url.is_none());
        assert_eq!(config.engine.timeout_ms, DEFAULT_GENERATIVE_TIMEOUT_MS);
        assert_eq!(config.engine.filler_recommendations.len(), 3);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn filler_override_is_split_on_pipes() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var(
            "HEURISTIC_FILLER_RECOMMENDATIONS",
            "Join a study group | Meet your mentor weekly | Use campus tutoring",
        );
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.engine.filler_recommendations,
            vec![
                "Join a study group".to_string(),
                "Meet your mentor weekly".to_string(),
                "Use campus tutoring".to_string(),
            ]
        );
    }

    #[test]
    fn short_filler_override_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HEURISTIC_FILLER_RECOMMENDATIONS", "Only one entry");
        let error = AppConfig::load().expect_err("short filler list rejected");
        assert!(matches!(error, ConfigError::FillerListTooShort { found: 1 }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GENERATIVE_TIMEOUT_MS", "0");
        let error = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(error, ConfigError::InvalidTimeout { .. }));
    }
}
