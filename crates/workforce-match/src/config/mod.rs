use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::matching::config::PhaseQuantityParseError;
use crate::workflows::matching::temporal::DayWindowParseError;
use crate::workflows::matching::{DayWindow, MatchingConfig, PhaseQuantityPolicy};

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
    pub matching: MatchingConfig,
    pub data: DataConfig,
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
            matching: load_matching()?,
            data: DataConfig {
                taxonomy_path: optional_path("MATCH_TAXONOMY_PATH"),
                snapshot_path: optional_path("MATCH_SNAPSHOT_PATH"),
            },
        })
    }
}

fn load_matching() -> Result<MatchingConfig, ConfigError> {
    let defaults = MatchingConfig::default();

    let supply_lookahead_days = match env::var("MATCH_SUPPLY_LOOKAHEAD_DAYS") {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map(i64::from)
            .map_err(|_| ConfigError::InvalidLookahead { value })?,
        Err(_) => defaults.supply_lookahead_days,
    };

    Ok(MatchingConfig {
        supply_lookahead_days,
        direct_window: window("MATCH_DIRECT_WINDOW", defaults.direct_window)?,
        phase_window: window("MATCH_PHASE_WINDOW", defaults.phase_window)?,
        phase_quantity: match env::var("MATCH_PHASE_QUANTITY") {
            Ok(value) => value
                .parse::<PhaseQuantityPolicy>()
                .map_err(|source| ConfigError::InvalidPhaseQuantity { source })?,
            Err(_) => defaults.phase_quantity,
        },
    })
}

fn window(variable: &'static str, default: DayWindow) -> Result<DayWindow, ConfigError> {
    match env::var(variable) {
        Ok(value) => value
            .parse()
            .map_err(|source| ConfigError::InvalidWindow { variable, source }),
        Err(_) => Ok(default),
    }
}

fn optional_path(variable: &str) -> Option<PathBuf> {
    env::var(variable)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
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

/// Optional data files replacing the built-in taxonomy and the empty workforce store.
#[derive(Debug, Clone, Default)]
pub struct DataConfig {
    pub taxonomy_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidLookahead {
        value: String,
    },
    InvalidWindow {
        variable: &'static str,
        source: DayWindowParseError,
    },
    InvalidPhaseQuantity {
        source: PhaseQuantityParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLookahead { value } => write!(
                f,
                "MATCH_SUPPLY_LOOKAHEAD_DAYS must be a non-negative whole number of days, found '{}'",
                value
            ),
            ConfigError::InvalidWindow { variable, source } => {
                write!(f, "{} is invalid: {}", variable, source)
            }
            ConfigError::InvalidPhaseQuantity { source } => {
                write!(f, "MATCH_PHASE_QUANTITY is invalid: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidLookahead { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidWindow { source, .. } => Some(source),
            ConfigError::InvalidPhaseQuantity { source } => Some(source),
        }
    }
}
