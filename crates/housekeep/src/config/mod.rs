use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::marketplace::HirePolicy;

const DEFAULT_DISABLED_REASON: &str = "Your account has been disabled by an administrator.";
const DEFAULT_WRITE_ATTEMPTS: u8 = 3;

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
    pub marketplace: MarketplaceConfig,
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
            marketplace: MarketplaceConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Business-rule dials for the lifecycle managers and the eligibility gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceConfig {
    /// What happens to the remaining pending applicants once a post is hired.
    pub hire_policy: HirePolicy,
    /// Fetch/validate/write cycles attempted before a version conflict is surfaced.
    pub write_attempts: u8,
    /// Reason reported for disabled accounts that carry none of their own.
    pub disabled_reason: String,
}

impl MarketplaceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let hire_policy = match env::var("MARKETPLACE_HIRE_POLICY") {
            Ok(raw) => HirePolicy::parse(&raw).ok_or(ConfigError::InvalidHirePolicy(raw))?,
            Err(_) => HirePolicy::default(),
        };

        let write_attempts = match env::var("MARKETPLACE_WRITE_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ConfigError::InvalidWriteAttempts)?,
            Err(_) => DEFAULT_WRITE_ATTEMPTS,
        };

        let disabled_reason = env::var("MARKETPLACE_DISABLED_REASON")
            .ok()
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| DEFAULT_DISABLED_REASON.to_string());

        Ok(Self {
            hire_policy,
            write_attempts,
            disabled_reason,
        })
    }
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            hire_policy: HirePolicy::default(),
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
            disabled_reason: DEFAULT_DISABLED_REASON.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidHirePolicy(String),
    InvalidWriteAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidHirePolicy(raw) => write!(
                f,
                "MARKETPLACE_HIRE_POLICY must be 'leave_pending' or 'reject_others' (found '{raw}')"
            ),
            ConfigError::InvalidWriteAttempts => {
                write!(f, "MARKETPLACE_WRITE_ATTEMPTS must be an integer between 1 and 255")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidHirePolicy(_)
            | ConfigError::InvalidWriteAttempts => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "MARKETPLACE_HIRE_POLICY",
            "MARKETPLACE_WRITE_ATTEMPTS",
            "MARKETPLACE_DISABLED_REASON",
        ] {
            env::remove_var(key);
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
        assert_eq!(config.marketplace, MarketplaceConfig::default());
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
    fn reads_marketplace_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MARKETPLACE_HIRE_POLICY", "reject_others");
        env::set_var("MARKETPLACE_WRITE_ATTEMPTS", "5");
        env::set_var("MARKETPLACE_DISABLED_REASON", "Contact support");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.marketplace.hire_policy, HirePolicy::RejectOthers);
        assert_eq!(config.marketplace.write_attempts, 5);
        assert_eq!(config.marketplace.disabled_reason, "Contact support");
        reset_env();
    }

    #[test]
    fn rejects_unknown_hire_policy_and_zero_attempts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MARKETPLACE_HIRE_POLICY", "auto");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidHirePolicy(raw)) if raw == "auto"
        ));

        reset_env();
        env::set_var("MARKETPLACE_WRITE_ATTEMPTS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidWriteAttempts)
        ));
        reset_env();
    }
}
