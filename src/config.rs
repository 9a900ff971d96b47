//! Application configuration
//!
//! Read from a TOML file (default `~/.config/parkspace/config.toml`). Every
//! section and key is optional; anything missing falls back to defaults.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//!
//! [database]
//! url = "sqlite://./parkspace.db?mode=rwc"
//!
//! [booking]
//! currency = "eur"
//! cancellation_cutoff_hours = 12
//! max_window_days = 366
//! pending_ttl_minutes = 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::LifecycleSettings;
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::database::{DatabaseConfig, DEFAULT_DATABASE_URL};
use crate::shared::types::ConfigError;

const APP_DIR: &str = "parkspace";
pub const SANDBOX_PROVIDER: &str = "sandbox";
const CONFIG_FILE: &str = "config.toml";

/// `~/.config/parkspace/config.toml`, or `./config.toml` when the platform
/// has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub booking: BookingConfig,
    pub payment: PaymentConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// Expected `x-webhook-secret` on payment callbacks. Unset accepts any.
    pub webhook_secret: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 24,
            webhook_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `plain` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub currency: String,
    pub cancellation_cutoff_hours: i64,
    pub onsite_deposit_percent: u32,
    pub sweep_interval_secs: u64,
    pub code_attempts: u32,
    /// Longest bookable or queryable window
    pub max_window_days: i64,
    /// Unpaid online checkouts release their space after this long
    pub pending_ttl_minutes: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            currency: "eur".to_string(),
            cancellation_cutoff_hours: 12,
            onsite_deposit_percent: 0,
            sweep_interval_secs: 3600,
            code_attempts: 5,
            max_window_days: 366,
            pending_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Only `sandbox` is built in.
    pub provider: String,
    pub checkout_base_url: String,
    pub timeout_secs: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: SANDBOX_PROVIDER.to_string(),
            checkout_base_url: "http://localhost:8080/checkout".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields defaults; environment
    /// overrides apply either way.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// `DATABASE_URL` and `JWT_SECRET` win over the file.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            self.security.jwt_secret = secret;
        }
    }

    /// Settings that are unsafe to run with. A real payment provider needs
    /// a webhook secret, otherwise anyone could confirm an unpaid booking.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret_set = self
            .security
            .webhook_secret
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if self.payment.provider != SANDBOX_PROVIDER && !secret_set {
            return Err(ConfigError::Invalid {
                key: "security.webhook_secret",
                reason: format!(
                    "required when payment.provider is '{}'",
                    self.payment.provider
                ),
            });
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(
            self.security.jwt_secret.clone(),
            self.security.jwt_expiration_hours,
        )
    }

    pub fn lifecycle_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            currency: self.booking.currency.to_lowercase(),
            cancellation_cutoff: chrono::Duration::hours(self.booking.cancellation_cutoff_hours),
            onsite_deposit_percent: self.booking.onsite_deposit_percent.min(100),
            payment_timeout: Duration::from_secs(self.payment.timeout_secs),
            notify_timeout: Duration::from_secs(self.notifications.timeout_secs),
            notifications_enabled: self.notifications.enabled,
            code_attempts: self.booking.code_attempts.max(1),
            max_window: chrono::Duration::days(self.booking.max_window_days.max(1)),
            pending_ttl: chrono::Duration::minutes(self.booking.pending_ttl_minutes.max(1)),
            ..LifecycleSettings::default()
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.booking.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            api_port = 9090

            [booking]
            cancellation_cutoff_hours = 24
            onsite_deposit_percent = 150
            "#,
        )
        .unwrap();

        assert_eq!(config.server.api_port, 9090);
        assert_eq!(config.server.api_host, "0.0.0.0");
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);

        let settings = config.lifecycle_settings();
        assert_eq!(settings.cancellation_cutoff, chrono::Duration::hours(24));
        assert_eq!(settings.onsite_deposit_percent, 100);
        assert!(settings.notifications_enabled);
        assert_eq!(settings.max_window, chrono::Duration::days(366));
        assert_eq!(settings.pending_ttl, chrono::Duration::minutes(60));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::from_toml("[database]\nurl = \"sqlite://file.db\"").unwrap();
        config.apply_env(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "JWT_SECRET" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.security.jwt_secret, "change-me-in-production");
    }

    #[test]
    fn malformed_file_is_reported() {
        let err = AppConfig::from_toml("[server]\napi_port = \"eighty\"").unwrap_err();
        assert!(err.to_string().contains("api_port"));
    }

    #[test]
    fn real_provider_needs_a_webhook_secret() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::from_toml("[payment]\nprovider = \"stripe\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("security.webhook_secret"));

        config.security.webhook_secret = Some("  ".to_string());
        assert!(config.validate().is_err());

        config.security.webhook_secret = Some("whsec_live".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/parkspace/config.toml")).unwrap();
        assert_eq!(config.payment.provider, "sandbox");
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
    }
}
