//! Environment configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lifeweeks_core::statistics::DEFAULT_LIFE_EXPECTANCY;
use lifeweeks_notifications::application::notification_service::NotificationSettings;
use lifeweeks_scheduler::application::client::SchedulerClientConfig;
use lifeweeks_scheduler::application::worker::WorkerConfig;

use crate::error::AppError;

/// Language used when a profile has none.
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Default scheduler response timeout, in milliseconds.
pub const DEFAULT_SCHEDULER_TIMEOUT_MS: u64 = 5000;

/// Default scheduler tick, in seconds.
pub const DEFAULT_SCHEDULER_TICK_SECS: u64 = 30;

/// Runtime configuration of the `lifeweeks` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `LIFEWEEKS_DEFAULT_LANGUAGE`.
    pub default_language: String,
    /// `LIFEWEEKS_DEFAULT_LIFE_EXPECTANCY`.
    pub default_life_expectancy: u32,
    /// `LIFEWEEKS_SCHEDULER_TIMEOUT_MS`.
    pub scheduler_timeout: Duration,
    /// `LIFEWEEKS_SCHEDULER_TICK_SECS`.
    pub scheduler_tick: Duration,
    /// `LIFEWEEKS_USERS_FILE`: JSON array of user profiles to load at start.
    pub users_file: Option<PathBuf>,
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`: enables OTLP span export when set.
    pub otlp_endpoint: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_owned(),
            default_life_expectancy: DEFAULT_LIFE_EXPECTANCY,
            scheduler_timeout: Duration::from_millis(DEFAULT_SCHEDULER_TIMEOUT_MS),
            scheduler_tick: Duration::from_secs(DEFAULT_SCHEDULER_TICK_SECS),
            users_file: None,
            otlp_endpoint: None,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Unset and blank variables
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let default_life_expectancy: u32 = parse_or(
            get("LIFEWEEKS_DEFAULT_LIFE_EXPECTANCY"),
            "LIFEWEEKS_DEFAULT_LIFE_EXPECTANCY",
            defaults.default_life_expectancy,
        )?;
        if default_life_expectancy == 0 {
            return Err(AppError::Config(
                "LIFEWEEKS_DEFAULT_LIFE_EXPECTANCY must be positive".into(),
            ));
        }

        let timeout_ms: u64 = parse_or(
            get("LIFEWEEKS_SCHEDULER_TIMEOUT_MS"),
            "LIFEWEEKS_SCHEDULER_TIMEOUT_MS",
            DEFAULT_SCHEDULER_TIMEOUT_MS,
        )?;
        let tick_secs: u64 = parse_or(
            get("LIFEWEEKS_SCHEDULER_TICK_SECS"),
            "LIFEWEEKS_SCHEDULER_TICK_SECS",
            DEFAULT_SCHEDULER_TICK_SECS,
        )?;
        if timeout_ms == 0 || tick_secs == 0 {
            return Err(AppError::Config(
                "scheduler timeout and tick must be positive".into(),
            ));
        }

        Ok(Self {
            default_language: get("LIFEWEEKS_DEFAULT_LANGUAGE")
                .map_or(defaults.default_language, |value| value.trim().to_owned()),
            default_life_expectancy,
            scheduler_timeout: Duration::from_millis(timeout_ms),
            scheduler_tick: Duration::from_secs(tick_secs),
            users_file: get("LIFEWEEKS_USERS_FILE").map(PathBuf::from),
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// Payload generation defaults.
    #[must_use]
    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            default_language: self.default_language.clone(),
            default_life_expectancy: self.default_life_expectancy,
        }
    }

    /// Scheduler client settings.
    #[must_use]
    pub const fn client_config(&self) -> SchedulerClientConfig {
        SchedulerClientConfig {
            timeout: self.scheduler_timeout,
        }
    }

    /// Scheduler worker settings.
    #[must_use]
    pub const fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            tick_interval: self.scheduler_tick,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_language, "ru");
        assert_eq!(config.default_life_expectancy, 80);
        assert_eq!(config.scheduler_timeout, Duration::from_secs(5));
        assert!(config.users_file.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        // Arrange
        let pairs = [
            ("LIFEWEEKS_DEFAULT_LANGUAGE", "en"),
            ("LIFEWEEKS_DEFAULT_LIFE_EXPECTANCY", "90"),
            ("LIFEWEEKS_SCHEDULER_TIMEOUT_MS", "250"),
            ("LIFEWEEKS_SCHEDULER_TICK_SECS", "1"),
            ("LIFEWEEKS_USERS_FILE", "/tmp/users.json"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        ];

        // Act
        let config = config_from(&pairs).unwrap();

        // Assert
        assert_eq!(config.notification_settings().default_language, "en");
        assert_eq!(config.notification_settings().default_life_expectancy, 90);
        assert_eq!(config.client_config().timeout, Duration::from_millis(250));
        assert_eq!(config.worker_config().tick_interval, Duration::from_secs(1));
        assert_eq!(config.users_file, Some(PathBuf::from("/tmp/users.json")));
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("LIFEWEEKS_DEFAULT_LANGUAGE", "  "), ("OTEL_EXPORTER_OTLP_ENDPOINT", "")])
            .unwrap();

        assert_eq!(config.default_language, "ru");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(matches!(
            config_from(&[("LIFEWEEKS_SCHEDULER_TIMEOUT_MS", "soon")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("LIFEWEEKS_DEFAULT_LIFE_EXPECTANCY", "0")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("LIFEWEEKS_SCHEDULER_TICK_SECS", "0")]),
            Err(AppError::Config(_))
        ));
    }
}
