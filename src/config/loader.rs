//! Configuration loading from disk and environment.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file (when
//! given), then `APP_*` environment variables.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::duration::parse_duration;
use crate::config::schema::SimulatorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "APP_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Env {
        key: String,
        value: String,
        reason: String,
    },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file plus the process environment,
/// then validate it.
pub fn load_config(path: Option<&Path>) -> Result<SimulatorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => SimulatorConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file without validating it.
pub fn parse_file(path: &Path) -> Result<SimulatorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply `APP_*` overrides read through `lookup`.
///
/// Variable names match the existing deployment environment, e.g.
/// `APP_SERVER_PORT` or `APP_DUMMY_MAX_AMOUNT_TO_WAIT`.
pub fn apply_env_overrides<F>(config: &mut SimulatorConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| {
        let key = format!("{ENV_PREFIX}{name}");
        lookup(&key).map(|value| (key, value))
    };

    if let Some((_, value)) = get("SERVER_HOST") {
        config.server.host = value;
    }
    if let Some((key, value)) = get("SERVER_PORT") {
        config.server.port = parse_env(&key, &value, parse_number)?;
    }
    if let Some((key, value)) = get("SERVER_GRACEFUL_SHUTDOWN_TIMEOUT") {
        config.server.graceful_shutdown_timeout = parse_env(&key, &value, parse_duration)?;
    }
    if let Some((key, value)) = get("SERVER_MAX_LINE_LENGTH") {
        config.server.max_line_length =
            parse_env(&key, &value, parse_number)?;
    }
    if let Some((key, value)) = get("INIT_DEBUG") {
        config.observability.debug = parse_env(&key, &value, parse_bool)?;
    }
    if let Some((_, value)) = get("LOG_LEVEL") {
        config.observability.log_level = value;
    }
    if let Some((key, value)) = get("METRICS_ENABLED") {
        config.observability.metrics_enabled = parse_env(&key, &value, parse_bool)?;
    }
    if let Some((_, value)) = get("METRICS_ADDRESS") {
        config.observability.metrics_address = value;
    }
    if let Some((key, value)) = get("DUMMY_MIN_AMOUNT_TO_WAIT") {
        config.processing.min_amount_to_wait =
            parse_env(&key, &value, parse_number)?;
    }
    if let Some((key, value)) = get("DUMMY_MAX_AMOUNT_TO_WAIT") {
        config.processing.max_amount_to_wait =
            parse_env(&key, &value, parse_number)?;
    }

    Ok(())
}

fn parse_env<T>(
    key: &str,
    value: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    parse(value.trim()).map_err(|reason| ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    })
}

fn parse_number<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| e.to_string())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("expected a boolean".to_string()),
    }
}
