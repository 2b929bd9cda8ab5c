//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold the knobs shared by the FFI and CLI entry points.
//! - Parse overrides from `WORRYBIN_*` environment variables.
//!
//! # Invariants
//! - `CoreConfig::default()` reproduces the shipped app behavior.
//! - Invalid override values are rejected, never silently ignored.

use crate::logging::default_log_level;
use crate::store::record_store::DEFAULT_SLOT_KEY;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ENV_SLOT_KEY: &str = "WORRYBIN_SLOT_KEY";
pub const ENV_TOGGLE_PERSISTENCE: &str = "WORRYBIN_TOGGLE_PERSISTENCE";
pub const ENV_LOG_LEVEL: &str = "WORRYBIN_LOG_LEVEL";

/// Whether `toggle_realized` writes through to the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TogglePersistence {
    /// Only the in-memory copy changes; the flag is lost on restart unless
    /// a later add/delete rewrites the collection.
    #[default]
    MemoryOnly,
    /// Every toggle rewrites the whole collection.
    Persist,
}

impl TogglePersistence {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "memory_only" => Ok(Self::MemoryOnly),
            "persist" => Ok(Self::Persist),
            other => Err(ConfigError::InvalidValue {
                key: ENV_TOGGLE_PERSISTENCE,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for one worry list instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Record store slot holding the serialized collection.
    pub slot_key: String,
    pub toggle_persistence: TogglePersistence,
    pub log_level: &'static str,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            toggle_persistence: TogglePersistence::default(),
            log_level: default_log_level(),
        }
    }
}

impl CoreConfig {
    /// Builds a config from defaults plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults plus overrides returned by `lookup`.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(slot_key) = non_blank(ENV_SLOT_KEY) {
            config.slot_key = slot_key.trim().to_string();
        }
        if let Some(policy) = non_blank(ENV_TOGGLE_PERSISTENCE) {
            config.toggle_persistence = TogglePersistence::parse(&policy)?;
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level =
                crate::logging::normalize_level(&level).map_err(|_| ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: level.trim().to_string(),
                })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, TogglePersistence, ENV_TOGGLE_PERSISTENCE};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_keep_toggle_in_memory() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.slot_key, "SavedWorries");
        assert_eq!(config.toggle_persistence, TogglePersistence::MemoryOnly);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("WORRYBIN_SLOT_KEY", " Archive "),
            ("WORRYBIN_TOGGLE_PERSISTENCE", "Persist"),
            ("WORRYBIN_LOG_LEVEL", "WARNING"),
        ]))
        .unwrap();
        assert_eq!(config.slot_key, "Archive");
        assert_eq!(config.toggle_persistence, TogglePersistence::Persist);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn unknown_toggle_policy_is_rejected() {
        let err =
            CoreConfig::from_lookup(lookup(&[("WORRYBIN_TOGGLE_PERSISTENCE", "sometimes")]))
                .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_TOGGLE_PERSISTENCE,
                value: "sometimes".to_string(),
            }
        );
    }
}
