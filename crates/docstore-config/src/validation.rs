// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use docstore_core::BackendKind;

use crate::diagnostic::ConfigError;
use crate::model::DocStoreConfig;

/// Largest accepted change-feed buffer.
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DocStoreConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.backend == BackendKind::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty for the sqlite backend".to_string(),
        });
    }

    let capacity = config.subscriptions.channel_capacity;
    if capacity == 0 || capacity > MAX_CHANNEL_CAPACITY {
        errors.push(ConfigError::Validation {
            message: format!(
                "subscriptions.channel_capacity must be between 1 and {MAX_CHANNEL_CAPACITY}, got {capacity}"
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&DocStoreConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_only_for_sqlite() {
        let mut config = DocStoreConfig::default();
        config.storage.database_path = "  ".to_string();
        assert!(validate_config(&config).is_ok());

        config.storage.backend = BackendKind::Sqlite;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn channel_capacity_bounds() {
        let mut config = DocStoreConfig::default();
        config.subscriptions.channel_capacity = 0;
        assert!(has_message(&validate_config(&config).unwrap_err(), "channel_capacity"));

        config.subscriptions.channel_capacity = MAX_CHANNEL_CAPACITY + 1;
        assert!(has_message(&validate_config(&config).unwrap_err(), "channel_capacity"));

        config.subscriptions.channel_capacity = MAX_CHANNEL_CAPACITY;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = DocStoreConfig::default();
        config.storage.backend = BackendKind::Sqlite;
        config.storage.database_path = String::new();
        config.subscriptions.channel_capacity = 0;
        assert_eq!(validate_config(&config).unwrap_err().len(), 2);
    }
}
