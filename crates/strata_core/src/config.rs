//! # Storage Configuration
//!
//! Sizing knobs for pools, the entity directory and catalogs. Loaded once
//! at startup, usually from a TOML file owned by the host application.

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Payloads a pool reserves on its first insert.
pub const DEFAULT_BUCKET_WIDTH: usize = 32;

/// Sizing for every storage structure owned by a [`crate::StorageContext`].
///
/// # Example
///
/// ```rust
/// use strata_core::StorageConfig;
///
/// let config = StorageConfig::from_toml_str("pool_bucket_width = 64").unwrap();
/// assert_eq!(config.pool_bucket_width, 64);
/// assert_eq!(config.entity_reserve, 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Size of each component pool's first allocation.
    pub pool_bucket_width: usize,
    /// Entity slots reserved when the directory is created.
    pub entity_reserve: usize,
    /// Bucket slots reserved when a catalog is created.
    pub catalog_reserve: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            pool_bucket_width: DEFAULT_BUCKET_WIDTH,
            entity_reserve: 0,
            catalog_reserve: 0,
        }
    }
}

impl StorageConfig {
    /// Server-sized configuration: large first buckets, entities reserved up front.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            pool_bucket_width: 1024,
            entity_reserve: 65_536,
            catalog_reserve: 256,
        }
    }

    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the storage structures cannot honor.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pool_bucket_width == 0 {
            return Err(ConfigError::Invalid(
                "pool_bucket_width must be greater than zero".to_string(),
            ));
        }
        if self.entity_reserve > u32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "entity_reserve {} exceeds the handle index space",
                self.entity_reserve
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::from_toml_str("").unwrap();
        assert_eq!(config, StorageConfig::default());
        assert_eq!(config.pool_bucket_width, 32);
    }

    #[test]
    fn test_full_document() {
        let config = StorageConfig::from_toml_str(
            "pool_bucket_width = 8\nentity_reserve = 100\ncatalog_reserve = 4\n",
        )
        .unwrap();
        assert_eq!(config.pool_bucket_width, 8);
        assert_eq!(config.entity_reserve, 100);
        assert_eq!(config.catalog_reserve, 4);
    }

    #[test]
    fn test_zero_bucket_width_rejected() {
        let err = StorageConfig::from_toml_str("pool_bucket_width = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = StorageConfig::from_toml_str("bucket = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_production_is_valid() {
        assert!(StorageConfig::production().validate().is_ok());
    }
}
