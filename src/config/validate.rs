// src/config/validate.rs

use crate::config::model::{ConfigFile, PoolSection, RawConfigFile};
use crate::errors::{FuturoError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FuturoError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.pool, raw.scheduler))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_pool(&cfg.pool)?;
    // failure_policy is strongly typed and checked during deserialization.
    Ok(())
}

pub(crate) fn validate_pool(pool: &PoolSection) -> Result<()> {
    if pool.workers == 0 {
        return Err(FuturoError::ConfigError(
            "[pool].workers must be >= 1 (got 0)".to_string(),
        ));
    }

    if pool.thread_name.trim().is_empty() {
        return Err(FuturoError::ConfigError(
            "[pool].thread_name must not be empty".to_string(),
        ));
    }

    Ok(())
}
