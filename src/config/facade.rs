//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::BooknavConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<BooknavConfig, ApiError> {
        let config = MergeService::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with an explicit file on top of the global one.
    pub fn load_from_file(path: &Path) -> Result<BooknavConfig, ApiError> {
        let config = MergeService::load_with_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit file when given, otherwise the standard sources.
    pub fn load_or_default(path: Option<&Path>) -> Result<BooknavConfig, ApiError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    /// Create default configuration.
    pub fn default() -> BooknavConfig {
        BooknavConfig::default()
    }
}
