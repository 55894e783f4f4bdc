//! Configuration
//!
//! `BooknavConfig` is assembled by the `config` crate from built-in defaults,
//! the global file under the XDG config home, an optional explicit file and
//! `BOOKNAV_*` environment variables, in increasing precedence.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BooknavConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sled,
    Memory,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sled
}

/// Repository selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Sled database directory; None means `$XDG_DATA_HOME/booknav/store`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Seed the sample library into a fresh memory store
    #[serde(default)]
    pub seed_sample: bool,
}

impl StoreConfig {
    /// Directory the sled backend opens
    pub fn resolve_path(&self) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => Ok(xdg::data_dir()?.join("store")),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            seed_sample: false,
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_row_tolerance() -> f64 {
    crate::navigator::ROW_TOLERANCE
}

fn default_sidebar_min() -> f64 {
    220.0
}

fn default_sidebar_max() -> f64 {
    420.0
}

fn default_sidebar_width() -> f64 {
    280.0
}

/// Interaction tuning for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Quiet period before a typed query is looked up
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Max difference in tops for two grid cells to share a row
    #[serde(default = "default_row_tolerance")]
    pub row_tolerance: f64,

    #[serde(default = "default_sidebar_min")]
    pub sidebar_min_width: f64,

    #[serde(default = "default_sidebar_max")]
    pub sidebar_max_width: f64,

    #[serde(default = "default_sidebar_width")]
    pub sidebar_default_width: f64,
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_debounce_ms(),
            row_tolerance: default_row_tolerance(),
            sidebar_min_width: default_sidebar_min(),
            sidebar_max_width: default_sidebar_max(),
            sidebar_default_width: default_sidebar_width(),
        }
    }
}

impl BooknavConfig {
    /// Reject values no session could work with
    pub fn validate(&self) -> Result<(), ApiError> {
        let session = &self.session;
        if session.row_tolerance <= 0.0 {
            return Err(ApiError::ConfigError(format!(
                "session.row_tolerance must be positive, got {}",
                session.row_tolerance
            )));
        }
        if session.sidebar_min_width > session.sidebar_max_width {
            return Err(ApiError::ConfigError(format!(
                "session.sidebar_min_width ({}) exceeds sidebar_max_width ({})",
                session.sidebar_min_width, session.sidebar_max_width
            )));
        }
        if self.store.seed_sample && self.store.backend != StoreBackend::Memory {
            return Err(ApiError::ConfigError(
                "store.seed_sample only applies to the memory backend; use `booknav init --sample`"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
