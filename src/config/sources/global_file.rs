//! Global config file source: `$XDG_CONFIG_HOME/booknav/config.toml`

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::PathBuf;

/// Path of the global config file, if a config home can be determined
pub fn global_config_path() -> Option<PathBuf> {
    xdg::config_dir().ok().map(|dir| dir.join("config.toml"))
}

/// Add the global config file to builder. A missing file is skipped.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) => Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(false))),
        None => Ok(builder),
    }
}
