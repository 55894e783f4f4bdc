//! Built-in defaults every load starts from.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with the defaults that sources may override.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("store.backend", "sled")?
        .set_default("store.seed_sample", false)?
        .set_default("session.search_debounce_ms", 300)?
        .set_default("session.row_tolerance", 24.0)?
        .set_default("session.sidebar_min_width", 220.0)?
        .set_default("session.sidebar_max_width", 420.0)?
        .set_default("session.sidebar_default_width", 280.0)
}
