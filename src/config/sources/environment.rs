//! Environment variable source: BOOKNAV_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "BOOKNAV";

/// Add environment variable overlay to builder.
/// Uses BOOKNAV_ prefix and __ as separator for nested keys,
/// e.g. `BOOKNAV_SESSION__SEARCH_DEBOUNCE_MS=150`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
