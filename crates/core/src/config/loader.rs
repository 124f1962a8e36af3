use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix for overrides, e.g. `TICKETDESK_SERVER_PORT=9000`.
/// Only the first `_` after the prefix separates section from key, so
/// `TICKETDESK_SERVER_PUBLIC_URL` maps to `server.public_url`.
pub const ENV_PREFIX: &str = "TICKETDESK_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replacen('_', ".", 1).into()),
        )
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
