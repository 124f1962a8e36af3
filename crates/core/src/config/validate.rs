use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Public URL is an absolute http(s) URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let public_url = config.server.public_url.trim();
    if !(public_url.starts_with("http://") || public_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "server.public_url must start with http:// or https://, got {:?}",
            config.server.public_url
        )));
    }

    Ok(())
}
