use crate::config::types::ScanOptions;
use crate::url::normalize_url;
use crate::ConfigError;
use url::Url;

/// Lowest status code accepted in an ignore list (100 Continue)
pub const MIN_STATUS_CODE: u16 = 100;

/// Highest status code accepted in an ignore list (511 Network Authentication Required)
pub const MAX_STATUS_CODE: u16 = 511;

const MAX_CONCURRENT_REQUESTS_LIMIT: usize = 1024;

/// Validates the options that do not need file access
pub fn validate(options: &ScanOptions) -> Result<(), ConfigError> {
    if let Some(url) = &options.url {
        validate_seed_url(url)?;
    }

    if let Some(max) = options.max_concurrent_requests {
        if max < 1 || max > MAX_CONCURRENT_REQUESTS_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_requests must be between 1 and {}, got {}",
                MAX_CONCURRENT_REQUESTS_LIMIT, max
            )));
        }
    }

    Ok(())
}

/// Validates and normalizes the seed URL
///
/// The seed must be an absolute HTTP(S) URL with a host. Its trailing slash
/// and fragment are stripped.
pub fn validate_seed_url(url: &str) -> Result<Url, ConfigError> {
    normalize_url(url).map_err(|e| {
        tracing::debug!("Rejecting seed URL {:?}: {}", url, e);
        ConfigError::InvalidUrl(url.to_string())
    })
}

/// Validates one token of an ignore-status list
pub fn validate_status_code(token: &str) -> Result<u16, ConfigError> {
    let code: i64 = token
        .parse()
        .map_err(|_| ConfigError::InvalidStatus(token.to_string()))?;

    if code < i64::from(MIN_STATUS_CODE) || code > i64::from(MAX_STATUS_CODE) {
        return Err(ConfigError::UnknownStatus(token.to_string()));
    }

    Ok(code as u16)
}
