use crate::config::types::{ScanMode, ScanOptions, ScanPolicy, DEFAULT_MAX_CONCURRENT_REQUESTS};
use crate::config::validation::{validate, validate_seed_url, validate_status_code};
use crate::output::ScanReport;
use crate::storage::default_cache_path;
use crate::url::canonical_string;
use crate::{ConfigError, ConfigResult};
use std::collections::BTreeSet;
use std::path::Path;

/// Loads and parses an options file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML options file
///
/// # Returns
///
/// * `Ok(ScanOptions)` - Successfully loaded and validated options
/// * `Err(ConfigError)` - Failed to load, parse, or validate the options
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use deadlink_scout::config::load_options;
///
/// let options = load_options(Path::new("scout.toml")).unwrap();
/// println!("Insecure: {}", options.insecure);
/// ```
pub fn load_options(path: &Path) -> ConfigResult<ScanOptions> {
    let content = std::fs::read_to_string(path)?;
    let options: ScanOptions = toml::from_str(&content)?;
    validate(&options)?;
    Ok(options)
}

/// Parses a comma separated list of HTTP status codes
///
/// Tokens are trimmed and empty tokens are skipped. Every code must be in
/// [100, 511].
///
/// # Example
///
/// ```
/// use deadlink_scout::config::parse_ignore_status;
///
/// let codes = parse_ignore_status("403, 429,").unwrap();
/// assert!(codes.contains(&403) && codes.contains(&429));
/// assert!(parse_ignore_status("abc").is_err());
/// ```
pub fn parse_ignore_status(list: &str) -> ConfigResult<BTreeSet<u16>> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(validate_status_code)
        .collect()
}

/// Loads the page keys of a past report as recheck seeds
///
/// Each key is canonicalized; a key that is not a valid HTTP(S) URL is a
/// configuration error.
pub fn load_recheck_seeds(path: &Path) -> ConfigResult<BTreeSet<String>> {
    let report = ScanReport::load(path)?;

    report
        .broken_links
        .keys()
        .map(|page| validate_seed_url(page).map(|url| canonical_string(&url)))
        .collect()
}

impl ScanOptions {
    /// Merges another set of options over this one
    ///
    /// Values present in `other` win; boolean flags are OR-ed.
    pub fn merge(self, other: ScanOptions) -> ScanOptions {
        ScanOptions {
            url: other.url.or(self.url),
            past_result_file: other.past_result_file.or(self.past_result_file),
            ignore_status: other.ignore_status.or(self.ignore_status),
            insecure: self.insecure || other.insecure,
            verbose: self.verbose || other.verbose,
            max_concurrent_requests: other
                .max_concurrent_requests
                .or(self.max_concurrent_requests),
            cache_file: other.cache_file.or(self.cache_file),
            no_cache: self.no_cache || other.no_cache,
        }
    }

    /// Returns the validated seed URL
    pub fn seed_url(&self) -> ConfigResult<&str> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("missing URL to be scanned".to_string()))?;
        validate_seed_url(url)?;
        Ok(url)
    }

    /// Validates the options and builds the scan policy
    ///
    /// This reads the past-result file when one is given; nothing touches the
    /// network.
    pub fn into_policy(self) -> ConfigResult<ScanPolicy> {
        validate(&self)?;

        let ignore_statuses = match &self.ignore_status {
            Some(list) => parse_ignore_status(list)?,
            None => BTreeSet::new(),
        };

        let mode = match &self.past_result_file {
            Some(path) => ScanMode::RecheckSeeds(load_recheck_seeds(path)?),
            None => ScanMode::FullCrawl,
        };

        let cache_file = if self.no_cache {
            None
        } else {
            match self.cache_file {
                Some(path) => Some(path),
                None => match default_cache_path() {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Response cache disabled: {}", e);
                        None
                    }
                },
            }
        };

        Ok(ScanPolicy {
            ignore_statuses,
            insecure_tls: self.insecure,
            verbose: self.verbose,
            mode,
            max_concurrent_requests: self
                .max_concurrent_requests
                .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS),
            cache_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_options() {
        let file = create_temp_file(
            r#"
url = "http://127.0.0.1:8080"
ignore-status = "403"
insecure = true
max-concurrent-requests = 8
no-cache = true
"#,
        );

        let options = load_options(file.path()).unwrap();
        assert_eq!(options.url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(options.ignore_status.as_deref(), Some("403"));
        assert!(options.insecure);
        assert!(!options.verbose);
        assert_eq!(options.max_concurrent_requests, Some(8));
    }

    #[test]
    fn test_load_options_with_invalid_path() {
        let result = load_options(Path::new("/nonexistent/scout.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_options_with_invalid_toml() {
        let file = create_temp_file("this is not valid TOML {{{");
        assert!(matches!(
            load_options(file.path()).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_load_options_with_unknown_key() {
        let file = create_temp_file("depth = 3\n");
        assert!(load_options(file.path()).is_err());
    }

    #[test]
    fn test_parse_ignore_status() {
        let codes = parse_ignore_status(" 403 ,404,,").unwrap();
        assert_eq!(codes.into_iter().collect::<Vec<_>>(), vec![403, 404]);
        assert!(parse_ignore_status("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ignore_status_errors() {
        assert!(matches!(
            parse_ignore_status("abc").unwrap_err(),
            ConfigError::InvalidStatus(token) if token == "abc"
        ));
        assert!(matches!(
            parse_ignore_status("403,50").unwrap_err(),
            ConfigError::UnknownStatus(token) if token == "50"
        ));
    }

    #[test]
    fn test_into_policy_defaults() {
        let options = ScanOptions {
            url: Some("http://host".to_string()),
            no_cache: true,
            ..Default::default()
        };
        let policy = options.into_policy().unwrap();
        assert!(policy.ignore_statuses.is_empty());
        assert_eq!(policy.mode, ScanMode::FullCrawl);
        assert_eq!(policy.max_concurrent_requests, DEFAULT_MAX_CONCURRENT_REQUESTS);
        assert_eq!(policy.cache_file, None);
    }

    #[test]
    fn test_into_policy_recheck_mode() {
        let file = create_temp_file(
            r#"{"broken_links": {
                "http://host/page2/": [{"link": "http://host/x", "code": 404}],
                "http://host/page3": [{"link": "http://host/y", "code": 500}]
            }}"#,
        );
        let options = ScanOptions {
            url: Some("http://host".to_string()),
            past_result_file: Some(file.path().to_path_buf()),
            ignore_status: Some("403".to_string()),
            no_cache: true,
            ..Default::default()
        };

        let policy = options.into_policy().unwrap();
        assert!(policy.is_recheck());
        assert!(policy.ignore_statuses.contains(&403));
        match policy.mode {
            ScanMode::RecheckSeeds(seeds) => {
                assert_eq!(
                    seeds.into_iter().collect::<Vec<_>>(),
                    vec!["http://host/page2", "http://host/page3"]
                );
            }
            ScanMode::FullCrawl => panic!("expected recheck mode"),
        }
    }

    #[test]
    fn test_into_policy_missing_past_result() {
        let options = ScanOptions {
            url: Some("http://host".to_string()),
            past_result_file: Some("/nonexistent/past.json".into()),
            ..Default::default()
        };
        assert!(matches!(
            options.into_policy().unwrap_err(),
            ConfigError::Io(_)
        ));
    }

    #[test]
    fn test_merge_prefers_other() {
        let file_options = ScanOptions {
            url: Some("http://from-file".to_string()),
            ignore_status: Some("403".to_string()),
            insecure: true,
            ..Default::default()
        };
        let cli_options = ScanOptions {
            url: Some("http://from-cli".to_string()),
            ..Default::default()
        };

        let merged = file_options.merge(cli_options);
        assert_eq!(merged.url.as_deref(), Some("http://from-cli"));
        assert_eq!(merged.ignore_status.as_deref(), Some("403"));
        assert!(merged.insecure);
    }

    #[test]
    fn test_seed_url_required() {
        let options = ScanOptions::default();
        assert!(matches!(
            options.seed_url().unwrap_err(),
            ConfigError::Validation(_)
        ));
    }
}
