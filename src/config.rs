//! Validator configuration.
//!
//! Defaults point at the public Packagist repository. Override via
//! environment variables or explicit construction for mirrors and tests.

use url::Url;

/// Repository used when a record has a `reference` but no `composer-repository`.
pub const DEFAULT_REPOSITORY: &str = "https://packagist.org";

/// Configuration shared by the engine and the HTTP repository clients.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Fallback repository for records without `composer-repository`.
    pub default_repository: Url,
    /// Request timeout in seconds for repository lookups.
    pub timeout_secs: u64,
    /// `User-Agent` sent with repository requests.
    pub user_agent: String,
    /// Upper bound on `search.json` pages followed per lookup.
    pub max_search_pages: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            default_repository: Url::parse(DEFAULT_REPOSITORY)
                .expect("DEFAULT_REPOSITORY is a valid URL"),
            timeout_secs: 30,
            user_agent: format!("advisory-lint/{}", env!("CARGO_PKG_VERSION")),
            max_search_pages: 3,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ADVISORY_LINT_DEFAULT_REPOSITORY` (default: `https://packagist.org`)
    /// - `ADVISORY_LINT_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let default_repository = match std::env::var("ADVISORY_LINT_DEFAULT_REPOSITORY") {
            Ok(raw) => parse_repository_url(&raw)?,
            Err(_) => defaults.default_repository,
        };
        let timeout_secs = match std::env::var("ADVISORY_LINT_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            Err(_) => defaults.timeout_secs,
        };

        Ok(Self {
            default_repository,
            timeout_secs,
            ..defaults
        })
    }

    pub fn with_default_repository(mut self, url: Url) -> Self {
        self.default_repository = url;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Parses a repository URI, rejecting anything that is not http(s).
pub fn parse_repository_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme `{other}`"),
        )),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid repository URL `{0}`: {1}")]
    InvalidUrl(String, String),
    #[error("invalid timeout `{0}`, expected whole seconds")]
    InvalidTimeout(String),
}
