use thiserror::Error;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "SCHEDULER_API_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SCHEDULER_API_URL is not set")]
    MissingBaseUrl,
    #[error("base url is empty")]
    EmptyBaseUrl,
    #[error("base url must start with http:// or https:// (got {0})")]
    UnsupportedScheme(String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend root, without a trailing slash, e.g. `http://10.0.2.2:5000`.
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(base_url.to_string()));
        }
        Ok(Self {
            base_url: base_url.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(API_URL_ENV).map_err(|_| ConfigError::MissingBaseUrl)?;
        Self::new(raw)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
