use std::env;

use reqwest::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Runtime configuration loaded from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the GraphQL contribution query.
    pub token: Option<String>,
    /// Base URL of the GitHub API, without a trailing slash.
    pub api_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::var("GITHUB_TOKEN").ok(), env::var("GITHUB_API_URL").ok())
    }

    fn from_vars(token: Option<String>, api_url: Option<String>) -> Result<Self, ConfigError> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let api_url = match api_url.filter(|u| !u.trim().is_empty()) {
            Some(raw) => {
                let parsed = Url::parse(raw.trim())
                    .map_err(|_| ConfigError::InvalidValue("GITHUB_API_URL"))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ConfigError::InvalidValue("GITHUB_API_URL"));
                }
                raw.trim().trim_end_matches('/').to_string()
            }
            None => DEFAULT_API_URL.to_string(),
        };

        Ok(Self { token, api_url })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
