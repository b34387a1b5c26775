//! Client configuration.
//!
//! Resolved once at startup from raw values the binaries read out of the
//! environment (after `dotenvy` has loaded any `.env` file).

use crate::{ClientError, ClientResult};
use reqwest::Url;
use std::path::PathBuf;

/// Backend address used when `CARTAO_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Token file location relative to the home directory.
pub const DEFAULT_TOKEN_FILE: &str = ".cartao/token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
    token_file: PathBuf,
}

impl ClientConfig {
    /// # Errors
    ///
    /// Returns `ClientError::Config` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, token_file: PathBuf) -> ClientResult<Self> {
        let mut url = Url::parse(base_url.trim())
            .map_err(|e| ClientError::Config(format!("invalid API URL '{base_url}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "API URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ClientError::Config(format!(
                "API URL must be absolute: '{base_url}'"
            )));
        }

        // Url::join replaces the last segment unless the path ends with '/'.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            token_file,
        })
    }

    /// Build from optional raw values, using defaults for missing or blank ones.
    ///
    /// `home` is only consulted when `token_file` is not given.
    pub fn from_env_values(
        api_url: Option<String>,
        token_file: Option<String>,
        home: Option<String>,
    ) -> ClientResult<Self> {
        let api_url = api_url
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let token_file = match token_file.filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => home
                .filter(|v| !v.trim().is_empty())
                .map(|h| PathBuf::from(h).join(DEFAULT_TOKEN_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
        };

        Self::new(&api_url, token_file)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token_file(&self) -> &std::path::Path {
        &self.token_file
    }
}
