//! Middleware configuration.
use crate::{ConfigError, TokenPointer};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Prefix of every relative call path.
    pub base_url: String,
    /// JSON pointer of the bearer token in a JSON application state.
    pub token_pointer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/".to_owned(),
            token_pointer: "/login/token".to_owned(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of a call path. Absolute URLs are used as they are.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn token_resolver(&self) -> TokenPointer {
        TokenPointer::new(self.token_pointer.clone())
    }
}
