//! Connector configuration.
//!
//! The host builds a [`ConnectorConfig`] once and hands it to
//! [`ProcessorConnector::new`](crate::application::connector::ProcessorConnector::new).
//! Nothing in the crate reads the environment on its own.

use crate::domain::credentials::Credentials;
use crate::error::{ConnectorError, Result};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

pub const ACCOUNT_ID_VAR: &str = "STRIPE_ACCOUNT_ID";
pub const API_KEY_VAR: &str = "STRIPE_API_KEY";
pub const API_BASE_VAR: &str = "STRIPE_API_BASE";
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub credentials: Credentials,
    pub api_base: Url,
}

impl ConnectorConfig {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self {
            credentials,
            api_base: Url::parse(DEFAULT_API_BASE)?,
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        self.api_base = parse_base(api_base)?;
        Ok(self)
    }

    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            return Err(e.into());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads a dotenv file without touching the process environment.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConnectorError::MissingConfig(key.to_string()))
        };

        let credentials = Credentials::new(require(ACCOUNT_ID_VAR)?, require(API_KEY_VAR)?);
        let config = Self::new(credentials)?;
        match lookup(API_BASE_VAR) {
            Some(base) if !base.is_empty() => config.with_api_base(&base),
            _ => Ok(config),
        }
    }
}

// A base without a trailing slash would have its last segment replaced by `Url::join`.
fn parse_base(raw: &str) -> Result<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}
