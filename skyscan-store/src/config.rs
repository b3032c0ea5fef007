use std::time::Duration;

use anyhow::anyhow;
use skyscan_logic::prelude::*;

const URL_VAR: &str = "SKYSCAN_BACKEND_URL";
const KEY_VAR: &str = "SKYSCAN_BACKEND_KEY";
const TIMEOUT_VAR: &str = "SKYSCAN_BACKEND_TIMEOUT_SECS";

const fn default_timeout_secs() -> u64 {
    if let Some(secs) = option_env!("SKYSCAN_DEFAULT_TIMEOUT_SECS") {
        const_str::parse!(secs, u64)
    } else {
        15
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = default_timeout_secs();

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where the hosted backend lives and how to talk to it
pub struct StoreConfig {
    /// Project URL, e.g. `https://abc.example.co`, no trailing slash
    pub base_url: String,
    /// API key sent with every request
    pub api_key: String,
    /// Timeout for a single request
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the config from `SKYSCAN_BACKEND_URL`, `SKYSCAN_BACKEND_KEY`, and optionally
    /// `SKYSCAN_BACKEND_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{URL_VAR} is not set"))?;
        let api_key = lookup(KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{KEY_VAR} is not set"))?;

        let config = Self::new(base_url.trim(), api_key.trim());

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {TIMEOUT_VAR}: {raw}"))?;
            Ok(config.with_timeout(Duration::from_secs(secs)))
        } else {
            Ok(config)
        }
    }
}
