// src/config/classifier.rs
use serde::{Deserialize, Serialize};
use std::env;

pub const ENV_CLASSIFIER: &str = "TWEET_PULSE_CLASSIFIER";
pub const ENV_API_URL: &str = "SENTIMENT_API_URL";
pub const ENV_API_TOKEN: &str = "SENTIMENT_API_TOKEN";

pub const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment";

fn default_provider() -> String {
    "lexicon".to_string()
}
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// "lexicon" | "http" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// "ENV" means: read from SENTIMENT_API_TOKEN
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClassifierConfig {
    /// Normalize provider, resolve the "ENV" token placeholder and apply env overrides.
    pub fn resolve(mut self) -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_CLASSIFIER) {
            self.provider = p;
        }
        if let Ok(u) = env::var(ENV_API_URL) {
            self.api_url = u;
        }
        self.provider = self.provider.trim().to_lowercase();

        if self.api_token.trim().eq_ignore_ascii_case("env") {
            self.api_token = env::var(ENV_API_TOKEN)
                .map_err(|_| anyhow::anyhow!("Missing {ENV_API_TOKEN} env var"))?;
        } else if self.api_token.is_empty() {
            self.api_token = env::var(ENV_API_TOKEN).unwrap_or_default();
        }

        match self.provider.as_str() {
            "lexicon" | "http" | "mock" => {}
            other => anyhow::bail!("Unsupported classifier provider in config: {other}"),
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        Ok(self)
    }
}
