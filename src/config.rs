//! Service configuration and secret loading.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ScribeError, ScribeResult};
use crate::speech::DEFAULT_DEEPGRAM_URL;
use crate::store::DEFAULT_PAGE_SIZE;

pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-haiku-4-5-20251001-v1:0";
pub const DEFAULT_MODEL_ENDPOINT: &str = "https://bedrock-runtime.us-east-1.amazonaws.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub addr: SocketAddr,
    pub allowed_origins: Vec<String>,

    // Language model
    pub model_id: String,
    pub model_endpoint: String,
    pub model_api_key: Option<String>,

    // Speech
    pub deepgram_url: String,
    pub deepgram_api_key: Option<String>,
    pub deepgram_secret_file: Option<PathBuf>,

    // Store
    pub search_page_size: usize,

    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            allowed_origins: default_origins(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            model_api_key: None,
            deepgram_url: DEFAULT_DEEPGRAM_URL.to_string(),
            deepgram_api_key: None,
            deepgram_secret_file: None,
            search_page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

/// Splits a comma separated origin list. Empty input keeps the dev defaults.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if origins.is_empty() {
        default_origins()
    } else {
        origins
    }
}

#[derive(Deserialize)]
struct ApiKeySecret {
    api_key: String,
}

/// Reads a secret stored as `{"api_key": "..."}`.
pub fn load_api_key(path: &Path) -> ScribeResult<String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ScribeError::Config(format!("cannot read secret {}: {e}", path.display())))?;
    let secret: ApiKeySecret = serde_json::from_str(&raw)
        .map_err(|e| ScribeError::Config(format!("malformed secret {}: {e}", path.display())))?;
    Ok(secret.api_key)
}

impl Config {
    /// A key given directly wins over the secret file.
    pub fn resolve_deepgram_key(&self) -> ScribeResult<Option<String>> {
        if let Some(key) = self.deepgram_api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(Some(key.clone()));
        }
        self.deepgram_secret_file
            .as_deref()
            .map(load_api_key)
            .transpose()
    }
}
