//! Configuration for the assignment solver

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::answers::{MatchPolicy, QuestionAnswerEntry};
use crate::error::{Error, Result};

/// Environment variable holding the model provider credential
pub const CREDENTIAL_ENV: &str = "AIPROXY_TOKEN";

/// Environment variable pointing at an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "SOLVER_CONFIG";

/// Main solver configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Model provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Known-answer table configuration
    #[serde(default)]
    pub answers: AnswerTableConfig,
    /// File interpreter configuration
    #[serde(default)]
    pub interpreter: InterpreterConfig,
}

impl SolverConfig {
    /// Load configuration from `.env`, an optional TOML file, and the environment
    ///
    /// Order (later wins): defaults, `$SOLVER_CONFIG` file, environment variables.
    pub fn load() -> Result<Self> {
        // A missing .env is normal outside development
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay values from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(CREDENTIAL_ENV) {
            self.llm.api_key = token;
        }
        if let Some(base_url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "{} is not set; the model provider credential is required",
                CREDENTIAL_ENV
            )));
        }
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("llm.timeout_secs must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Chat-completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL (without `/chat/completions`)
    pub base_url: String,
    /// Bearer credential; never serialized
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// The single model used for every fallback call
    pub model: String,
    /// Sampling temperature (pinned to 0 by default)
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Strip everything but letters, digits and whitespace from replies.
    /// Lossy: "0.5154" becomes "05154".
    #[serde(default)]
    pub sanitize_reply: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://aiproxy.sanand.workers.dev/openai/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 30,
            sanitize_reply: false,
        }
    }
}

/// Known-answer table configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerTableConfig {
    /// How stored questions are compared against incoming ones
    #[serde(default)]
    pub match_policy: MatchPolicy,
    /// Extra entries, appended after the built-in ones
    #[serde(default)]
    pub entries: Vec<QuestionAnswerEntry>,
}

/// File interpreter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Root for per-request scratch directories (default: system temp dir)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    /// Maximum characters of file text passed to the model as context
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
    /// Send files that match no rule to the model instead of answering with the sentinel
    #[serde(default)]
    pub model_on_unmatched_file: bool,
    /// Maximum total uncompressed size of an uploaded archive (default: 200MB)
    #[serde(default = "default_max_extracted_size")]
    pub max_extracted_size: u64,
}

fn default_context_chars() -> usize { 4000 }

fn default_max_extracted_size() -> u64 { 200 * 1024 * 1024 }

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            context_chars: default_context_chars(),
            model_on_unmatched_file: false,
            max_extracted_size: default_max_extracted_size(),
        }
    }
}
