//! Application state for the solver server

use std::sync::Arc;

use crate::config::SolverConfig;
use crate::error::Result;
use crate::providers::{ChatCompletionClient, LlmProvider};
use crate::resolution::Resolver;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: SolverConfig,
    /// Table -> file rules -> model pipeline
    resolver: Resolver,
}

impl AppState {
    /// Create application state with the configured chat-completion provider
    pub fn new(config: SolverConfig) -> Result<Self> {
        let provider = Arc::new(ChatCompletionClient::new(&config.llm)?);
        tracing::info!("Model provider initialized ({})", config.llm.model);
        Self::with_provider(config, provider)
    }

    /// Create application state around an explicit provider
    pub fn with_provider(config: SolverConfig, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        let resolver = Resolver::from_config(&config, provider)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, resolver }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &SolverConfig {
        &self.inner.config
    }

    /// Get the resolver
    pub fn resolver(&self) -> &Resolver {
        &self.inner.resolver
    }
}
