//! Application state for the API server.

use concierge_agents::AgentRegistry;
use concierge_llm::{LlmConfig, build_llm_client};
use std::sync::Arc;
use tracing::{info, warn};

/// Default request body limit (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Shared application state for the API server.
pub struct AppState {
    /// The fixed agent set every request is answered by
    pub registry: Arc<AgentRegistry>,

    /// Maximum accepted request body size in bytes
    pub body_limit: usize,

    /// Server start time (for the status endpoint)
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            body_limit: DEFAULT_BODY_LIMIT,
            start_time: std::time::Instant::now(),
        }
    }

    /// State whose agents answer from the keyword rules.
    pub fn simulated() -> Self {
        Self::new(AgentRegistry::simulated())
    }

    /// Pick the delegation mode from the completion settings: a usable API
    /// key means every agent talks to the model, otherwise simulated replies.
    pub fn from_llm_config(config: &LlmConfig) -> concierge_common::Result<Self> {
        if !config.is_enabled() {
            warn!("OPENAI_API_KEY not set. Using simulated responses.");
            return Ok(Self::simulated());
        }

        if !config.key_looks_valid() {
            warn!("The API key format doesn't look like a standard OpenAI key (expected 'sk-' prefix)");
        }

        let client = build_llm_client(config)?;
        info!(model = %client.model_name(), "Completion service enabled");

        Ok(Self::new(AgentRegistry::with_llm(client, config)))
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn openai_enabled(&self) -> bool {
        self.registry.uses_completion_service()
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
