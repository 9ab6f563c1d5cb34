//! The fixed set of agents served by the gateway.

use std::sync::Arc;

use concierge_llm::{LlmClient, LlmConfig};
use tracing::info;

use crate::agent::{Agent, AgentName};
use crate::provider::{CompletionProvider, LlmCompletion, RuleCompletion};

/// Immutable name → agent mapping, built once at startup.
#[derive(Debug)]
pub struct AgentRegistry {
    greeter: Arc<Agent>,
    task_executor: Arc<Agent>,
    coordinator: Arc<Agent>,
    uses_completion_service: bool,
}

impl AgentRegistry {
    /// Build all three agents around one provider. The coordinator gets the
    /// greeter and the task executor as its delegates.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        let uses_completion_service = provider.is_external();

        let greeter = Arc::new(Agent::greeter(provider.clone()));
        let task_executor = Arc::new(Agent::task_executor(provider.clone()));
        let coordinator = Arc::new(Agent::coordinator(
            provider,
            Some(greeter.clone()),
            Some(task_executor.clone()),
        ));

        info!(
            agents = ?AgentName::ALL.map(|n| n.as_str()),
            uses_completion_service,
            "Agent registry initialized"
        );

        Self {
            greeter,
            task_executor,
            coordinator,
            uses_completion_service,
        }
    }

    /// Registry answering from the keyword rules only.
    pub fn simulated() -> Self {
        Self::new(Arc::new(RuleCompletion))
    }

    /// Registry answering through a language model.
    pub fn with_llm(client: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self::new(Arc::new(LlmCompletion::from_config(client, config)))
    }

    pub fn get(&self, name: AgentName) -> &Arc<Agent> {
        match name {
            AgentName::Greeter => &self.greeter,
            AgentName::TaskExecutor => &self.task_executor,
            AgentName::Coordinator => &self.coordinator,
        }
    }

    /// Look an agent up by its wire name.
    pub fn lookup(&self, name: &str) -> Option<&Arc<Agent>> {
        name.parse::<AgentName>().ok().map(|name| self.get(name))
    }

    /// Agent names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        AgentName::ALL.iter().map(AgentName::as_str).collect()
    }

    pub fn agents(&self) -> impl Iterator<Item = &Arc<Agent>> {
        AgentName::ALL.into_iter().map(|name| self.get(name))
    }

    /// Process-wide delegation mode, reported as `openai_enabled`/`openai_used`.
    pub fn uses_completion_service(&self) -> bool {
        self.uses_completion_service
    }
}
