//! Completion providers: where an agent's reply actually comes from.

use std::sync::Arc;

use async_trait::async_trait;
use concierge_common::Result;
use concierge_llm::{LlmClient, LlmConfig, LlmRequest};
use tracing::debug;

use crate::agent::{Agent, Persona};
use crate::policy;
use crate::routing::CoordinatorRoute;

/// Produces the reply for one agent and one query.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, agent: &Agent, query: &str) -> Result<String>;

    /// True when replies come from an external service.
    fn is_external(&self) -> bool;
}

/// Keyword rules from [`policy`]; never fails.
///
/// A coordinator routes the query and wraps the chosen delegate's own
/// `respond`, whatever provider that delegate runs on. Branches without a
/// delegate fall back to the policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCompletion;

#[async_trait]
impl CompletionProvider for RuleCompletion {
    async fn complete(&self, agent: &Agent, query: &str) -> Result<String> {
        if let Persona::Coordinator { greeting, task } = agent.persona() {
            let route = CoordinatorRoute::for_query(query);
            debug!(route = ?route, "Coordinator routing decision");

            let delegate = match route {
                CoordinatorRoute::Greeter => greeting.as_ref(),
                CoordinatorRoute::TaskExecutor => task.as_ref(),
                CoordinatorRoute::Capabilities => None,
            };
            if let Some(delegate) = delegate {
                let reply = delegate.respond(query).await;
                return Ok(route.wrap(&reply));
            }
        }

        Ok(policy::resolve(agent, query))
    }

    fn is_external(&self) -> bool {
        false
    }
}

/// Delegates to a language model with the agent's system prompt.
pub struct LlmCompletion {
    client: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmCompletion {
    pub fn new(client: Arc<dyn LlmClient>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client,
            temperature,
            max_tokens,
        }
    }

    /// Sampling settings taken from the configuration.
    pub fn from_config(client: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self::new(client, config.temperature, config.max_tokens)
    }

    fn build_request(&self, agent: &Agent, query: &str) -> LlmRequest {
        LlmRequest::single_turn(agent.system_prompt(), query)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl CompletionProvider for LlmCompletion {
    async fn complete(&self, agent: &Agent, query: &str) -> Result<String> {
        let response = self.client.complete(self.build_request(agent, query)).await?;

        debug!(
            agent = %agent.name(),
            model = %response.model,
            finish_reason = ?response.finish_reason,
            "Completion received"
        );

        Ok(response.content.trim().to_string())
    }

    fn is_external(&self) -> bool {
        true
    }
}
