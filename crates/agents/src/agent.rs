//! Agent identity and the `respond` entry point.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use concierge_common::ConciergeError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::CompletionProvider;

const GREETER_DESCRIPTION: &str = "I specialize in greeting users and making them feel welcome.";
const TASK_EXECUTOR_DESCRIPTION: &str = "I specialize in executing tasks and getting things done.";
const COORDINATOR_DESCRIPTION: &str = "I coordinate greetings and tasks.";

/// Tools advertised by the task executor. Each one is a branch of the
/// response policy, not something invoked dynamically.
pub const TASK_EXECUTOR_TOOLS: [&str; 2] = ["perform_task", "get_current_time"];

/// The closed set of agents the gateway knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Greeter,
    TaskExecutor,
    Coordinator,
}

impl AgentName {
    /// All agents, in registration order.
    pub const ALL: [AgentName; 3] = [
        AgentName::Greeter,
        AgentName::TaskExecutor,
        AgentName::Coordinator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::Greeter => "greeter",
            AgentName::TaskExecutor => "task_executor",
            AgentName::Coordinator => "coordinator",
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentName {
    type Err = ConciergeError;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConciergeError::Agent(format!("Agent '{s}' not found")))
    }
}

/// What an agent is, together with anything only that kind of agent holds.
pub enum Persona {
    Greeter,
    TaskExecutor,
    /// Delegates are named rather than positional; either may be absent, in
    /// which case the coordinator answers that branch itself.
    Coordinator {
        greeting: Option<Arc<Agent>>,
        task: Option<Arc<Agent>>,
    },
}

/// A stateless responder. Cheap to share behind an `Arc`; nothing in here
/// changes after construction.
pub struct Agent {
    persona: Persona,
    description: String,
    tools: Vec<String>,
    provider: Arc<dyn CompletionProvider>,
}

impl Agent {
    pub fn greeter(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            persona: Persona::Greeter,
            description: GREETER_DESCRIPTION.into(),
            tools: Vec::new(),
            provider,
        }
    }

    pub fn task_executor(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            persona: Persona::TaskExecutor,
            description: TASK_EXECUTOR_DESCRIPTION.into(),
            tools: TASK_EXECUTOR_TOOLS.iter().map(|t| t.to_string()).collect(),
            provider,
        }
    }

    pub fn coordinator(
        provider: Arc<dyn CompletionProvider>,
        greeting: Option<Arc<Agent>>,
        task: Option<Arc<Agent>>,
    ) -> Self {
        Self {
            persona: Persona::Coordinator { greeting, task },
            description: COORDINATOR_DESCRIPTION.into(),
            tools: Vec::new(),
            provider,
        }
    }

    pub fn name(&self) -> AgentName {
        match self.persona {
            Persona::Greeter => AgentName::Greeter,
            Persona::TaskExecutor => AgentName::TaskExecutor,
            Persona::Coordinator { .. } => AgentName::Coordinator,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn has_delegates(&self) -> bool {
        matches!(
            self.persona,
            Persona::Coordinator { ref greeting, ref task } if greeting.is_some() || task.is_some()
        )
    }

    /// Preamble sent as the system message when delegating to a model.
    pub fn system_prompt(&self) -> String {
        format!("You are {}. {}", self.name(), self.description)
    }

    /// Plain self-introduction: `"I'm {name}. {description}"`.
    pub fn introduction(&self) -> String {
        format!("I'm {}. {}", self.name(), self.description)
    }

    pub fn uses_completion_service(&self) -> bool {
        self.provider.is_external()
    }

    /// Answer a query. Never fails: provider errors become the reply text.
    pub async fn respond(&self, query: &str) -> String {
        debug!(
            agent = %self.name(),
            external = self.provider.is_external(),
            "Responding to query"
        );

        match self.provider.complete(self, query).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(agent = %self.name(), error = %e, "Completion failed");
                format!("OpenAI API Error: {}", e.message())
            }
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name())
            .field("tools", &self.tools)
            .field("has_delegates", &self.has_delegates())
            .finish()
    }
}
