//! Coordinator routing decisions.

use serde::{Deserialize, Serialize};

const GREETING_KEYWORDS: [&str; 2] = ["greet", "hello"];
const TASK_KEYWORDS: [&str; 4] = ["task", "time", "execute", "perform"];

/// Where the coordinator sends a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorRoute {
    /// Hand off to the greeting delegate
    Greeter,
    /// Hand off to the task delegate
    TaskExecutor,
    /// Answer directly with what the coordinator can do
    Capabilities,
}

impl CoordinatorRoute {
    /// Decide a route from the query text. Greeting keywords win over task
    /// keywords; matching is case-insensitive substring search.
    pub fn for_query(query: &str) -> Self {
        let lower = query.to_lowercase();

        if contains_any(&lower, &GREETING_KEYWORDS) {
            CoordinatorRoute::Greeter
        } else if contains_any(&lower, &TASK_KEYWORDS) {
            CoordinatorRoute::TaskExecutor
        } else {
            CoordinatorRoute::Capabilities
        }
    }

    /// Prefix wrapped around a delegate's reply, if this route delegates.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            CoordinatorRoute::Greeter => Some("[Coordinator] Routing to greeter: "),
            CoordinatorRoute::TaskExecutor => Some("[Coordinator] Routing to task executor: "),
            CoordinatorRoute::Capabilities => None,
        }
    }

    /// The reply as the coordinator reports it.
    pub fn wrap(&self, reply: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}{reply}"),
            None => reply.to_string(),
        }
    }
}

/// Substring test shared by the coordinator and the response policy.
pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
