//! Rule-based replies used when no language model is configured.
//!
//! Everything here is a pure function of the agent, the query and the clock.
//! The `*_at` variants take the clock reading explicitly.

use chrono::{Local, NaiveDateTime};
use crate::agent::{Agent, Persona};
use crate::routing::{CoordinatorRoute, contains_any};

const GREETING_WORDS: [&str; 4] = ["hello", "hi", "hey", "greet"];
const TIME_WORDS: [&str; 3] = ["time", "clock", "when"];
const TASK_WORDS: [&str; 5] = ["task", "do", "execute", "perform", "run"];

/// Words removed from a query to leave the task's name.
const TASK_NAME_NOISE: [&str; 3] = ["perform", "task", "execute"];
const DEFAULT_TASK_NAME: &str = "general task";

pub(crate) const COORDINATOR_CAPABILITIES: &str = "I'm the coordinator. I can route your requests to \
     specialized agents: greeter for welcomes, task_executor for tasks and time. What do you need?";
const COORDINATOR_GREETING: &str = "Hello from coordinator!";

/// Resolve a reply using the current local time.
pub fn resolve(agent: &Agent, query: &str) -> String {
    resolve_at(agent, query, Local::now().naive_local())
}

pub fn resolve_at(agent: &Agent, query: &str, now: NaiveDateTime) -> String {
    let lower = query.to_lowercase();

    match agent.persona() {
        Persona::Greeter => {
            if contains_any(&lower, &GREETING_WORDS) {
                format!(
                    "Hello! Welcome! I'm {} and I'm here to make you feel welcome. \
                     How can I assist you today?",
                    agent.name()
                )
            } else {
                format!("Greetings! I'm {}. {}", agent.name(), agent.description())
            }
        }

        Persona::TaskExecutor => {
            if contains_any(&lower, &TIME_WORDS) {
                current_time_at(now)
            } else if contains_any(&lower, &TASK_WORDS) {
                run_task_at(query, now)
            } else {
                format!(
                    "I'm {}. I can help you execute tasks and get the current time. \
                     What would you like me to do?",
                    agent.name()
                )
            }
        }

        // Delegation awaits the delegate's own provider and happens in
        // `RuleCompletion`; here the coordinator answers every branch itself.
        Persona::Coordinator { .. } => {
            let route = CoordinatorRoute::for_query(query);
            let reply = match route {
                CoordinatorRoute::Greeter => COORDINATOR_GREETING.to_string(),
                CoordinatorRoute::TaskExecutor => run_task_at(query, now),
                CoordinatorRoute::Capabilities => return COORDINATOR_CAPABILITIES.to_string(),
            };
            route.wrap(&reply)
        }
    }
}

/// `get_current_time`: `"The current time is YYYY-MM-DD HH:MM:SS"`.
pub fn current_time_at(now: NaiveDateTime) -> String {
    format!("The current time is {}", now.format("%Y-%m-%d %H:%M:%S"))
}

/// `perform_task`: report a task as done at `now`.
pub fn perform_task_at(task: &str, now: NaiveDateTime) -> String {
    format!(
        "Task completed: {task}. Status: Success at {}",
        now.format("%H:%M:%S")
    )
}

/// Strip the noise words from a query (case-sensitive, original casing kept)
/// and trim the ends. An empty remainder names the task `"general task"`.
pub fn task_name(query: &str) -> String {
    let stripped = TASK_NAME_NOISE
        .iter()
        .fold(query.to_string(), |acc, noise| acc.replace(noise, ""));

    match stripped.trim() {
        "" => DEFAULT_TASK_NAME.to_string(),
        name => name.to_string(),
    }
}

fn run_task_at(query: &str, now: NaiveDateTime) -> String {
    perform_task_at(&task_name(query), now)
}
