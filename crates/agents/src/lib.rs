//! Agent personas for the Concierge gateway.
//!
//! Three fixed agents answer queries:
//!
//! - **greeter**: welcomes the user
//! - **task_executor**: reports the time and "performs" tasks
//! - **coordinator**: routes each query to one of the two above
//!
//! ```text
//!                 ┌──────────────┐
//!   query ──────► │ coordinator  │
//!                 └──────┬───────┘
//!            greeting    │    task / time
//!          ┌─────────────┴─────────────┐
//!          ▼                           ▼
//!   ┌──────────────┐           ┌───────────────┐
//!   │   greeter    │           │ task_executor │
//!   └──────────────┘           └───────────────┘
//! ```
//!
//! Every agent answers through an injected [`CompletionProvider`]: either a
//! language model ([`LlmCompletion`]) or the keyword rules in [`policy`]
//! ([`RuleCompletion`]).

pub mod agent;
pub mod policy;
pub mod provider;
pub mod registry;
pub mod routing;

pub use agent::{Agent, AgentName, Persona};
pub use provider::{CompletionProvider, LlmCompletion, RuleCompletion};
pub use registry::AgentRegistry;
pub use routing::CoordinatorRoute;
