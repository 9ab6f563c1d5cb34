//! Chat completion client used when an agent delegates to a language model.
//!
//! The [`LlmClient`] trait is the seam: agents only ever see the trait, the
//! server wires in [`OpenAiClient`] when a credential is configured.

pub mod client;
pub mod config;
pub mod openai;

pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{DEFAULT_MODEL, LlmConfig, build_llm_client};
pub use openai::OpenAiClient;
