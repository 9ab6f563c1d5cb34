//! Error types for Concierge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConciergeError {
    #[error("Agent error: {0}")]
    Agent(String),

    /// A failure reported by the external completion service. The payload is
    /// the bare service message, without any prefix.
    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConciergeError {
    /// The message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Agent(msg) | Self::Completion(msg) | Self::Config(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConciergeError>;
