use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NationError {
    #[error("No nation loaded for user {user_id} in slot {slot}")]
    NoNation { user_id: String, slot: u8 },

    #[error("Invalid slot {0}: expected 1, 2 or 3")]
    InvalidSlot(u8),

    #[error("Issue generation already in flight for nation {0}")]
    GenerationInFlight(String),

    #[error("No current issue for nation {0}")]
    NoCurrentIssue(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NationError>;
