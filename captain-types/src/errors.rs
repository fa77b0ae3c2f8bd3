use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Failure categories the screens know how to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ErrorKind {
    StorageUnavailable,
    PersistenceError,
    DuplicateKey,
    GenerationFailed,
    InvalidInput,
    NotFound,
}

impl ErrorKind {
    /// Child-friendly text shown by the UI.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            ErrorKind::StorageUnavailable => {
                "Ship's memory banks are offline. Progress can't be saved right now."
            }
            ErrorKind::PersistenceError => "Couldn't save that to the ship's log. Try again!",
            ErrorKind::DuplicateKey => "That record already exists.",
            ErrorKind::GenerationFailed => "Mission Abort! Communication error with the AI Core.",
            ErrorKind::InvalidInput => "Something is missing. Check your mission details!",
            ErrorKind::NotFound => "We couldn't find that in the ship's records.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: ErrorKind) -> Self {
        Self {
            error,
            message: error.friendly_message().to_string(),
        }
    }
}
