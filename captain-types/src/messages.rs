use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameProject, RewardEvent, TypingResult, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RewardRequest {
    pub event: RewardEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TypingCompletion {
    pub language: String,
    pub chars_typed: u32,
    #[ts(type = "number")]
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TypingCompletionResponse {
    pub result: TypingResult,
    pub profile: UserProfile,
}

/// An optional sketch uploaded alongside the game description.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImageUpload {
    pub mime_type: String,
    pub data_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerateGameRequest {
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerateGameResponse {
    pub explanation: String,
    pub game: GameProject,
    pub profile: UserProfile,
}
