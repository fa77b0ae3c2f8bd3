use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub xp: u32,
    pub stars: u32,
    /// Always `xp / 100 + 1`; recomputed whenever xp changes.
    pub level: u32,
    #[ts(type = "number")]
    pub created_at: Timestamp,
}

/// Gameplay events that earn a reward once completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RewardEvent {
    AstroNavComplete,
    TypingComplete,
    GameGenerated,
}

impl RewardEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardEvent::AstroNavComplete => "astro_nav_complete",
            RewardEvent::TypingComplete => "typing_complete",
            RewardEvent::GameGenerated => "game_generated",
        }
    }
}
