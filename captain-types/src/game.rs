use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ProjectId, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameKind {
    Generated, // Produced by the dream generator
    HandBuilt, // Assembled from blocks by the player
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Generated => "generated",
            GameKind::HandBuilt => "hand_built",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "generated" => Some(GameKind::Generated),
            "hand_built" => Some(GameKind::HandBuilt),
            _ => None,
        }
    }
}

/// A saved, playable game cartridge.
///
/// `code` is a self-contained HTML/JS document from an untrusted source. It must
/// only ever be rendered inside a sandboxed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameProject {
    pub id: ProjectId,
    pub name: String,
    pub code: String,
    #[ts(type = "number")]
    pub created_at: Timestamp,
    pub kind: GameKind,
    pub user_id: UserId,
}

/// What the generative content provider hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeneratedGame {
    pub explanation: String,
    pub code: String,
}
