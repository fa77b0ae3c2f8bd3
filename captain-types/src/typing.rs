use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TypingResult {
    pub id: Uuid,
    pub user_id: UserId,
    pub language: String,
    pub wpm: u32,
    pub accuracy: u8, // 0-100
    #[ts(type = "number")]
    pub timestamp: Timestamp,
}
