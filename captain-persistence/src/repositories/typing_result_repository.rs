use std::sync::Arc;

use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::entities::typing_results;
use crate::{LocalStore, StoreError};
use captain_core::is_valid_accuracy;
use captain_types::TypingResult;

#[derive(Clone)]
pub struct TypingResultRepository {
    store: Arc<LocalStore>,
}

impl TypingResultRepository {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Append one finished typing run.
    pub async fn record(
        &self,
        user_id: Uuid,
        language: &str,
        wpm: u32,
        accuracy: u8,
    ) -> Result<TypingResult, StoreError> {
        if !is_valid_accuracy(accuracy) {
            return Err(StoreError::InvalidAccuracy(accuracy));
        }

        let result = TypingResult {
            id: Uuid::new_v4(),
            user_id,
            language: language.to_string(),
            wpm,
            accuracy,
            timestamp: super::now_millis(),
        };

        let model = typing_results::ActiveModel {
            id: Set(result.id),
            user_id: Set(result.user_id),
            language: Set(result.language.clone()),
            wpm: Set(i64::from(result.wpm)),
            accuracy: Set(i32::from(result.accuracy)),
            timestamp: Set(result.timestamp),
        };
        self.store.add(model).await?;

        tracing::debug!(
            "Recorded {} wpm in {} for user {}",
            result.wpm,
            result.language,
            result.user_id
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::prelude::*;

    #[tokio::test]
    async fn test_record_appends_result() {
        let store = Arc::new(LocalStore::in_memory());
        let repo = TypingResultRepository::new(store.clone());
        let user_id = Uuid::new_v4();

        let result = repo.record(user_id, "Rust", 42, 100).await.unwrap();

        let rows = store
            .list_all::<TypingResults>(Some((
                typing_results::Column::UserId,
                user_id.into(),
            )))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, result.id);
        assert_eq!(rows[0].language, "Rust");
        assert_eq!(rows[0].wpm, 42);
    }

    #[tokio::test]
    async fn test_record_rejects_bad_accuracy() {
        let repo = TypingResultRepository::new(Arc::new(LocalStore::in_memory()));

        let result = repo.record(Uuid::new_v4(), "Go", 30, 101).await;
        assert!(matches!(result, Err(StoreError::InvalidAccuracy(_))));
    }
}
