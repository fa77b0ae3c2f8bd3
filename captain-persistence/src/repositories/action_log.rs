use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use tokio::task::JoinHandle;

use crate::entities::logs;
use crate::{LocalStore, StoreError};

/// Append-only telemetry.
///
/// Writes are fire-and-forget: a dropped entry is an accepted loss and is
/// only reported through `tracing`, never to the caller.
#[derive(Clone)]
pub struct ActionLog {
    store: Arc<LocalStore>,
}

impl ActionLog {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Queue an entry and return immediately. The handle only signals that the
    /// attempt finished; it carries no success or failure.
    pub fn record(&self, action: &str, details: impl Into<String>) -> JoinHandle<()> {
        let store = self.store.clone();
        let action = action.to_string();
        let details = details.into();

        tokio::spawn(async move {
            if let Err(e) = append(&store, &action, details).await {
                tracing::warn!("Dropped {} log entry: {}", action, e);
            }
        })
    }
}

async fn append(store: &LocalStore, action: &str, details: String) -> Result<i64, StoreError> {
    let entry = logs::ActiveModel {
        id: NotSet,
        action: Set(action.to_string()),
        details: Set(details),
        timestamp: Set(super::now_millis()),
    };
    store.add(entry).await
}
