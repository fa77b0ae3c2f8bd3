use captain_types::ErrorKind;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The database could not be opened. Persistence is off for the session.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Failed to access {collection}: {reason}")]
    Persistence { collection: String, reason: String },
    #[error("Duplicate key in {collection}")]
    DuplicateKey { collection: String },
    #[error("No {collection} record for {key}")]
    NotFound { collection: String, key: String },
    #[error("Username must not be empty")]
    InvalidUsername,
    #[error("Accuracy must be between 0 and 100, got {0}")]
    InvalidAccuracy(u8),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            StoreError::Persistence { .. } => ErrorKind::PersistenceError,
            StoreError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::InvalidUsername | StoreError::InvalidAccuracy(_) => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn corrupt(collection: &str, reason: impl Into<String>) -> Self {
        StoreError::Persistence {
            collection: collection.to_string(),
            reason: reason.into(),
        }
    }
}
