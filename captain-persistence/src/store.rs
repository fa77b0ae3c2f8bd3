use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, Iterable, PrimaryKeyTrait, QueryFilter, SqlErr, Value,
};
use tokio::sync::OnceCell;

use crate::connection::{connect_and_migrate, DEFAULT_DATABASE_URL, MEMORY_DATABASE_URL};
use crate::error::StoreError;

type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Handle to the local database.
///
/// Construct one per process and share it behind an `Arc`. The connection is
/// opened lazily by the first caller of [`LocalStore::open`]; callers that
/// arrive while it is in flight wait on the same attempt. An open failure is
/// kept for the life of the handle, so every later call reports
/// `StorageUnavailable` without reconnecting.
///
/// Every operation touches exactly one collection (one entity type).
pub struct LocalStore {
    database_url: String,
    connection: OnceCell<Result<DatabaseConnection, String>>,
}

impl LocalStore {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            connection: OnceCell::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MEMORY_DATABASE_URL)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub async fn open(&self) -> Result<&DatabaseConnection, StoreError> {
        let state = self
            .connection
            .get_or_init(|| async {
                match connect_and_migrate(&self.database_url).await {
                    Ok(db) => {
                        tracing::info!("Opened local store at {}", self.database_url);
                        Ok(db)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to open local store at {}: {}",
                            self.database_url,
                            e
                        );
                        Err(e.to_string())
                    }
                }
            })
            .await;

        state
            .as_ref()
            .map_err(|reason| StoreError::StorageUnavailable(reason.clone()))
    }

    pub async fn get<E>(&self, key: PrimaryKeyOf<E>) -> Result<Option<E::Model>, StoreError>
    where
        E: EntityTrait,
    {
        let db = self.open().await?;
        E::find_by_id(key)
            .one(db)
            .await
            .map_err(classify_error::<E>)
    }

    /// Lookup through a secondary field. Returns the first match.
    pub async fn get_by_index<E, V>(
        &self,
        column: E::Column,
        value: V,
    ) -> Result<Option<E::Model>, StoreError>
    where
        E: EntityTrait,
        V: Into<Value>,
    {
        let db = self.open().await?;
        E::find()
            .filter(column.eq(value))
            .one(db)
            .await
            .map_err(classify_error::<E>)
    }

    /// Insert or replace by primary key.
    pub async fn put<A>(&self, model: A) -> Result<(), StoreError>
    where
        A: ActiveModelTrait + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let db = self.open().await?;
        let on_conflict = OnConflict::columns(<A::Entity as EntityTrait>::PrimaryKey::iter())
            .update_columns(<A::Entity as EntityTrait>::Column::iter())
            .to_owned();

        <A::Entity as EntityTrait>::insert(model)
            .on_conflict(on_conflict)
            .exec_without_returning(db)
            .await
            .map_err(classify_error::<A::Entity>)?;
        Ok(())
    }

    /// Insert a new record, failing with `DuplicateKey` if the key is taken.
    /// Returns the primary key, which the engine assigns when left unset.
    pub async fn add<A>(&self, model: A) -> Result<PrimaryKeyOf<A::Entity>, StoreError>
    where
        A: ActiveModelTrait + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let db = self.open().await?;
        let result = <A::Entity as EntityTrait>::insert(model)
            .exec(db)
            .await
            .map_err(classify_error::<A::Entity>)?;
        Ok(result.last_insert_id)
    }

    /// Every record in the collection, optionally narrowed to those whose
    /// `column` equals a value. No pagination.
    pub async fn list_all<E>(
        &self,
        filter: Option<(E::Column, Value)>,
    ) -> Result<Vec<E::Model>, StoreError>
    where
        E: EntityTrait,
    {
        let db = self.open().await?;
        let mut query = E::find();
        if let Some((column, value)) = filter {
            query = query.filter(column.eq(value));
        }
        query.all(db).await.map_err(classify_error::<E>)
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}

pub(crate) fn collection_name<E: EntityTrait>() -> String {
    E::default().table_name().to_string()
}

fn classify_error<E: EntityTrait>(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::DuplicateKey {
            collection: collection_name::<E>(),
        },
        _ => StoreError::Persistence {
            collection: collection_name::<E>(),
            reason: err.to_string(),
        },
    }
}
