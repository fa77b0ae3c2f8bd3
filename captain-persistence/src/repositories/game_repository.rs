use std::sync::Arc;

use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::entities::{games, prelude::*};
use crate::{LocalStore, StoreError};
use captain_types::{GameKind, GameProject};

/// Saved game cartridges. Records are immutable once written.
#[derive(Clone)]
pub struct GameRepository {
    store: Arc<LocalStore>,
}

impl GameRepository {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    fn model_to_project(model: games::Model) -> Result<GameProject, StoreError> {
        let kind = GameKind::parse(&model.kind).ok_or_else(|| {
            StoreError::corrupt("games", format!("unknown game kind: {}", model.kind))
        })?;

        Ok(GameProject {
            id: model.id,
            name: model.name,
            code: model.code,
            created_at: model.created_at,
            kind,
            user_id: model.user_id,
        })
    }

    fn models_to_projects(models: Vec<games::Model>) -> Result<Vec<GameProject>, StoreError> {
        models.into_iter().map(Self::model_to_project).collect()
    }

    pub async fn save(&self, project: &GameProject) -> Result<(), StoreError> {
        let model = games::ActiveModel {
            id: Set(project.id),
            name: Set(project.name.clone()),
            code: Set(project.code.clone()),
            created_at: Set(project.created_at),
            kind: Set(project.kind.as_str().to_string()),
            user_id: Set(project.user_id),
        };

        self.store.add(model).await?;
        tracing::info!(
            "Saved {} game '{}' for user {}",
            project.kind.as_str(),
            project.name,
            project.user_id
        );
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GameProject>, StoreError> {
        self.store
            .get::<Games>(id)
            .await?
            .map(Self::model_to_project)
            .transpose()
    }

    /// Every game owned by `user_id`, in no particular order.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GameProject>, StoreError> {
        let models = self
            .store
            .list_all::<Games>(Some((games::Column::UserId, user_id.into())))
            .await?;
        Self::models_to_projects(models)
    }

    pub async fn list_all(&self) -> Result<Vec<GameProject>, StoreError> {
        let models = self.store.list_all::<Games>(None).await?;
        Self::models_to_projects(models)
    }
}
