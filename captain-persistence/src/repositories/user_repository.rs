use std::sync::Arc;

use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::entities::{prelude::*, users};
use crate::repositories::ActionLog;
use crate::{LocalStore, StoreError};
use captain_core::{apply_event, level_for_xp, Reward};
use captain_types::{RewardEvent, UserProfile};

/// Session/profile manager: the only path that creates a profile.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<LocalStore>,
    log: ActionLog,
}

impl UserRepository {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            log: ActionLog::new(store.clone()),
            store,
        }
    }

    fn model_to_profile(model: users::Model) -> Result<UserProfile, StoreError> {
        let field = |name: &str, value: i64| {
            u32::try_from(value)
                .map_err(|_| StoreError::corrupt("users", format!("{} out of range: {}", name, value)))
        };

        Ok(UserProfile {
            id: model.id,
            username: model.username,
            xp: field("xp", model.xp)?,
            stars: field("stars", model.stars)?,
            level: field("level", model.level)?,
            created_at: model.created_at,
        })
    }

    fn profile_to_model(profile: &UserProfile) -> users::ActiveModel {
        users::ActiveModel {
            id: Set(profile.id),
            username: Set(profile.username.clone()),
            xp: Set(i64::from(profile.xp)),
            stars: Set(i64::from(profile.stars)),
            level: Set(i64::from(level_for_xp(profile.xp))),
            created_at: Set(profile.created_at),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        self.store
            .get::<Users>(id)
            .await?
            .map(Self::model_to_profile)
            .transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        self.store
            .get_by_index::<Users, _>(users::Column::Username, username)
            .await?
            .map(Self::model_to_profile)
            .transpose()
    }

    /// Return the profile for `username`, creating a fresh one on first login.
    pub async fn login_or_create(&self, username: &str) -> Result<UserProfile, StoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(StoreError::InvalidUsername);
        }

        if let Some(existing) = self.find_by_username(username).await? {
            tracing::debug!("Welcome back {} ({})", existing.username, existing.id);
            return Ok(existing);
        }

        let profile = UserProfile {
            id: Uuid::new_v4(),
            username: username.to_string(),
            xp: 0,
            stars: 0,
            level: 1,
            created_at: super::now_millis(),
        };

        match self.store.add(Self::profile_to_model(&profile)).await {
            Ok(_) => {
                tracing::info!("Created profile {} for {}", profile.id, profile.username);
                Ok(profile)
            }
            // A concurrent login for the same new name got there first
            Err(StoreError::DuplicateKey { .. }) => {
                tracing::debug!("Lost create race for {}, reading winner", username);
                self.find_by_username(username)
                    .await?
                    .ok_or_else(|| StoreError::corrupt("users", "username conflict without a record"))
            }
            Err(e) => Err(e),
        }
    }

    /// Persist `profile`. The stored level is always derived from its xp.
    pub async fn save(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.store.put(Self::profile_to_model(profile)).await
    }

    /// Grant the reward for a finished round and persist the result.
    pub async fn award(&self, user_id: Uuid, event: RewardEvent) -> Result<UserProfile, StoreError> {
        let profile = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: "users".to_string(),
                key: user_id.to_string(),
            })?;

        let updated = apply_event(&profile, event);
        self.save(&updated).await?;

        if updated.level > profile.level {
            tracing::info!("{} reached level {}", updated.username, updated.level);
        }

        let _ = self.log.record(
            "LEVEL_COMPLETE",
            format!(
                "User {} gained {} XP",
                updated.username,
                Reward::for_event(event).xp
            ),
        );

        Ok(updated)
    }
}
