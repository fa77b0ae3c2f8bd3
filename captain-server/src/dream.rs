use std::sync::Arc;

use uuid::Uuid;

use crate::generator::{GameGenerator, GenerationFailed, GenerationRequest};
use captain_persistence::repositories::{GameRepository, UserRepository};
use captain_persistence::StoreError;
use captain_types::{ErrorKind, GameKind, GameProject, GenerateGameResponse, RewardEvent};

#[derive(Debug, thiserror::Error)]
pub enum DreamError {
    #[error("A game needs a name and a description or a sketch")]
    InvalidRequest,
    #[error(transparent)]
    Generation(#[from] GenerationFailed),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DreamError::InvalidRequest => ErrorKind::InvalidInput,
            DreamError::Generation(_) => ErrorKind::GenerationFailed,
            DreamError::Store(e) => e.kind(),
        }
    }
}

/// "Describe your game and get one": generate, save, reward.
pub struct DreamService {
    generator: Arc<dyn GameGenerator>,
    users: UserRepository,
    games: GameRepository,
}

impl DreamService {
    pub fn new(
        generator: Arc<dyn GameGenerator>,
        users: UserRepository,
        games: GameRepository,
    ) -> Self {
        Self {
            generator,
            users,
            games,
        }
    }

    /// Nothing is written unless generation succeeds.
    pub async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        request: GenerationRequest,
    ) -> Result<GenerateGameResponse, DreamError> {
        let name = name.trim();
        if name.is_empty() || (request.prompt.trim().is_empty() && request.image.is_none()) {
            return Err(DreamError::InvalidRequest);
        }

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(StoreError::NotFound {
                collection: "users".to_string(),
                key: user_id.to_string(),
            }
            .into());
        }

        let generated = self.generator.generate(&request).await?;

        let game = GameProject {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code: generated.code,
            created_at: chrono::Utc::now().timestamp_millis(),
            kind: GameKind::Generated,
            user_id,
        };
        self.games.save(&game).await?;

        let profile = self.users.award(user_id, RewardEvent::GameGenerated).await?;

        Ok(GenerateGameResponse {
            explanation: generated.explanation,
            game,
            profile,
        })
    }
}
