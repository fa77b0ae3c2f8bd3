use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Reply};

use crate::dream::DreamService;
use crate::generator::{GenerationRequest, ImageAttachment};
use captain_core::words_per_minute;
use captain_persistence::repositories::{GameRepository, TypingResultRepository, UserRepository};
use captain_persistence::StoreError;
use captain_types::{
    ErrorKind, ErrorResponse, GenerateGameRequest, LoginRequest, RewardEvent, RewardRequest,
    TypingCompletion, TypingCompletionResponse,
};

pub mod config;
pub mod dream;
pub mod generator;
pub mod sandbox;

// The trainer only completes on an exact match, so finished runs are perfect.
const COMPLETED_RUN_ACCURACY: u8 = 100;

const JSON_BODY_LIMIT: u64 = 16 * 1024;
// Room for an uploaded sketch
const GENERATE_BODY_LIMIT: u64 = 10 * 1024 * 1024;

pub fn create_routes(
    user_repository: Arc<UserRepository>,
    game_repository: Arc<GameRepository>,
    typing_repository: Arc<TypingResultRepository>,
    dream_service: Arc<DreamService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let users_filter = warp::any().map({
        let user_repository = user_repository.clone();
        move || user_repository.clone()
    });

    let games_filter = warp::any().map({
        let game_repository = game_repository.clone();
        move || game_repository.clone()
    });

    let typing_filter = warp::any().map({
        let typing_repository = typing_repository.clone();
        move || typing_repository.clone()
    });

    let dream_filter = warp::any().map({
        let dream_service = dream_service.clone();
        move || dream_service.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let login = warp::path!("api" / "login")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json::<LoginRequest>())
        .and(users_filter.clone())
        .and_then(handle_login);

    let profile = warp::path!("api" / "users" / String)
        .and(warp::get())
        .and(users_filter.clone())
        .and_then(handle_get_profile);

    let rewards = warp::path!("api" / "users" / String / "rewards")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json::<RewardRequest>())
        .and(users_filter.clone())
        .and_then(handle_reward);

    let typing_results = warp::path!("api" / "users" / String / "typing-results")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json::<TypingCompletion>())
        .and(typing_filter.clone())
        .and(users_filter.clone())
        .and_then(handle_typing_result);

    let user_games = warp::path!("api" / "users" / String / "games")
        .and(warp::get())
        .and(games_filter.clone())
        .and_then(handle_list_user_games);

    let generate = warp::path!("api" / "users" / String / "games" / "generate")
        .and(warp::post())
        .and(warp::body::content_length_limit(GENERATE_BODY_LIMIT))
        .and(warp::body::json::<GenerateGameRequest>())
        .and(dream_filter.clone())
        .and_then(handle_generate);

    let all_games = warp::path!("api" / "games")
        .and(warp::get())
        .and(games_filter.clone())
        .and_then(handle_list_all_games);

    // Untrusted payloads, served only under the sandbox policy
    let play = warp::path!("play" / String)
        .and(warp::get())
        .and(games_filter.clone())
        .and_then(handle_play);

    // Gallery view: the payload framed inline, never on the host origin
    let embed = warp::path!("embed" / String)
        .and(warp::get())
        .and(games_filter.clone())
        .and_then(handle_embed);

    health
        .or(login)
        .or(profile)
        .or(rewards)
        .or(typing_results)
        .or(user_games)
        .or(generate)
        .or(all_games)
        .or(play)
        .or(embed)
        .recover(handle_rejection)
        .with(warp::log("code_captain"))
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::PersistenceError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::DuplicateKey => StatusCode::CONFLICT,
        ErrorKind::GenerationFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
    }
}

fn error_reply(kind: ErrorKind) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(kind)), status_for(kind))
        .into_response()
}

fn store_error_reply(context: &str, err: StoreError) -> warp::reply::Response {
    match &err {
        StoreError::InvalidUsername
        | StoreError::InvalidAccuracy(_)
        | StoreError::NotFound { .. } => {
            tracing::debug!("{}: {}", context, err)
        }
        _ => tracing::error!("{}: {}", context, err),
    }
    error_reply(err.kind())
}

/// Turns filter rejections (bad bodies, unknown paths) into the same JSON
/// error shape the handlers produce.
async fn handle_rejection(err: warp::Rejection) -> Result<warp::reply::Response, warp::Rejection> {
    if err.is_not_found() {
        return Ok(error_reply(ErrorKind::NotFound));
    }

    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        tracing::debug!("Rejected request body: {}", e);
        return Ok(error_reply(ErrorKind::InvalidInput));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(warp::reply::with_status(
            warp::reply::json(&ErrorResponse::new(ErrorKind::InvalidInput)),
            StatusCode::PAYLOAD_TOO_LARGE,
        )
        .into_response());
    }

    if err.find::<warp::reject::LengthRequired>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        return Ok(error_reply(ErrorKind::InvalidInput));
    }

    Err(err)
}

fn parse_id(id: &str) -> Result<Uuid, warp::reply::Response> {
    Uuid::parse_str(id).map_err(|_| error_reply(ErrorKind::InvalidInput))
}

async fn handle_login(
    request: LoginRequest,
    users: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match users.login_or_create(&request.username).await {
        Ok(profile) => Ok(warp::reply::json(&profile).into_response()),
        Err(e) => Ok(store_error_reply("Login failed", e)),
    }
}

async fn handle_get_profile(
    user_id: String,
    users: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let user_id = match parse_id(&user_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    match users.find_by_id(user_id).await {
        Ok(Some(profile)) => Ok(warp::reply::json(&profile).into_response()),
        Ok(None) => Ok(error_reply(ErrorKind::NotFound)),
        Err(e) => Ok(store_error_reply("Profile lookup failed", e)),
    }
}

async fn handle_reward(
    user_id: String,
    request: RewardRequest,
    users: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let user_id = match parse_id(&user_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    match users.award(user_id, request.event).await {
        Ok(profile) => Ok(warp::reply::json(&profile).into_response()),
        Err(e) => Ok(store_error_reply("Reward failed", e)),
    }
}

async fn handle_typing_result(
    user_id: String,
    completion: TypingCompletion,
    typing: Arc<TypingResultRepository>,
    users: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let user_id = match parse_id(&user_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    let language = completion.language.trim();
    if language.is_empty() {
        return Ok(error_reply(ErrorKind::InvalidInput));
    }

    match users.find_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(error_reply(ErrorKind::NotFound)),
        Err(e) => return Ok(store_error_reply("Profile lookup failed", e)),
    }

    let wpm = words_per_minute(
        completion.chars_typed,
        Duration::from_millis(completion.elapsed_ms),
    );

    let result = match typing
        .record(user_id, language, wpm, COMPLETED_RUN_ACCURACY)
        .await
    {
        Ok(result) => result,
        Err(e) => return Ok(store_error_reply("Saving typing result failed", e)),
    };

    match users.award(user_id, RewardEvent::TypingComplete).await {
        Ok(profile) => Ok(
            warp::reply::json(&TypingCompletionResponse { result, profile }).into_response(),
        ),
        Err(e) => Ok(store_error_reply("Reward failed", e)),
    }
}

async fn handle_list_user_games(
    user_id: String,
    games: Arc<GameRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let user_id = match parse_id(&user_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    match games.list_for_user(user_id).await {
        Ok(projects) => Ok(warp::reply::json(&projects).into_response()),
        Err(e) => Ok(store_error_reply("Listing games failed", e)),
    }
}

async fn handle_list_all_games(
    games: Arc<GameRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match games.list_all().await {
        Ok(projects) => Ok(warp::reply::json(&projects).into_response()),
        Err(e) => Ok(store_error_reply("Listing games failed", e)),
    }
}

async fn handle_generate(
    user_id: String,
    request: GenerateGameRequest,
    dream: Arc<DreamService>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let user_id = match parse_id(&user_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    let image = match request.image {
        Some(upload) => {
            match base64::engine::general_purpose::STANDARD.decode(upload.data_base64.as_bytes()) {
                Ok(data) => Some(ImageAttachment {
                    mime_type: upload.mime_type,
                    data,
                }),
                Err(e) => {
                    tracing::debug!("Rejected sketch upload: {:?}", e);
                    return Ok(error_reply(ErrorKind::InvalidInput));
                }
            }
        }
        None => None,
    };

    let generation = GenerationRequest {
        prompt: request.prompt,
        image,
    };

    match dream.create(user_id, &request.name, generation).await {
        Ok(outcome) => Ok(warp::reply::json(&outcome).into_response()),
        Err(e) => {
            tracing::warn!("Dream request for user {} failed: {}", user_id, e);
            Ok(error_reply(e.kind()))
        }
    }
}

async fn handle_play(
    game_id: String,
    games: Arc<GameRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let game_id = match parse_id(&game_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    match games.find_by_id(game_id).await {
        Ok(Some(project)) => Ok(sandbox::sandboxed_document(project.code)),
        Ok(None) => Ok(error_reply(ErrorKind::NotFound)),
        Err(e) => Ok(store_error_reply("Loading game failed", e)),
    }
}

async fn handle_embed(
    game_id: String,
    games: Arc<GameRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let game_id = match parse_id(&game_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    match games.find_by_id(game_id).await {
        Ok(Some(project)) => Ok(sandbox::embed_page(&project.name, &project.code)),
        Ok(None) => Ok(error_reply(ErrorKind::NotFound)),
        Err(e) => Ok(store_error_reply("Loading game failed", e)),
    }
}
