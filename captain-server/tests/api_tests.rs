
use captain_persistence::entities::prelude::*;
use captain_persistence::LocalStore;
use captain_server::sandbox::SANDBOX_POLICY;
use captain_types::{
    ErrorKind, ErrorResponse, GameKind, GameProject, GenerateGameResponse, TypingCompletionResponse,
    UserProfile,
};
use serde_json::json;
use test_helpers::{FakeGenerator, TestApp};
use uuid::Uuid;

const LAVA_GAME: &str = "<html><body><canvas></canvas><script>lava()</script></body></html>";

fn parse<T: serde::de::DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(FakeGenerator::failing());

    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&app.routes())
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "OK");
}

#[tokio::test]
async fn test_login_twice_returns_same_profile() {
    let app = TestApp::new(FakeGenerator::failing());
    let routes = app.routes();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = warp::test::request()
            .method("POST")
            .path("/api/login")
            .json(&json!({ "username": "Nova" }))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), 200);

        let profile: UserProfile = parse(response.body());
        assert_eq!(profile.username, "Nova");
        assert_eq!(profile.level, 1);
        ids.push(profile.id);
    }

    assert_eq!(ids[0], ids[1]);
    assert_eq!(app.store.list_all::<Users>(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_with_blank_name_is_rejected() {
    let app = TestApp::new(FakeGenerator::failing());

    let response = warp::test::request()
        .method("POST")
        .path("/api/login")
        .json(&json!({ "username": "   " }))
        .reply(&app.routes())
        .await;

    assert_eq!(response.status(), 400);
    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.error, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_get_profile() {
    let app = TestApp::new(FakeGenerator::failing());
    let player = app.login("Orion").await;
    let routes = app.routes();

    let found = warp::test::request()
        .path(&format!("/api/users/{}", player.id))
        .reply(&routes)
        .await;
    assert_eq!(found.status(), 200);
    assert_eq!(parse::<UserProfile>(found.body()), player);

    let missing = warp::test::request()
        .path(&format!("/api/users/{}", Uuid::new_v4()))
        .reply(&routes)
        .await;
    assert_eq!(missing.status(), 404);

    let malformed = warp::test::request()
        .path("/api/users/not-a-uuid")
        .reply(&routes)
        .await;
    assert_eq!(malformed.status(), 400);
}

#[tokio::test]
async fn test_reward_crosses_level_boundary() {
    let app = TestApp::new(FakeGenerator::failing());
    let player = app.login("Nova").await;
    let routes = app.routes();

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/users/{}/rewards", player.id))
        .json(&json!({ "event": "AstroNavComplete" }))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), 200);
    let profile: UserProfile = parse(response.body());
    assert_eq!(profile.xp, 100);
    assert_eq!(profile.stars, 1);
    assert_eq!(profile.level, 2);

    let stored = app.users.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(stored, profile);
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let app = TestApp::new(FakeGenerator::failing());
    let player = app.login("Nova").await;
    let routes = app.routes();

    let garbage = warp::test::request()
        .method("POST")
        .path("/api/login")
        .header("content-type", "application/json")
        .body("not json")
        .reply(&routes)
        .await;
    assert_eq!(garbage.status(), 400);
    let error: ErrorResponse = parse(garbage.body());
    assert_eq!(error.error, ErrorKind::InvalidInput);

    let unknown_event = warp::test::request()
        .method("POST")
        .path(&format!("/api/users/{}/rewards", player.id))
        .json(&json!({ "event": "Bogus" }))
        .reply(&routes)
        .await;
    assert_eq!(unknown_event.status(), 400);
    let error: ErrorResponse = parse(unknown_event.body());
    assert_eq!(error.error, ErrorKind::InvalidInput);

    let stored = app.users.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(stored, player);

    let nowhere = warp::test::request().path("/api/nowhere").reply(&routes).await;
    assert_eq!(nowhere.status(), 404);
    let error: ErrorResponse = parse(nowhere.body());
    assert_eq!(error.error, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_typing_completion_records_and_rewards() {
    let app = TestApp::new(FakeGenerator::failing());
    let player = app.login("Vega").await;

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/users/{}/typing-results", player.id))
        .json(&json!({ "language": "Rust", "chars_typed": 250, "elapsed_ms": 60_000 }))
        .reply(&app.routes())
        .await;

    assert_eq!(response.status(), 200);
    let completion: TypingCompletionResponse = parse(response.body());
    assert_eq!(completion.result.wpm, 50);
    assert_eq!(completion.result.accuracy, 100);
    assert_eq!(completion.result.language, "Rust");
    assert_eq!(completion.profile.xp, 50);
    assert_eq!(completion.profile.stars, 1);

    let rows = app.store.list_all::<TypingResults>(None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, player.id);
}

#[tokio::test]
async fn test_typing_completion_for_unknown_user() {
    let app = TestApp::new(FakeGenerator::failing());

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/users/{}/typing-results", Uuid::new_v4()))
        .json(&json!({ "language": "Go", "chars_typed": 10, "elapsed_ms": 1000 }))
        .reply(&app.routes())
        .await;

    assert_eq!(response.status(), 404);
    assert!(app.store.list_all::<TypingResults>(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_saves_game_and_lists_it() {
    let app = TestApp::new(FakeGenerator::succeeding("Jump over the lava!", LAVA_GAME));
    let player = app.login("Nova").await;
    let other = app.login("Comet").await;
    let routes = app.routes();

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/users/{}/games/generate", player.id))
        .json(&json!({
            "name": "Lava Leap",
            "prompt": "A platformer where the floor is lava",
            "image": { "mime_type": "image/png", "data_base64": "iVBORw0KGgo=" }
        }))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), 200);
    let outcome: GenerateGameResponse = parse(response.body());
    assert_eq!(outcome.explanation, "Jump over the lava!");
    assert_eq!(outcome.game.kind, GameKind::Generated);
    assert_eq!(outcome.profile.xp, 50);
    assert_eq!(app.generator.calls(), 1);

    let mine = warp::test::request()
        .path(&format!("/api/users/{}/games", player.id))
        .reply(&routes)
        .await;
    let mine: Vec<GameProject> = parse(mine.body());
    assert_eq!(mine, vec![outcome.game.clone()]);

    let theirs = warp::test::request()
        .path(&format!("/api/users/{}/games", other.id))
        .reply(&routes)
        .await;
    assert!(parse::<Vec<GameProject>>(theirs.body()).is_empty());

    let gallery = warp::test::request().path("/api/games").reply(&routes).await;
    assert_eq!(parse::<Vec<GameProject>>(gallery.body()).len(), 1);
}

#[tokio::test]
async fn test_generation_failure_is_the_only_outcome() {
    let app = TestApp::new(FakeGenerator::failing());
    let player = app.login("Nova").await;

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/users/{}/games/generate", player.id))
        .json(&json!({ "name": "Lava Leap", "prompt": "floor is lava" }))
        .reply(&app.routes())
        .await;

    assert_eq!(response.status(), 502);
    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.error, ErrorKind::GenerationFailed);

    assert!(app.games.list_all().await.unwrap().is_empty());
    let unchanged = app.users.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(unchanged, player);
}

#[tokio::test]
async fn test_generate_rejects_bad_sketch_encoding() {
    let app = TestApp::new(FakeGenerator::succeeding("ok", LAVA_GAME));
    let player = app.login("Nova").await;

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/users/{}/games/generate", player.id))
        .json(&json!({
            "name": "Sketchy",
            "image": { "mime_type": "image/png", "data_base64": "%%% not base64 %%%" }
        }))
        .reply(&app.routes())
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(app.generator.calls(), 0);
}

#[tokio::test]
async fn test_play_serves_sandboxed_document() {
    let app = TestApp::new(FakeGenerator::failing());
    let player = app.login("Nova").await;
    let project = GameProject {
        id: Uuid::new_v4(),
        name: "Moon Maze".to_string(),
        code: LAVA_GAME.to_string(),
        created_at: 1_700_000_000_000,
        kind: GameKind::HandBuilt,
        user_id: player.id,
    };
    app.games.save(&project).await.unwrap();
    let routes = app.routes();

    let response = warp::test::request()
        .path(&format!("/play/{}", project.id))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-security-policy"], SANDBOX_POLICY);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.body(), LAVA_GAME);

    let missing = warp::test::request()
        .path(&format!("/play/{}", Uuid::new_v4()))
        .reply(&routes)
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_embed_frames_game_in_sandbox() {
    let app = TestApp::new(FakeGenerator::failing());
    let player = app.login("Nova").await;
    let project = GameProject {
        id: Uuid::new_v4(),
        name: "Moon Maze".to_string(),
        code: LAVA_GAME.to_string(),
        created_at: 1_700_000_000_000,
        kind: GameKind::HandBuilt,
        user_id: player.id,
    };
    app.games.save(&project).await.unwrap();
    let routes = app.routes();

    let response = warp::test::request()
        .path(&format!("/embed/{}", project.id))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    let page = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(page.contains(r#"sandbox="allow-scripts""#));
    assert!(!page.contains("allow-same-origin"));
    assert!(page.contains("&lt;script&gt;lava()&lt;/script&gt;"));
    assert!(!page.contains(LAVA_GAME));

    let missing = warp::test::request()
        .path(&format!("/embed/{}", Uuid::new_v4()))
        .reply(&routes)
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_unavailable_storage_degrades_gracefully() {
    let app = TestApp::with_store(
        LocalStore::new("sqlite:///no/such/directory/captain.db"),
        FakeGenerator::failing(),
    );
    let routes = app.routes();

    let login = warp::test::request()
        .method("POST")
        .path("/api/login")
        .json(&json!({ "username": "Nova" }))
        .reply(&routes)
        .await;
    assert_eq!(login.status(), 503);
    let error: ErrorResponse = parse(login.body());
    assert_eq!(error.error, ErrorKind::StorageUnavailable);

    // The rest of the app keeps answering
    let health = warp::test::request().path("/health").reply(&routes).await;
    assert_eq!(health.status(), 200);
}
