use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use captain_persistence::repositories::{GameRepository, TypingResultRepository, UserRepository};
use captain_persistence::LocalStore;
use captain_server::{
    config::Config, create_routes, dream::DreamService, generator::GeminiGenerator,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Code Captain...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Open the local store up front so a broken database is reported once at
    // startup. The server keeps running; persistence calls then answer with
    // StorageUnavailable.
    let store = Arc::new(LocalStore::new(config.database_url.clone()));
    if let Err(e) = store.open().await {
        tracing::error!("{}. Progress will not be saved this session.", e);
    }

    let user_repository = Arc::new(UserRepository::new(store.clone()));
    let game_repository = Arc::new(GameRepository::new(store.clone()));
    let typing_repository = Arc::new(TypingResultRepository::new(store.clone()));

    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; game generation requests will fail");
    }
    let generator = match GeminiGenerator::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        Duration::from_secs(config.generation_timeout_seconds),
    ) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            tracing::error!("Failed to build generation client: {}", e);
            std::process::exit(1);
        }
    };

    let dream_service = Arc::new(DreamService::new(
        generator,
        (*user_repository).clone(),
        (*game_repository).clone(),
    ));

    let routes = create_routes(
        user_repository,
        game_repository,
        typing_repository,
        dream_service,
    );

    let host = match config.host.parse::<std::net::IpAddr>() {
        Ok(host) => host,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}:{}", host, config.port);

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown((host, config.port), async {
            // Wait for SIGINT (Ctrl+C) or SIGTERM
            #[cfg(unix)]
            {
                let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                    .expect("Failed to install SIGINT handler");
                let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to install SIGTERM handler");

                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
            }

            #[cfg(not(unix))]
            {
                signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
                info!("Received Ctrl+C, shutting down gracefully...");
            }
        });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
