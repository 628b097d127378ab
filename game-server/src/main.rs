use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use game_core::Board;
use game_persistence::{SqlResultStore, connection::connect_and_migrate, repositories::UserRepository};
use game_server::{auth::AuthService, config::Config, create_routes, game_manager::GameManager};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting trivia server...");

    let config = Arc::new(Config::new());

    info!("Loading board from: {}", config.board_file);
    let board = match Board::load(&config.board_file) {
        Ok(board) => {
            info!(
                "Loaded board with {} clues ({} daily doubles)",
                board.total_clues(),
                board.daily_double_count()
            );
            Arc::new(board)
        }
        Err(e) => {
            error!("Failed to load board '{}': {:#}", config.board_file, e);
            error!("Set BOARD_FILE to point to a valid board JSON file.");
            std::process::exit(1);
        }
    };

    // Initialize database connection and run migrations
    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };
    let user_repository = Arc::new(UserRepository::new(db.clone()));
    let store = Arc::new(SqlResultStore::new(db));

    let game_manager = Arc::new(
        GameManager::new(board, store, config.leaderboard_retry_policy())
            .with_final_leaderboard_limit(config.leaderboard_default_limit),
    );

    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - token signatures are not checked");
        Arc::new(AuthService::new_dev_mode())
    } else {
        match config.auth_token_secret.as_deref() {
            Some(secret) => Arc::new(AuthService::new(secret)),
            None => {
                error!("AUTH_TOKEN_SECRET must be set unless AUTH_DEV_MODE=true");
                std::process::exit(1);
            }
        }
    };

    let routes = create_routes(
        game_manager.clone(),
        auth_service,
        user_repository,
        config.clone(),
    );

    // Start cleanup task
    let cleanup_game_manager = game_manager.clone();
    let session_timeout = config.session_timeout();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            let removed = cleanup_game_manager
                .cleanup_abandoned_sessions(session_timeout)
                .await;
            if removed > 0 {
                info!("Cleaned up {} abandoned sessions", removed);
            }
        }
    });

    let host = match config.host.parse::<std::net::IpAddr>() {
        Ok(host) => host,
        Err(e) => {
            error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown((host, config.port), shutdown_signal());

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}

async fn shutdown_signal() {
    // Wait for SIGINT (Ctrl+C) or SIGTERM
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
            }
            _ => {
                error!("Failed to install signal handlers, falling back to Ctrl+C");
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
