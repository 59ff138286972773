use school_directory::api::{self, AppState};
use school_directory::config::{Config, ImageStoreConfig};
use school_directory::db::{Database, PgSchoolStore};
use school_directory::storage;

use std::sync::Arc;
use tokio::signal;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env file if present
    let dotenv_result = dotenvy::dotenv();

    // Setup log directory
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(&log_dir).unwrap_or_else(|e| {
        eprintln!("Warning: Could not create log directory {}: {}", log_dir, e);
    });

    // Create file appender with daily rotation
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "school-directory.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,school_directory=debug")),
        )
        // Console output
        .with(fmt::layer().with_target(true))
        // File output with JSON format for easy parsing
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking),
        )
        .init();

    debug!("Logging initialized - log directory: {}", log_dir);

    if let Err(e) = dotenv_result {
        warn!("No .env file found or error loading it: {}", e);
    }

    // Load configuration
    let config = Config::from_env()?;
    let socket_addr = config.socket_addr()?;

    info!("Starting school directory on {}", socket_addr);
    info!("Database: {}", config.database_name);
    info!("Max database connections: {}", config.max_connections);

    let database = Database::connect(&config)?;

    // The server still starts when the database is down; requests report it
    match database.ping().await {
        Ok(()) => {
            info!("Connected to database {}", database.name());
            if config.auto_migrate {
                if let Err(e) = database.ensure_schema().await {
                    warn!("Could not apply schema: {}", e);
                }
            }
        }
        Err(e) => warn!("Database not reachable at startup: {}", e),
    }

    let images = storage::from_config(&config.image_store);
    info!("Image store: {}", images.kind());

    let state = Arc::new(AppState::new(
        Arc::new(PgSchoolStore::new(database)),
        images,
    ));

    let mut app = api::router(state, config.max_body_bytes);

    if let ImageStoreConfig::Local {
        upload_dir,
        public_path,
    } = &config.image_store
    {
        info!("Serving {:?} under {}", upload_dir, public_path);
        app = app.nest_service(public_path, ServeDir::new(upload_dir));
    }

    // Create listener
    let listener = tokio::net::TcpListener::bind(&socket_addr).await?;
    info!("Server listening on {}", socket_addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
