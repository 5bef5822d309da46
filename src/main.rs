//! NoteVault - a markdown notes workspace with an AI assistant panel.
//!
//! This is the entry point for the web server. The application is
//! organized into the following modules:
//!
//! - `models`: Notes, folders, tags, settings and clipboard types
//! - `storage`: sled-backed whole-value persistence slots
//! - `store` / `tabs` / `workspace`: the note collections and session state
//! - `notes`: Tag extraction, rendering, search and export helpers
//! - `assistant`: Prompt assembly and completion providers
//! - `templates`: HTML/CSS/JS templates and rendering
//! - `handlers`: HTTP route handlers

use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notevault::assistant::provider_from_config;
use notevault::config::Config;
use notevault::storage::Storage;
use notevault::{router, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notevault=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(config).await {
        error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open(&config.db_path)?;
    let assistant = provider_from_config(&config);
    if config.api_key.is_none() {
        warn!("GOOGLE_AI_API_KEY not set; the assistant will use canned responses");
    }

    let state = Arc::new(AppState::new(&storage, assistant.clone()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(addr = %config.addr, db = %config.db_path, assistant = assistant.name(), "NoteVault running");

    axum::serve(listener, app).await?;
    storage.flush()?;
    Ok(())
}
