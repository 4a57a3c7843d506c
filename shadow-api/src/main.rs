//! Shadow terms service.
//!
//! Keeps one shadow term per published post of every participating post
//! type and serves association requests over HTTP.
//!
//! Usage:
//!   shadow-terms --registry registry.json --database shadow.db --token secret
//!
//! Without `--database` all state lives in memory and is lost on exit.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use anyhow::{Context, Result};
use clap::Parser;
use shadow_api::{build_router, AppState, ServiceConfig};
use shadow_model::{Registry, RegistryConfig};
use shadow_storage::{MemoryStore, ShadowStore, SqliteStore};
use shadow_sync::ShadowEngine;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "shadow-terms")]
#[command(about = "Shadow term reconciliation service")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// SQLite database file (in-memory when omitted)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Registry configuration file (JSON)
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Bearer token required for association and event routes
    #[arg(long)]
    token: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Shadow terms service starting...");
    let registry = load_registry(args.registry.as_deref())?;
    let store = open_store(args.database.as_deref())?;

    let config = ServiceConfig {
        bind: format!("0.0.0.0:{}", args.port),
        token: args.token,
    };
    if config.token.is_none() {
        warn!("No --token given, association and event routes are open");
    }

    let engine = ShadowEngine::new(Arc::new(registry), store);
    let state = Arc::new(AppState::new(engine, config.authorizer()));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("HTTP API listening on {}", config.bind);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

fn load_registry(path: Option<&Path>) -> Result<Registry> {
    let config = match path {
        Some(path) => {
            info!("Loading registry from {:?}", path);
            RegistryConfig::load(path).context("Failed to load registry configuration")?
        }
        None => {
            warn!("No --registry given, no post type participates");
            RegistryConfig::default()
        }
    };
    let registry = Registry::from_config(config).context("Invalid registry configuration")?;
    for taxonomy in registry.taxonomies() {
        info!("Shadow taxonomy {} for post type {}", taxonomy.slug, taxonomy.post_type);
    }
    Ok(registry)
}

fn open_store(path: Option<&Path>) -> Result<Arc<dyn ShadowStore>> {
    match path {
        Some(path) => {
            info!("Opening database at {:?}", path);
            let store = SqliteStore::open(path).context("Failed to open database")?;
            Ok(Arc::new(store))
        }
        None => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
