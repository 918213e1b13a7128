//! jukegate - a self-hosted moderation gate for crowd song requests
//!
//! Guests request catalog tracks; jukegate fetches and screens the
//! lyrics, auto-rejects what the gate flags, and leaves the rest for a
//! human moderator. Every decision streams to viewers over SSE.

mod api;
mod catalog;
mod config;
mod core;
mod db;
mod error;
mod models;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::catalog::HttpCatalog;
use crate::core::resolver::LyricResolver;
use crate::core::{Denylist, EventBus, Pipeline};
use crate::db::SqliteLyricStore;

/// jukegate - moderated song requests
#[derive(Parser, Debug)]
#[command(name = "jukegate")]
#[command(version = "0.3.0")]
#[command(about = "A self-hosted moderation gate for crowd song requests")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 1988)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    // sqlx logs every statement at info; keep it to warnings
    let filter =
        tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn,hyper=warn", log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("jukegate v0.3.0 starting...");

    let paths = config::Paths::init(args.config)?;
    info!("Config directory: {:?}", paths.config_dir());

    let mut settings = config::Settings::load(&paths)?;
    if settings.server_id.is_empty() {
        settings.server_id = uuid::Uuid::new_v4().to_string();
        settings.save(&paths)?;
    }

    if settings.resolved_catalog_token().is_empty() {
        tracing::warn!(
            "No catalog token configured. \
             Set JUKEGATE_CATALOG_TOKEN or add catalogToken to settings.json."
        );
    }

    let engine = db::DbEngine::connect(&paths.app_db_path()).await?;
    info!("Database ready at {:?}", paths.app_db_path());

    let catalog = Arc::new(HttpCatalog::new(
        &settings.catalog_base_url,
        &settings.resolved_catalog_token(),
    ));
    let store = Arc::new(SqliteLyricStore::new(engine.pool().clone()));
    let chain = core::providers::ProviderChain::from_settings(&settings);
    let resolver = LyricResolver::new(store, chain, settings.freshness_secs());
    let denylist = Denylist::with_extras(&settings.denylist_extra);
    info!("Denylist loaded with {} terms", denylist.len());

    let bus = EventBus::new(settings.event_capacity);
    let pipeline = Pipeline::new(engine, catalog, resolver, denylist, bus, &settings);
    pipeline.start_workers(settings.resolve_workers, settings.resolve_queue_size);
    info!("Resolution workers started ({})", settings.resolve_workers);

    let addr = format!("{}:{}", args.host, args.port);
    info!("Server listening on http://{}", addr);

    use actix_cors::Cors;
    use actix_web::{middleware, web, App, HttpServer};

    let data = web::Data::from(pipeline);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(data.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(api::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
