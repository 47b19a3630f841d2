mod api;
mod app;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_web::{web, HttpServer};
use app::AppContext;
use config::AppConfig;
use database::MongoDB;
use dotenv::dotenv;
use services::MongoUserStore;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

#[actix_web::main]
async fn main() -> ExitCode {
    let started_at = Instant::now();

    // Load environment variables
    dotenv().ok();

    // Initialize logger
    utils::logger::init();

    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!(error:% = e; "❌ Failed to start server");
            return ExitCode::FAILURE;
        }
    };

    log::info!(environment:% = config.environment; "🚀 Starting Hello Service...");

    // 🗄️ Connect to MongoDB (fatal on failure, no retry)
    let db = match MongoDB::connect(&config.mongodb_uri).await {
        Ok(db) => db,
        Err(e) => {
            log::error!(error:% = e; "❌ MongoDB connection failed");
            return ExitCode::FAILURE;
        }
    };

    log::info!("✅ Connected to MongoDB successfully");

    match serve(&config, db, started_at).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!(error:% = e; "❌ Failed to start server");
            ExitCode::FAILURE
        }
    }
}

/// Runs until SIGINT, then closes MongoDB. In-flight requests are not drained.
async fn serve(config: &AppConfig, db: MongoDB, started_at: Instant) -> std::io::Result<()> {
    // Shared application state
    let ctx = web::Data::new(AppContext::new(
        Arc::new(MongoUserStore::new(&db)),
        Arc::new(db.clone()),
        config.environment.clone(),
        started_at,
    ));

    // Signals are handled below so the shutdown order stays ours.
    let server = HttpServer::new(move || app::build_app(ctx.clone()))
        .disable_signals()
        .bind((config.host.as_str(), config.port))?
        .run();
    let handle = server.handle();

    log::info!(
        port = config.port,
        environment:% = config.environment;
        "🌐 Server started successfully"
    );

    // 🛑 Wait for the server to exit or for Ctrl+C
    tokio::select! {
        result = server => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            log::info!("🛑 Shutting down gracefully...");
            handle.stop(false).await;
            db.close().await;
        }
    }

    Ok(())
}
