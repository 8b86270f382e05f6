//! SmartPark analytics service
//!
//! Serves dynamic prices, reservation quotes and availability predictions
//! over HTTP, and ingests sensor readings.

use smartpark_backend::clock::SystemClock;
use smartpark_backend::database::{create_pool, run_migrations};
use smartpark_backend::http::create_router;
use smartpark_backend::{AppConfig, AppError, AppResult, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "smartpark_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    // Structured JSON logs in production, human-readable elsewhere
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           SmartPark Analytics Service Starting            ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!(
        "Peak hours: {}:00-{}:00 (x{})",
        config.pricing.peak_start_hour,
        config.pricing.peak_end_hour,
        config.pricing.peak_hour_multiplier
    );
    info!("Prediction alpha: {}", config.prediction.alpha);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // SERVICES
    // =========================================================================
    let state = AppState::from_pool(pool, &config, Arc::new(SystemClock));
    info!("✓ Pricing engine, predictor and sensor service initialized");

    let router = create_router(state);

    // =========================================================================
    // START SERVER
    // =========================================================================
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           SmartPark Analytics Service Ready!              ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     {}                              ║", addr);
    info!("║  Environment:  {}                                ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = server_handle => {
            error!("HTTP server exited unexpectedly");
        }
    }

    info!("SmartPark analytics service shutdown complete");
    Ok(())
}
