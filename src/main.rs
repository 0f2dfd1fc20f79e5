mod config;
mod error;
mod handlers;
mod metrics;
mod rate_limit;
mod reasons;
mod state;

use axum::{Router, routing::get};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Args;
use crate::handlers::{health_handler, metrics_handler, reason_handler};
use crate::rate_limit::ClientRegistry;
use crate::reasons::ReasonStore;
use crate::state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();

    let reasons = ReasonStore::load(&args.reasons).expect("Failed to load reasons file");
    tracing::info!("Loaded {} reasons from {}", reasons.len(), args.reasons);

    let clients = Arc::new(ClientRegistry::new(
        args.rate_limit,
        args.burst,
        Duration::from_secs(args.idle_timeout),
    ));

    // creating shared state
    let state = Arc::new(AppState {
        reasons,
        clients: clients.clone(),
        rate_limit: args.rate_limit,
    });

    // spawn the background sweeper
    tokio::spawn(rate_limit::sweeper(
        clients,
        Duration::from_secs(args.sweep_interval),
    ));

    // creating the router with routes
    let app = Router::new()
        .route("/no", get(reason_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler)) // metrics endpoint
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    tracing::info!("No-as-a-Service is running on port {}", args.port);
    tracing::info!(
        "Rate limit: {} requests per minute per client (burst {})",
        args.rate_limit,
        args.burst
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
