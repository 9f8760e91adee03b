//! paydesk HTTP Server
//!
//! Axum-based server for creating, listing and deleting customers, and for
//! the two-step tokenized card payment flow. Responses are HTML fragments
//! meant to be swapped in by htmx.

mod handlers;
mod pages;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderName, Method},
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paydesk_core::DeskConfig;
use paydesk_gateway::PayabliClient;

use crate::handlers::{
    create_customer, create_customer_page, delete_customer, health_check, list_customers,
    list_customers_page, process_transaction, transaction_page,
};
use crate::state::AppState;

/// Build the router with all routes and middleware
fn build_router(state: AppState) -> Router {
    // htmx sends its own request headers on every call
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static("hx-request"),
            HeaderName::from_static("hx-target"),
            HeaderName::from_static("hx-current-url"),
        ]);

    Router::new()
        // Pages
        .route("/", get(create_customer_page))
        .route("/list", get(list_customers_page))
        .route("/transaction", get(transaction_page))
        .route("/health", get(health_check))

        // Customer API
        .route("/api/create", post(create_customer))
        .route("/api/list", get(list_customers))
        .route("/api/delete/{customer_id}", delete(delete_customer))

        // Payments
        .route("/api/transaction/{token}", post(process_transaction))

        // Stylesheets and images
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing credentials are fatal
    let config = DeskConfig::from_env()
        .context("PAYABLI_KEY, PAYABLI_ENTRY and PAYABLI_PUBLIC_TOKEN must be set")?;

    let gateway = PayabliClient::from_desk_config(&config)
        .context("Failed to initialize Payabli client")?;
    tracing::info!("✓ Payabli client ready ({})", gateway.config().base_url);

    let addr = config.bind_addr.clone();
    let state = AppState::new(Arc::new(gateway), config);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 paydesk server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /                       - Create customer page");
    tracing::info!("  GET    /list                   - Customer list page");
    tracing::info!("  GET    /transaction            - Payment page");
    tracing::info!("  POST   /api/create             - Create customer");
    tracing::info!("  GET    /api/list               - Customer table");
    tracing::info!("  DELETE /api/delete/{{id}}        - Delete customer");
    tracing::info!("  POST   /api/transaction/{{token}} - Tokenize and charge");
    tracing::info!("  GET    /health                 - Health check");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
