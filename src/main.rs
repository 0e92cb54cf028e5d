//! ClubHub Backend
//!
//! REST backend for a club management platform: memberships, points,
//! approvals and event registration over SQLite persistence.

mod api;
mod auth;
mod config;
mod credentials;
mod db;
mod errors;
mod ledger;
mod membership;
mod models;
mod notify;
mod registration;
mod workflow;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use credentials::{CredentialIssuer, StaticCredentialIssuer};
use db::Repository;
use ledger::PointsLedger;
use membership::MembershipCoordinator;
use notify::{NotificationSink, TracingSink};
use registration::EventRegistrar;
use workflow::ApprovalWorkflow;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub coordinator: Arc<MembershipCoordinator>,
    pub ledger: Arc<PointsLedger>,
    pub workflow: Arc<ApprovalWorkflow>,
    pub registrar: Arc<EventRegistrar>,
    pub credentials: Arc<dyn CredentialIssuer>,
    pub notifier: Arc<dyn NotificationSink>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ClubHub Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (CLUBHUB_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;

    // Wire the engines around the shared pool
    let credentials: Arc<dyn CredentialIssuer> =
        Arc::new(StaticCredentialIssuer::new(config.default_credential.clone()));
    let notifier: Arc<dyn NotificationSink> = Arc::new(TracingSink);

    let state = AppState {
        repo: Arc::new(Repository::new(pool.clone())),
        coordinator: Arc::new(MembershipCoordinator::new(
            pool.clone(),
            credentials.clone(),
            notifier.clone(),
        )),
        ledger: Arc::new(PointsLedger::new(pool.clone())),
        workflow: Arc::new(ApprovalWorkflow::new(pool.clone(), notifier.clone())),
        registrar: Arc::new(EventRegistrar::new(pool)),
        credentials,
        notifier,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Users
        .route("/users", get(api::list_users))
        .route("/users", post(api::create_user))
        .route("/users/repair-points", post(api::repair_points))
        .route("/users/{id}", get(api::get_user))
        .route("/users/{id}", put(api::update_user))
        .route("/users/{id}", delete(api::delete_user))
        // Clubs
        .route("/clubs", get(api::list_clubs))
        .route("/clubs", post(api::create_club))
        .route("/clubs/{id}", get(api::get_club))
        .route("/clubs/{id}", put(api::update_club))
        .route("/clubs/{id}", delete(api::delete_club))
        .route("/clubs/{id}/faculty", put(api::assign_faculty))
        .route("/clubs/{id}/faculty", delete(api::remove_faculty))
        .route("/clubs/{id}/leader", put(api::assign_leader))
        .route("/clubs/{id}/leader", delete(api::remove_leader))
        .route("/clubs/{id}/members", post(api::add_member))
        .route("/clubs/{id}/members/{user_id}", put(api::update_member))
        .route("/clubs/{id}/members/{user_id}", delete(api::remove_member))
        .route("/clubs/{id}/reconcile", post(api::reconcile_club))
        // Events
        .route("/events", get(api::list_events))
        .route("/events", post(api::create_event))
        .route("/events/{id}", get(api::get_event))
        .route("/events/{id}/register", post(api::register_for_event))
        .route(
            "/events/{id}/register/{user_id}",
            delete(api::unregister_from_event),
        )
        // Approvals
        .route("/approvals", get(api::list_approvals))
        .route("/approvals", post(api::submit_approval))
        .route("/approvals/{id}", get(api::get_approval))
        .route("/approvals/{id}/decision", post(api::decide_approval))
        // Rewards
        .route("/rewards", get(api::list_rewards))
        .route("/rewards", post(api::create_reward))
        .route("/rewards/{id}/claim", post(api::claim_reward))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
