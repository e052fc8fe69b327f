//! Application state and router builder
//!
//! This module defines the shared application state and provides
//! a function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_web::{app::{build_router, AppState}, config::Config};
//! use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = create_pool(DatabaseConfig {
//!     url: config.database.url.clone(),
//!     ..Default::default()
//! })
//! .await?;
//! let state = AppState::new(pool, config)?;
//! let app = build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    middleware::{security::with_security_headers, session::session_layer},
    routes,
    views,
};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;
use taskboard_shared::auth::session::SessionManager;
use tera::Tera;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Session cookie issuer and validator
    pub sessions: SessionManager,

    /// Page templates
    pub templates: Arc<Tera>,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Returns an error if a page template fails to parse.
    pub fn new(db: SqlitePool, config: Config) -> Result<Self, tera::Error> {
        let sessions = SessionManager::new(
            config.session.secret.clone(),
            Duration::hours(config.session.ttl_hours),
        )
        .with_secure(config.app.production);

        Ok(Self {
            db,
            config: Arc::new(config),
            sessions,
            templates: Arc::new(views::load_templates()?),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET       /                         # Landing page or redirect
/// ├── GET|POST  /register
/// ├── GET|POST  /login
/// ├── GET       /logout
/// ├── GET       /dashboard                # Session
/// ├── GET|POST  /assign_task/:user_id     # Admin
/// ├── POST      /delete_task/:task_id     # Admin
/// ├── POST      /complete_task/:task_id   # Session, assignee only
/// ├── GET|POST  /reassign_task/:task_id   # Admin
/// └── GET       /health                   # Probe, no session lookup
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. Logging (tower-http TraceLayer)
/// 3. Session resolution (page routes only)
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(routes::pages::home))
        .route(
            "/register",
            get(routes::auth::register_form).post(routes::auth::register),
        )
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout))
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/assign_task/:user_id",
            get(routes::tasks::assign_task_form).post(routes::tasks::assign_task),
        )
        .route("/delete_task/:task_id", post(routes::tasks::delete_task))
        .route("/complete_task/:task_id", post(routes::tasks::complete_task))
        .route(
            "/reassign_task/:task_id",
            get(routes::tasks::reassign_task_form).post(routes::tasks::reassign_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ));

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let router = Router::new()
        .merge(page_routes)
        .merge(health_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let production = state.config.app.production;
    with_security_headers(router, production).with_state(state)
}
