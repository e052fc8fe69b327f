//! # Taskboard Web Server
//!
//! Serves the Taskboard pages: registration, login, the role-based
//! dashboard and the task lifecycle actions.
//!
//! ## Usage
//!
//! ```bash
//! SESSION_SECRET=$(openssl rand -hex 32) cargo run -p taskboard-web
//! ```

use anyhow::Context;
use taskboard_shared::{
    db::{
        pool::{close_pool, create_pool, DatabaseConfig},
        schema::ensure_schema,
    },
    models::user::User,
};
use taskboard_web::{
    app::{build_router, AppState},
    config::Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG and LOG_FORMAT, so load it before tracing
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "Taskboard Web Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    ensure_schema(&pool).await.context("Failed to create schema")?;

    if let Some(admin) = &config.admin {
        let (user, created) = User::ensure_admin(&pool, &admin.username, &admin.password)
            .await
            .context("Failed to bootstrap admin account")?;

        if created {
            tracing::info!(user_id = user.id, username = %user.username, "Admin account created");
        } else if !user.is_admin {
            tracing::warn!(
                username = %user.username,
                "ADMIN_USERNAME belongs to an existing non-admin account; left unchanged"
            );
        }
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config).context("Failed to load templates")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Installs the global subscriber; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskboard_web=debug,taskboard_shared=info,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Keep serving; the process can still be killed
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
