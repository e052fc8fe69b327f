//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - In-memory database with the schema applied
//! - A seeded admin account
//! - Form submission and session cookie helpers
//!
//! The router is driven in-process; no socket is opened.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use sqlx::SqlitePool;
use taskboard_shared::auth::session::DEFAULT_COOKIE_NAME;
use taskboard_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use taskboard_shared::db::schema::ensure_schema;
use taskboard_shared::models::user::User;
use taskboard_web::app::{build_router, AppState};
use taskboard_web::config::{AppConfig, Config, DatabaseConfig, SessionConfig};
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pw";
pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
    pub admin: User,
}

/// Configuration for tests
pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        session: SessionConfig {
            secret: TEST_SECRET.to_string(),
            ttl_hours: 1,
        },
        admin: None,
    }
}

impl TestContext {
    /// Creates a new test context with a fresh database and one admin
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(test_config()).await
    }

    /// Creates a test context with a custom configuration
    pub async fn with_config(config: Config) -> anyhow::Result<Self> {
        let db = create_pool(PoolConfig::in_memory()).await?;
        ensure_schema(&db).await?;

        let admin = User::create_admin(&db, ADMIN_USERNAME, ADMIN_PASSWORD).await?;

        let state = AppState::new(db.clone(), config.clone())?;
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            admin,
        })
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// `GET uri`, optionally with a session cookie
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// `POST uri` with a url-encoded form, optionally with a session cookie
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
            .collect::<Vec<_>>()
            .join("&");

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Submits the registration form
    pub async fn register(&self, username: &str, password: &str) -> Response<Body> {
        self.post_form(
            "/register",
            &[("username", username), ("password", password)],
            None,
        )
        .await
    }

    /// Submits the login form and returns the session cookie (`name=value`)
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/login",
                &[("username", username), ("password", password)],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login should redirect");
        session_cookie(&response).expect("login should set the session cookie")
    }

    /// Logs in as the seeded admin
    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Registers a worker, logs in, and returns the user and session cookie
    pub async fn register_and_login(&self, username: &str, password: &str) -> (User, String) {
        let response = self.register(username, password).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "registration should redirect");

        let user = User::find_by_username(&self.db, username)
            .await
            .unwrap()
            .expect("registered user should exist");
        let cookie = self.login(username, password).await;
        (user, cookie)
    }
}

/// Extracts the session cookie pair from a response, if one is set
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", DEFAULT_COOKIE_NAME)))
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.trim().to_string())
}

/// Returns the redirect target of a response
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Reads a response body as text
pub async fn body_string(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}
