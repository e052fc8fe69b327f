//! Signed session tokens
//!
//! A session is a JWT signed with HS256 and stored in an HttpOnly cookie.
//! The token names the user (id and username) and nothing else: the admin
//! flag is looked up in the credential store on every request instead of
//! being trusted from the client.
//!
//! # Lifecycle
//!
//! - `start_session`: issue a token for a freshly authenticated user
//! - `current_user`: decode the cookie of an incoming request
//! - `end_session`: overwrite the cookie with an expired, empty one
//!
//! # Example
//!
//! ```
//! use taskboard_shared::auth::session::SessionManager;
//! use taskboard_shared::models::user::User;
//! use axum::http::{header, HeaderMap, HeaderValue};
//! use chrono::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sessions = SessionManager::new("secret-key-at-least-32-bytes-long!!", Duration::hours(1));
//! let user = User { id: 1, username: "alice".into(), password_hash: String::new(), is_admin: false };
//!
//! let cookie = sessions.start_session(&user)?;
//!
//! let mut headers = HeaderMap::new();
//! let pair = format!("{}={}", cookie.name(), cookie.value());
//! headers.insert(header::COOKIE, HeaderValue::from_str(&pair)?);
//!
//! let identity = sessions.current_user(&headers).expect("valid session");
//! assert_eq!(identity.user_id, 1);
//! # Ok(())
//! # }
//! ```

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{user::User, UserId};

/// Issuer claim of every session token
pub const SESSION_ISSUER: &str = "taskboard";

/// Default name of the session cookie
pub const DEFAULT_COOKIE_NAME: &str = "taskboard_session";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate session token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Session token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Session token claims
///
/// # Standard Claims
///
/// - `sub`: user ID (decimal string)
/// - `iss`: always "taskboard"
/// - `iat`, `nbf`, `exp`: Unix timestamps
///
/// # Custom Claims
///
/// - `username`: display name at login time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user ID
    pub sub: String,

    /// Issuer - always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Username (custom claim)
    pub username: String,
}

impl SessionClaims {
    /// Creates claims valid for `ttl` from now
    pub fn new(user_id: UserId, username: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: user_id.to_string(),
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            username: username.to_string(),
        }
    }

    /// User ID carried in `sub`, if it is a valid integer
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token
///
/// # Errors
///
/// Returns `SessionError::CreateError` if encoding fails
pub fn create_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies signature, expiration, not-before and issuer.
pub fn validate_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => SessionError::InvalidIssuer {
                expected: SESSION_ISSUER.to_string(),
            },
            _ => SessionError::ValidationError(format!("Token validation failed: {}", e)),
        }
    })?;

    Ok(token_data.claims)
}

/// Identity decoded from a valid session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Session owner
    pub user_id: UserId,

    /// Username at login time
    pub username: String,
}

/// Issues, reads and clears session cookies
#[derive(Debug, Clone)]
pub struct SessionManager {
    secret: String,
    ttl: Duration,
    cookie_name: String,
    secure: bool,
}

impl SessionManager {
    /// Creates a manager signing with `secret`; tokens live for `ttl`
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
        }
    }

    /// Marks cookies `Secure` (HTTPS only)
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Starts a session for `user` and returns the cookie to set
    pub fn start_session(&self, user: &User) -> Result<Cookie<'static>, SessionError> {
        let claims = SessionClaims::new(user.id, &user.username, self.ttl);
        let token = create_token(&claims, &self.secret)?;

        debug!(user_id = user.id, "Started session");
        Ok(self.base_cookie(token))
    }

    /// Returns a cookie that clears the session in the browser
    ///
    /// Safe to send when no session exists.
    pub fn end_session(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    /// Decodes the session cookie of a request
    ///
    /// Returns `None` when the cookie is absent, malformed, forged, expired or
    /// issued by someone else.
    pub fn current_user(&self, headers: &HeaderMap) -> Option<SessionIdentity> {
        let token = self.session_token(headers)?;
        self.identity_from_token(&token)
    }

    /// Decodes a raw session token
    pub fn identity_from_token(&self, token: &str) -> Option<SessionIdentity> {
        if token.is_empty() {
            return None;
        }

        match validate_token(token, &self.secret) {
            Ok(claims) => Some(SessionIdentity {
                user_id: claims.user_id()?,
                username: claims.username,
            }),
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session token");
                None
            }
        }
    }

    fn session_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value.to_string()))
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.cookie_name)
            .map(|cookie| cookie.value().to_string())
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn alice() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: String::new(),
            is_admin: false,
        }
    }

    fn headers_with(cookie_header: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie_header).unwrap());
        headers
    }

    #[test]
    fn test_claims_creation() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(1));

        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, SESSION_ISSUER);
        assert!(!claims.is_expired());

        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 3600);
    }

    #[test]
    fn test_claims_do_not_carry_role() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("is_admin").is_none());
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.user_id(), Some(7));
        assert_eq!(validated.username, "alice");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        assert!(validate_token(&token, "another-secret-key-at-least-32-bytes").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = SessionClaims::new(7, "alice", Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(SessionError::Expired)));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let mut claims = SessionClaims::new(7, "alice", Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(SessionError::InvalidIssuer { .. })
        ));
    }

    #[test]
    fn test_start_session_cookie_attributes() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1));
        let cookie = sessions.start_session(&alice()).unwrap();

        assert_eq!(cookie.name(), DEFAULT_COOKIE_NAME);
        assert!(!cookie.value().is_empty());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_secure_flag_follows_configuration() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1)).with_secure(true);
        let cookie = sessions.start_session(&alice()).unwrap();

        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_current_user_roundtrip() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1));
        let cookie = sessions.start_session(&alice()).unwrap();

        let header = format!("theme=dark; {}={}", cookie.name(), cookie.value());
        let identity = sessions.current_user(&headers_with(&header));

        assert_eq!(
            identity,
            Some(SessionIdentity {
                user_id: 7,
                username: "alice".to_string()
            })
        );
    }

    #[test]
    fn test_current_user_absent_or_invalid() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1));

        assert!(sessions.current_user(&HeaderMap::new()).is_none());
        assert!(sessions
            .current_user(&headers_with("taskboard_session=not-a-token"))
            .is_none());
        assert!(sessions.current_user(&headers_with("taskboard_session=")).is_none());
    }

    #[test]
    fn test_end_session_is_removal_cookie() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1));
        let cookie = sessions.end_session();

        assert_eq!(cookie.name(), DEFAULT_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age().map(|age| age.whole_seconds()), Some(0));
        assert_eq!(cookie.path(), Some("/"));

        // Ending again without a session is harmless
        let again = sessions.end_session();
        assert_eq!(again.name(), cookie.name());
        assert_eq!(again.value(), "");
    }
}
