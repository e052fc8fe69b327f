//! Authentication and authorization utilities
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`session`]: Signed session tokens carried in a cookie
//! - [`authorization`]: Caller context and route guards
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id, constant-time verification
//! - **Sessions**: HS256-signed tokens holding only the user id and username
//! - **Roles**: re-read from the credential store on every request
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::auth::password::{hash_password, verify_password};
//! use taskboard_shared::auth::session::{create_token, validate_token, SessionClaims};
//! use chrono::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//!
//! let claims = SessionClaims::new(1, "alice", Duration::hours(1));
//! let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
//! let decoded = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
//! assert_eq!(decoded.user_id(), Some(1));
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod password;
pub mod session;
