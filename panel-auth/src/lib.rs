//! # Hostpanel Authentication
//!
//! This crate provides partner-scoped authentication for the Hostpanel
//! control panel, shared by the panel API and admin tooling.
//!
//! ## Overview
//!
//! The panel-auth crate handles:
//! - **Passwords**: Argon2id verification against PHC-format hashes
//! - **Tokens**: Compact signed bearer tokens with partner/user claims
//! - **Signed state**: Tamper-proof expiring state for OIDC redirects
//! - **Login**: The email+password login flow against a user store
//!
//! Tokens and state are signed with HMAC-SHA256 from primitives. There is
//! no validation-library dependency, so the exact wire format and the order
//! of checks (signature before payload, constant-time comparison) are under
//! this crate's control.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use panel_auth::TokenService;
//! use panel_core::User;
//! use uuid::Uuid;
//!
//! let service = TokenService::with_secret("a-signing-secret-of-at-least-32-bytes");
//!
//! let user = User::new(Uuid::now_v7(), "user@example.com", "$argon2id$...");
//! let token = service.issue(&user).unwrap();
//!
//! let claims = service.validate(&token).unwrap();
//! assert_eq!(claims.sub, user.id);
//! ```
//!
//! ## Error handling
//!
//! Every operation returns the closed [`AuthError`] taxonomy. Parse
//! failures, crypto failures, and backend errors are normalized before
//! they cross the crate boundary; callers branch on kind, never on
//! message text.

pub mod claims;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod state;
pub mod token;

// Re-export main types
pub use claims::Claims;
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use state::{OidcMode, OidcState, StateCodec, STATE_LIFETIME_SECS};
pub use token::{TokenConfig, TokenService};
