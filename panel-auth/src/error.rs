//! Error types for authentication operations
//!
//! This module defines the closed error taxonomy for credential
//! verification, token/state validation, and OIDC federation. Internal
//! parse errors, decode errors, and provider HTTP statuses are normalized
//! into these kinds and never leak to callers.

use thiserror::Error;

/// Authentication error types.
///
/// Callers branch on kind, not message. The unauthorized-class kinds are
/// deliberately coarse: `InvalidCredentials` covers both "unknown user"
/// and "wrong password" so the login endpoint cannot be used for account
/// enumeration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown user (not distinguished)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token or state is structurally malformed (wrong segment count)
    #[error("Invalid format")]
    InvalidFormat,

    /// Signature does not verify
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed payload does not decode into the expected claims shape
    #[error("Invalid claims")]
    InvalidClaims,

    /// Token or state has expired
    #[error("Expired")]
    Expired,

    /// OIDC provider id is not configured
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Provider token endpoint rejected the code exchange
    #[error("Token exchange failed")]
    TokenExchangeFailed,

    /// Provider userinfo endpoint failed or returned no subject
    #[error("Userinfo fetch failed")]
    UserinfoFailed,

    /// No identity connection exists for the (partner, provider, subject)
    #[error("No account linked")]
    NoAccountLinked,

    /// A connection for this provider already exists
    #[error("Connection already exists")]
    ConnectionConflict,

    /// No matching connection to remove
    #[error("Connection not found")]
    ConnectionNotFound,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Most kinds here are expected per-request outcomes; only
    /// configuration and internal failures indicate a server problem.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Internal(_) | AuthError::Config(_))
    }

    /// Get the HTTP status code for this error.
    ///
    /// The surrounding layer maps the unauthorized-class kinds to a
    /// generic 401; linking outcomes are user-actionable and keep
    /// distinct codes.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidFormat
            | AuthError::InvalidSignature
            | AuthError::InvalidClaims
            | AuthError::Expired => 401,

            AuthError::UnknownProvider(_) => 400,
            AuthError::NoAccountLinked => 404,
            AuthError::ConnectionNotFound => 404,
            AuthError::ConnectionConflict => 409,

            AuthError::TokenExchangeFailed | AuthError::UserinfoFailed => 502,

            AuthError::Config(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidFormat => "INVALID_FORMAT",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::InvalidClaims => "INVALID_CLAIMS",
            AuthError::Expired => "EXPIRED",
            AuthError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            AuthError::TokenExchangeFailed => "TOKEN_EXCHANGE_FAILED",
            AuthError::UserinfoFailed => "USERINFO_FAILED",
            AuthError::NoAccountLinked => "NO_ACCOUNT_LINKED",
            AuthError::ConnectionConflict => "CONNECTION_CONFLICT",
            AuthError::ConnectionNotFound => "CONNECTION_NOT_FOUND",
            AuthError::Config(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<panel_core::StoreError> for AuthError {
    fn from(err: panel_core::StoreError) -> Self {
        match err {
            panel_core::StoreError::Conflict(_) => AuthError::ConnectionConflict,
            panel_core::StoreError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}
