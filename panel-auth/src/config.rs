//! Signing configuration
//!
//! The signing secret and issuer are deployment-wide values loaded once at
//! process start and injected into the token service and state codec at
//! construction time. Nothing here is mutable global state; tests build
//! their own configs with distinct secrets.

use crate::error::{AuthError, AuthResult};
use crate::token::TokenConfig;

/// Minimum accepted signing-secret length in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Deployment authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC signing secret shared by tokens and redirect state
    pub jwt_secret: String,

    /// Issuer carried in token claims
    pub jwt_issuer: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .finish()
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `JWT_SECRET`: HMAC signing secret (required, at least 32 bytes)
    /// - `JWT_ISSUER`: token issuer (default: "panel-api")
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            jwt_issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "panel-api".to_string()),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// A short secret weakens every token and state signature in the
    /// deployment, so it is rejected up front rather than at first use.
    pub fn validate(&self) -> AuthResult<()> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::Config("missing required config: JWT_SECRET".to_string()));
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 bytes".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the token-service configuration.
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.jwt_secret.clone()).with_issuer(self.jwt_issuer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_missing_secret() {
        let config = AuthConfig {
            jwt_secret: String::new(),
            jwt_issuer: "panel-api".to_string(),
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let config = AuthConfig {
            jwt_secret: "too-short".to_string(),
            jwt_issuer: "panel-api".to_string(),
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_valid_config_builds_token_config() {
        let config = AuthConfig {
            jwt_secret: "a-signing-secret-of-at-least-32-bytes".to_string(),
            jwt_issuer: "panel-api".to_string(),
        };
        config.validate().unwrap();

        let token_config = config.token_config();
        assert_eq!(token_config.issuer, "panel-api");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig {
            jwt_secret: "a-signing-secret-of-at-least-32-bytes".to_string(),
            jwt_issuer: "panel-api".to_string(),
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("signing-secret"));
    }
}
