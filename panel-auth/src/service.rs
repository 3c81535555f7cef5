//! Login service
//!
//! Ties the user store, credential verifier, and token service together
//! into the panel's email+password login flow. All lookups are
//! partner-scoped.

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::password::verify_password;
use crate::token::TokenService;
use panel_core::{User, UserStore};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Authentication service for a deployment.
///
/// Stateless beyond the injected store handle and signing configuration;
/// clones share the store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl AuthService {
    /// Create a new authentication service.
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Authenticate a user by email and password within a partner,
    /// returning a signed token on success.
    ///
    /// Unknown email and wrong password both fail with
    /// [`AuthError::InvalidCredentials`]; the two outcomes are
    /// indistinguishable so the endpoint cannot enumerate accounts.
    #[instrument(skip_all, fields(partner_id = %partner_id))]
    pub async fn login(
        &self,
        partner_id: Uuid,
        email: &str,
        password: &str,
    ) -> AuthResult<String> {
        let user = match self.users.find_by_email(partner_id, email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Internal(e.to_string())),
        };

        if !verify_password(password, &user.password_hash) {
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        debug!(user_id = %user.id, "login succeeded");
        Ok(token)
    }

    /// Issue a token for an already-resolved user (OIDC login, admin
    /// impersonation).
    pub fn issue_token(&self, user: &User) -> AuthResult<String> {
        self.tokens.issue(user)
    }

    /// Validate a bearer token and return its claims.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        self.tokens.validate(token)
    }

    /// Get the user store handle.
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }
}
