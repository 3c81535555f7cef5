//! Token claims
//!
//! This module defines the signed payload carried inside a panel bearer
//! token: who the user is, which partner they belong to, and the issuance
//! and expiry timestamps. Claims are immutable once signed.

use chrono::{DateTime, Duration, Utc};
use panel_core::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a panel bearer token.
///
/// Built from a user record at issuance; the user is guaranteed to exist
/// at that point, but validation is purely cryptographic, so callers who
/// need freshness must re-fetch the user by `sub`.
///
/// # Example
///
/// ```rust,no_run
/// use panel_auth::Claims;
/// use panel_core::User;
/// use uuid::Uuid;
///
/// let user = User::new(Uuid::now_v7(), "user@example.com", "hash");
/// let claims = Claims::for_user(&user, "panel-api", chrono::Duration::hours(24));
/// assert_eq!(claims.sub, user.id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: Uuid,

    /// Partner the user belongs to
    pub partner_id: Uuid,

    /// User email at issuance time
    pub email: String,

    /// User locale at issuance time
    pub locale: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Build claims for a user, valid from now for `lifetime`.
    pub fn for_user(user: &User, issuer: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            partner_id: user.partner_id,
            email: user.email.clone(),
            locale: user.locale.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.into(),
        }
    }

    /// Check if the claims have expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Get expiration as a DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_from_user() {
        let user = User::new(Uuid::now_v7(), "a@x.com", "hash").with_locale("sv");
        let claims = Claims::for_user(&user, "panel-api", Duration::hours(24));

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.partner_id, user.partner_id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.locale, "sv");
        assert_eq!(claims.iss, "panel-api");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_claims() {
        let user = User::new(Uuid::now_v7(), "a@x.com", "hash");
        let mut claims = Claims::for_user(&user, "panel-api", Duration::hours(1));
        claims.exp = Utc::now().timestamp() - 10;

        assert!(claims.is_expired());
    }
}
