//! Bearer token issuance and validation
//!
//! Tokens are compact three-segment strings,
//! `base64url(header).base64url(claims).base64url(signature)`, signed with
//! HMAC-SHA256 over the first two dot-joined segments. No segment carries
//! padding. The header is a fixed constant: a deployment uses exactly one
//! algorithm, so nothing in the header is attacker-controllable input.
//!
//! Validation order is deliberate: the signature is verified over the raw
//! segments before the claims payload is decoded, so a forged or corrupted
//! payload is never deserialized, let alone trusted.

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use panel_core::User;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed token header: one algorithm per deployment.
const TOKEN_HEADER: &[u8] = br#"{"alg":"HS256","typ":"JWT"}"#;

/// Token configuration.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret shared across the deployment
    pub secret: String,

    /// Issuer carried in claims (not enforced at validation)
    pub issuer: String,

    /// Token lifetime, fixed at issuance
    pub lifetime: Duration,
}

impl TokenConfig {
    /// Create a configuration with the default issuer and 24-hour lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "panel-api".to_string(),
            lifetime: Duration::hours(24),
        }
    }

    /// Set the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the token lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Token service for issuing and validating panel bearer tokens.
///
/// Stateless and cheap to clone; safe for unsynchronized concurrent use.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    /// Create a new token service with the given configuration.
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Create with a secret and default issuer/lifetime.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self::new(TokenConfig::new(secret))
    }

    /// Issue a signed token for the given user.
    ///
    /// Claims are built from the user record; `iat` is now and `exp` is
    /// now plus the configured lifetime.
    pub fn issue(&self, user: &User) -> AuthResult<String> {
        let claims = Claims::for_user(user, &self.config.issuer, self.config.lifetime);
        self.encode_claims(&claims)
    }

    /// Sign arbitrary claims into a token string.
    ///
    /// `issue` is the normal entry point; this exists so callers (and
    /// tests) can sign claims with explicit timestamps.
    pub fn encode_claims(&self, claims: &Claims) -> AuthResult<String> {
        let header = URL_SAFE_NO_PAD.encode(TOKEN_HEADER);

        let claims_json = serde_json::to_vec(claims)
            .map_err(|e| AuthError::Internal(format!("encode claims: {}", e)))?;
        let payload = URL_SAFE_NO_PAD.encode(claims_json);

        let signing_input = format!("{}.{}", header, payload);
        let sig = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));

        Ok(format!("{}.{}", signing_input, sig))
    }

    /// Validate a token string and return its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidFormat`]: not exactly three segments
    /// - [`AuthError::InvalidSignature`]: signature does not verify
    /// - [`AuthError::InvalidClaims`]: payload does not decode
    /// - [`AuthError::Expired`]: `exp` is in the past
    pub fn validate(&self, token: &str) -> AuthResult<Claims> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::InvalidFormat);
        }

        // Signature check first, over the raw dot-joined segments. The
        // payload is untrusted bytes until this passes.
        let signing_input = &token[..parts[0].len() + 1 + parts[1].len()];
        let sig = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| AuthError::InvalidSignature)?;
        self.verify_mac(signing_input.as_bytes(), &sig)?;

        let payload = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| AuthError::InvalidClaims)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidClaims)?;

        if Utc::now().timestamp() > claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    /// Get the configuration.
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    /// Constant-time MAC verification; `Mac::verify_slice` does not
    /// short-circuit on the first mismatching byte.
    fn verify_mac(&self, data: &[u8], sig: &[u8]) -> AuthResult<()> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac.verify_slice(sig).map_err(|_| AuthError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_service() -> TokenService {
        TokenService::with_secret("test-secret-key-for-token-signing-32ch")
    }

    fn test_user() -> User {
        User::new(Uuid::now_v7(), "a@x.com", "hash").with_locale("en")
    }

    /// Flip one character of a token segment, keeping it base64url-safe.
    fn flip_char(s: &str, idx: usize) -> String {
        let mut chars: Vec<char> = s.chars().collect();
        chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = test_service();
        let user = test_user();

        let token = service.issue(&user).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.partner_id, user.partner_id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.iss, "panel-api");
    }

    #[test]
    fn test_no_padding_in_any_segment() {
        let token = test_service().issue(&test_user()).unwrap();
        assert!(!token.contains('='));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_wrong_part_count_is_invalid_format() {
        let service = test_service();
        assert!(matches!(
            service.validate("onlyonepart"),
            Err(AuthError::InvalidFormat)
        ));
        assert!(matches!(
            service.validate("two.parts"),
            Err(AuthError::InvalidFormat)
        ));
        assert!(matches!(
            service.validate("a.b.c.d"),
            Err(AuthError::InvalidFormat)
        ));
    }

    #[test]
    fn test_tampered_signature_is_invalid_signature() {
        let service = test_service();
        let token = service.issue(&test_user()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        for idx in 0..parts[2].len() {
            let tampered = format!("{}.{}.{}", parts[0], parts[1], flip_char(parts[2], idx));
            if tampered == token {
                continue;
            }
            assert!(
                matches!(service.validate(&tampered), Err(AuthError::InvalidSignature)),
                "flipping signature char {} must fail with InvalidSignature",
                idx
            );
        }
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        // Signature verification precedes claims parsing, so payload
        // tampering surfaces as a signature failure, not a claims failure.
        let service = test_service();
        let token = service.issue(&test_user()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let tampered = format!("{}.{}.{}", parts[0], flip_char(parts[1], 0), parts[2]);
        assert!(matches!(
            service.validate(&tampered),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_different_secret_is_invalid_signature() {
        let token = test_service().issue(&test_user()).unwrap();
        let other = TokenService::with_secret("a-completely-different-secret-32-ch");

        assert!(matches!(
            other.validate(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected_despite_valid_signature() {
        let service = test_service();
        let user = test_user();

        let mut claims = Claims::for_user(&user, "panel-api", Duration::hours(1));
        claims.exp = Utc::now().timestamp() - 60;

        let token = service.encode_claims(&claims).unwrap();
        assert!(matches!(service.validate(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let service = test_service();
        let debug = format!("{:?}", service);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-secret-key"));
    }
}
