//! Signed OIDC redirect state
//!
//! The OIDC round trip carries transaction state (which partner, which
//! provider, login or account-linking) through an untrusted third-party
//! redirect. This module packs that state into an opaque
//! `base64url(json).base64url(mac)` string, HMAC-signed with the
//! deployment secret, so the callback can trust what comes back.
//!
//! The scheme is structurally the same as the token format but kept
//! separate: the payload shape differs, the lifetime is ten minutes
//! instead of twenty-four hours, and the result is never a bearer
//! credential. It is only handed back to the bridge at the callback step.

use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// How long an encoded state survives between authorize and callback.
pub const STATE_LIFETIME_SECS: i64 = 600;

/// What an OIDC round trip is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OidcMode {
    /// First-time authentication; no session exists yet
    Login,
    /// Link a provider identity to an already-authenticated user
    Connect,
}

impl OidcMode {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OidcMode::Login => "login",
            OidcMode::Connect => "connect",
        }
    }
}

/// The ephemeral state embedded in the OAuth `state` parameter.
///
/// Exists only between the authorize redirect and the callback; never
/// persisted. `user_id` is present only for connect-mode round trips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OidcState {
    /// Transaction mode
    pub mode: OidcMode,

    /// Partner the round trip belongs to
    pub partner_id: Uuid,

    /// Authenticated user (connect mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Configured provider id
    pub provider: String,

    /// Random nonce; generated per round trip, not verified at callback.
    /// Replay within the lifetime window is bounded by `exp` only.
    pub nonce: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl OidcState {
    /// Build a fresh state with a random nonce, expiring in
    /// [`STATE_LIFETIME_SECS`].
    pub fn new(
        mode: OidcMode,
        partner_id: Uuid,
        user_id: Option<Uuid>,
        provider: impl Into<String>,
    ) -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        Self {
            mode,
            partner_id,
            user_id,
            provider: provider.into(),
            nonce,
            exp: Utc::now().timestamp() + STATE_LIFETIME_SECS,
        }
    }

    /// Check if the state has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Codec for signing and verifying redirect state.
///
/// Shares the deployment signing secret with the token service but is a
/// separate value so tests can give each a distinct secret.
#[derive(Clone)]
pub struct StateCodec {
    secret: String,
}

impl std::fmt::Debug for StateCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCodec")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl StateCodec {
    /// Create a codec with the given signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Encode and sign a state into `payload.mac` form, unpadded base64url.
    pub fn encode(&self, state: &OidcState) -> AuthResult<String> {
        let json = serde_json::to_vec(state)
            .map_err(|e| AuthError::Internal(format!("encode state: {}", e)))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let mac = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        Ok(format!("{}.{}", payload, mac))
    }

    /// Verify and decode an opaque state string.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidFormat`]: no `.` separator
    /// - [`AuthError::InvalidSignature`]: MAC does not verify
    /// - [`AuthError::InvalidClaims`]: payload does not decode
    /// - [`AuthError::Expired`]: state lifetime elapsed
    pub fn decode(&self, raw: &str) -> AuthResult<OidcState> {
        let (payload, mac) = raw.split_once('.').ok_or(AuthError::InvalidFormat)?;

        // MAC check before touching the payload bytes.
        let sig = URL_SAFE_NO_PAD
            .decode(mac)
            .map_err(|_| AuthError::InvalidSignature)?;
        self.verify_mac(payload.as_bytes(), &sig)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidClaims)?;
        let state: OidcState =
            serde_json::from_slice(&json).map_err(|_| AuthError::InvalidClaims)?;

        if state.is_expired() {
            return Err(AuthError::Expired);
        }

        Ok(state)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn verify_mac(&self, data: &[u8], sig: &[u8]) -> AuthResult<()> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac.verify_slice(sig).map_err(|_| AuthError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> StateCodec {
        StateCodec::new("test-secret-key-for-state-signing-32ch")
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let codec = test_codec();
        let user_id = Uuid::now_v7();
        let state = OidcState::new(
            OidcMode::Connect,
            Uuid::now_v7(),
            Some(user_id),
            "google",
        );

        let encoded = codec.encode(&state).unwrap();
        assert!(!encoded.contains('='));

        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.user_id, Some(user_id));
    }

    #[test]
    fn test_login_state_has_no_user_id() {
        let codec = test_codec();
        let state = OidcState::new(OidcMode::Login, Uuid::now_v7(), None, "google");

        let decoded = codec.decode(&codec.encode(&state).unwrap()).unwrap();
        assert_eq!(decoded.mode, OidcMode::Login);
        assert!(decoded.user_id.is_none());
    }

    #[test]
    fn test_missing_separator_is_invalid_format() {
        assert!(matches!(
            test_codec().decode("no-separator-here"),
            Err(AuthError::InvalidFormat)
        ));
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let codec = test_codec();
        let state = OidcState::new(OidcMode::Login, Uuid::now_v7(), None, "google");
        let encoded = codec.encode(&state).unwrap();

        let (payload, mac) = encoded.split_once('.').unwrap();
        let mut chars: Vec<char> = payload.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert!(matches!(
            codec.decode(&format!("{}.{}", tampered, mac)),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let state = OidcState::new(OidcMode::Login, Uuid::now_v7(), None, "google");
        let encoded = test_codec().encode(&state).unwrap();

        let other = StateCodec::new("a-completely-different-secret-32-ch");
        assert!(matches!(
            other.decode(&encoded),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_state_rejected() {
        let codec = test_codec();
        let mut state = OidcState::new(OidcMode::Connect, Uuid::now_v7(), Some(Uuid::now_v7()), "google");
        state.exp = Utc::now().timestamp() - 1;

        let encoded = codec.encode(&state).unwrap();
        assert!(matches!(codec.decode(&encoded), Err(AuthError::Expired)));
    }

    #[test]
    fn test_nonce_is_fresh_per_state() {
        let a = OidcState::new(OidcMode::Login, Uuid::now_v7(), None, "google");
        let b = OidcState::new(OidcMode::Login, Uuid::now_v7(), None, "google");
        assert_ne!(a.nonce, b.nonce);
        assert_eq!(a.nonce.len(), 32);
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(serde_json::to_string(&OidcMode::Login).unwrap(), "\"login\"");
        assert_eq!(
            serde_json::to_string(&OidcMode::Connect).unwrap(),
            "\"connect\""
        );
    }
}
