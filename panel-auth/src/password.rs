//! Password hashing and verification
//!
//! Stored hashes use the PHC string format produced by the panel's
//! provisioning tooling:
//!
//! ```text
//! $argon2id$v=19$m=65536,t=3,p=4$<salt_b64>$<hash_b64>
//! ```
//!
//! Salt and digest are standard (non-URL) base64 without padding. The
//! verifier parses the parameters out of the stored string and recomputes
//! the digest, so hashes produced with different cost parameters keep
//! verifying after the defaults change.

use crate::error::{AuthError, AuthResult};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Default Argon2id memory cost (KiB). Matches the panel seeders.
const MEMORY_COST: u32 = 65536;
/// Default Argon2id iteration count.
const TIME_COST: u32 = 3;
/// Default Argon2id lane count.
const PARALLELISM: u32 = 4;
/// Digest length in bytes.
const OUTPUT_LEN: usize = 32;
/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Any structural problem with the stored hash (wrong field count,
/// unknown algorithm tag, unparseable parameters, invalid base64) is
/// indistinguishable from a wrong password: the function returns `false`
/// and never panics or reports which stage failed.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 6 || parts[1] != "argon2id" {
        return false;
    }

    // Parameters arrive as "m=65536,t=3,p=4", in that order.
    let params: Vec<&str> = parts[3].split(',').collect();
    if params.len() != 3 {
        return false;
    }
    let Some(memory) = parse_param(params[0], "m=") else {
        return false;
    };
    let Some(time) = parse_param(params[1], "t=") else {
        return false;
    };
    let Some(parallelism) = parse_param(params[2], "p=") else {
        return false;
    };

    let Ok(salt) = STANDARD_NO_PAD.decode(parts[4]) else {
        return false;
    };
    let Ok(expected) = STANDARD_NO_PAD.decode(parts[5]) else {
        return false;
    };

    // Recompute at the stored digest's length so comparison is
    // byte-for-byte over equal-sized outputs.
    let Ok(params) = Params::new(memory, time, parallelism, Some(expected.len())) else {
        return false;
    };
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut computed = vec![0u8; expected.len()];
    if argon2
        .hash_password_into(password.as_bytes(), &salt, &mut computed)
        .is_err()
    {
        return false;
    }

    computed.ct_eq(&expected).into()
}

/// Hash a password into the PHC string format with the default parameters.
///
/// Used by provisioning/seeding flows and tests; login never hashes, it
/// only verifies.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| AuthError::Internal(format!("argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut hash = [0u8; OUTPUT_LEN];
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut hash)
        .map_err(|e| AuthError::Internal(format!("argon2: {}", e)))?;

    Ok(format!(
        "$argon2id$v=19$m={},t={},p={}${}${}",
        MEMORY_COST,
        TIME_COST,
        PARALLELISM,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    ))
}

/// Parse a single "k=<int>" parameter with an exact key prefix.
fn parse_param(s: &str, prefix: &str) -> Option<u32> {
    s.strip_prefix(prefix)?.parse().ok()
}
