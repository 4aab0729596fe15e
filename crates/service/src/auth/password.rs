//! Password hashing.
//!
//! New hashes are argon2 PHC strings. Accounts created by the earlier Python
//! deployment carry werkzeug hashes (`pbkdf2:sha256:600000$salt$hex` or
//! `scrypt:32768:8:1$salt$hex`); those still verify and are reported as
//! [`Verification::LegacyMatch`] so the caller can upgrade them.

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;
use sha2::{Sha256, Sha512};

use super::errors::AuthError;

const WERKZEUG_PBKDF2_ROUNDS: u32 = 600_000;
const WERKZEUG_SCRYPT_N: u64 = 1 << 15;
const WERKZEUG_SCRYPT_R: u32 = 8;
const WERKZEUG_SCRYPT_P: u32 = 1;
const WERKZEUG_SCRYPT_LEN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    Match,
    /// Correct password against a werkzeug hash; rehash it.
    LegacyMatch,
    Mismatch,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

/// Check `password` against a stored hash. Unparseable hashes are `HashError`.
pub fn verify_password(password: &str, stored: &str) -> Result<Verification, AuthError> {
    if stored.starts_with('$') {
        let parsed = PasswordHash::new(stored).map_err(|e| AuthError::HashError(e.to_string()))?;
        return Ok(match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Verification::Match,
            Err(_) => Verification::Mismatch,
        });
    }
    if verify_werkzeug(password.as_bytes(), stored)? {
        Ok(Verification::LegacyMatch)
    } else {
        Ok(Verification::Mismatch)
    }
}

fn malformed(detail: impl std::fmt::Display) -> AuthError {
    AuthError::HashError(format!("malformed werkzeug hash: {detail}"))
}

/// `method$salt$hexdigest`, the salt used as its literal UTF-8 bytes.
fn verify_werkzeug(password: &[u8], stored: &str) -> Result<bool, AuthError> {
    let mut parts = stored.splitn(3, '$');
    let (Some(method), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed("expected method$salt$hash"));
    };
    let expected = hex::decode(digest).map_err(malformed)?;
    let salt = salt.as_bytes();

    let derived = match method.split(':').collect::<Vec<_>>().as_slice() {
        ["pbkdf2", hash_name] => pbkdf2_digest(hash_name, password, salt, WERKZEUG_PBKDF2_ROUNDS)?,
        ["pbkdf2", hash_name, rounds] => {
            let rounds = rounds.parse::<u32>().map_err(malformed)?;
            pbkdf2_digest(hash_name, password, salt, rounds)?
        }
        ["scrypt"] => scrypt_digest(password, salt, WERKZEUG_SCRYPT_N, WERKZEUG_SCRYPT_R, WERKZEUG_SCRYPT_P)?,
        ["scrypt", n, r, p] => scrypt_digest(
            password,
            salt,
            n.parse().map_err(malformed)?,
            r.parse().map_err(malformed)?,
            p.parse().map_err(malformed)?,
        )?,
        _ => return Err(malformed(format!("unsupported method `{method}`"))),
    };
    Ok(digests_match(&derived, &expected))
}

fn pbkdf2_digest(hash_name: &str, password: &[u8], salt: &[u8], rounds: u32) -> Result<Vec<u8>, AuthError> {
    if rounds == 0 {
        return Err(malformed("zero rounds"));
    }
    let out = match hash_name {
        "sha256" => {
            let mut out = vec![0u8; 32];
            pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut out);
            out
        }
        "sha512" => {
            let mut out = vec![0u8; 64];
            pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, rounds, &mut out);
            out
        }
        other => return Err(malformed(format!("unsupported digest `{other}`"))),
    };
    Ok(out)
}

fn scrypt_digest(password: &[u8], salt: &[u8], n: u64, r: u32, p: u32) -> Result<Vec<u8>, AuthError> {
    if n < 2 || !n.is_power_of_two() {
        return Err(malformed(format!("scrypt n={n} is not a power of two")));
    }
    let params = scrypt::Params::new(n.trailing_zeros() as u8, r, p, WERKZEUG_SCRYPT_LEN).map_err(malformed)?;
    let mut out = vec![0u8; WERKZEUG_SCRYPT_LEN];
    scrypt::scrypt(password, salt, &params, &mut out).map_err(malformed)?;
    Ok(out)
}

/// Length leaks, contents do not.
fn digests_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
