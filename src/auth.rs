//! Password hashing and bearer-token auth.
//!
//! Passwords are hashed with argon2id; tokens are HS256 JWTs. Expiry is the
//! only invalidation mechanism — there is no server-side session table.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use wagon_core::config::AuthConfig;
use wagon_core::error::WagonError;

/// JWT claims for an authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, WagonError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| WagonError::Auth(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Issue a signed token for a user.
pub fn issue_token(config: &AuthConfig, user_id: &str, email: &str) -> Result<String, WagonError> {
    if config.jwt_secret.is_empty() {
        return Err(WagonError::Auth(
            "auth.jwt_secret is not configured".into(),
        ));
    }
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + config.token_ttl_hours * 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| WagonError::Auth(format!("token signing failed: {e}")))
}

/// Validate a token and return its claims. Expired or tampered tokens fail.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, WagonError> {
    if config.jwt_secret.is_empty() {
        return Err(WagonError::Auth(
            "auth.jwt_secret is not configured".into(),
        ));
    }
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| WagonError::Auth(format!("invalid token: {e}")))
}
