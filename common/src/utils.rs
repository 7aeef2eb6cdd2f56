// common/src/utils.rs
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::models::session::{AdminIdentity, SessionTokenError};

/// Setup tracing for consistent logging across services
pub fn setup_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

// JWT claims carried by the session cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,   // username
    pub admin: bool,   // admin flag
    pub exp: i64,      // expiration time
    pub iat: i64,      // issued at time
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// Issue a signed session token for a verified user
pub fn issue_session_token(
    username: &str,
    is_admin: bool,
    ttl_seconds: i64,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = unix_now();

    let claims = AdminClaims {
        sub: username.to_string(),
        admin: is_admin,
        iat: now,
        exp: now + ttl_seconds,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

// Verify a session token and recover the identity it carries
pub fn verify_session_token(token: &str, secret: &[u8]) -> Result<AdminIdentity, SessionTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is exact: no clock leeway on the boundary
    validation.leeway = 0;

    let token_data = decode::<AdminClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|_| SessionTokenError::Invalid)?;

    Ok(AdminIdentity::from_claims(&token_data.claims))
}
