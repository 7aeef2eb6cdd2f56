// common/src/models/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::AdminClaims;

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE_NAME: &str = "emberhollow_session";

/// Identity recovered from a verified session token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    pub username: String,
    pub is_admin: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminIdentity {
    pub fn from_claims(claims: &AdminClaims) -> Self {
        Self {
            username: claims.sub.clone(),
            is_admin: claims.admin,
            issued_at: DateTime::<Utc>::from_timestamp(claims.iat, 0).unwrap_or_default(),
            expires_at: DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_default(),
        }
    }
}

/// Token verification failure. Every bad token looks the same to callers,
/// whether malformed, tampered with, or expired.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("session token is invalid or expired")]
    Invalid,
}

/// Login failure codes surfaced to the login page via the error query param
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginError {
    AuthFailed,
    OauthDenied,
    NoCode,
    TokenFailed,
    UserFailed,
    NotMember,
    ConfigError,
    CallbackFailed,
}

impl LoginError {
    pub fn code(&self) -> &'static str {
        match self {
            LoginError::AuthFailed => "auth_failed",
            LoginError::OauthDenied => "oauth_denied",
            LoginError::NoCode => "no_code",
            LoginError::TokenFailed => "token_failed",
            LoginError::UserFailed => "user_failed",
            LoginError::NotMember => "not_member",
            LoginError::ConfigError => "config_error",
            LoginError::CallbackFailed => "callback_failed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoginError::AuthFailed => "Authentication failed. Please try again.",
            LoginError::OauthDenied => "Discord sign-in was cancelled.",
            LoginError::NoCode => "Discord did not return an authorization code.",
            LoginError::TokenFailed => "Could not exchange the authorization code.",
            LoginError::UserFailed => "Could not fetch your Discord profile.",
            LoginError::NotMember => "You are not a member of the studio Discord.",
            LoginError::ConfigError => "Sign-in is not configured on this server.",
            LoginError::CallbackFailed => "Something went wrong during sign-in.",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "auth_failed" => Some(LoginError::AuthFailed),
            "oauth_denied" => Some(LoginError::OauthDenied),
            "no_code" => Some(LoginError::NoCode),
            "token_failed" => Some(LoginError::TokenFailed),
            "user_failed" => Some(LoginError::UserFailed),
            "not_member" => Some(LoginError::NotMember),
            "config_error" => Some(LoginError::ConfigError),
            "callback_failed" => Some(LoginError::CallbackFailed),
            _ => None,
        }
    }
}
