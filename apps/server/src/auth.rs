//! Credential validation and JWT issuance for the API.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use settings::{Secret, ServerSettings};
use thiserror::Error;

const ISSUER: &str = "pushling";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication is not configured")]
    NotConfigured,
    #[error("JWT signing secret is not configured")]
    MissingSecret,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by tokens this API issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

/// Bearer token response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

pub struct AuthService {
    username: Option<String>,
    password: Option<Secret>,
    required: bool,
    secret: Option<Secret>,
    expire_seconds: u64,
    leeway_seconds: u64,
}

impl AuthService {
    pub fn from_settings(server: &ServerSettings) -> Self {
        Self {
            username: server.auth.username.clone(),
            password: server.auth.password.clone(),
            required: server.auth.required,
            secret: server.jwt.secret.clone(),
            expire_seconds: server.jwt.expire_seconds,
            leeway_seconds: server.jwt.leeway_seconds,
        }
    }

    /// Check Basic credentials against the configured pair.
    pub fn validate_credentials(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let (Some(expected_user), Some(expected_pass)) = (&self.username, &self.password) else {
            return Err(AuthError::NotConfigured);
        };
        if expected_user == username && expected_pass.expose() == password {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Issue a signed HS256 token for `username`.
    pub fn create_token(&self, username: &str) -> Result<Token, AuthError> {
        let secret = self.secret.as_ref().ok_or(AuthError::MissingSecret)?;
        let now = unix_now();
        let claims = Claims {
            sub: username.to_string(),
            iss: ISSUER.to_string(),
            aud: ISSUER.to_string(),
            iat: now,
            exp: now + self.expire_seconds,
        };
        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.expose().as_bytes()),
        )?;
        Ok(Token {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.expire_seconds,
        })
    }

    /// Verify a token strictly: signature, expiry (with configured leeway),
    /// issuer and audience.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let secret = self.secret.as_ref().ok_or(AuthError::MissingSecret)?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[ISSUER]);
        validation.leeway = self.leeway_seconds;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.expose().as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    /// Resolve the caller identity for protected endpoints. When auth is not
    /// required, a missing token resolves to a development identity.
    pub fn identity(&self, bearer: Option<&str>) -> Result<Claims, AuthError> {
        match bearer {
            Some(token) => self.verify_token(token),
            None if !self.required => {
                let now = unix_now();
                Ok(Claims {
                    sub: "dev".to_string(),
                    iss: ISSUER.to_string(),
                    aud: ISSUER.to_string(),
                    iat: now,
                    exp: now,
                })
            }
            None => Err(AuthError::MissingToken),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
