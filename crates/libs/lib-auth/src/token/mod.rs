//! # JWT Token Management
//!
//! Encoding and validation of the HS256 bearer tokens that carry a user's
//! identity and role to the chat endpoints.

use crate::identity::{Identity, Role};
use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lib_utils::now_utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT Claims structure containing user authentication information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Account role
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Convert validated claims into an [`Identity`].
    pub fn into_identity(self) -> Result<Identity, TokenError> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidSubject(self.sub.clone()))?;
        Ok(Identity::new(user_id, self.username, self.role))
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode JWT: {0}")]
    Encode(String),

    #[error("Failed to decode JWT: {0}")]
    Decode(String),

    #[error("Token subject is not a user id: {0}")]
    InvalidSubject(String),
}

/// Encode a JWT token for an identity.
pub fn encode_jwt(
    identity: &Identity,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, TokenError> {
    let now = now_utc();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: identity.user_id.to_string(),
        username: identity.username.clone(),
        role: identity.role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Encode(e.to_string()))
}

/// Decode and validate a JWT token.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| TokenError::Decode(e.to_string()))?;

    Ok(token_data.claims)
}

/// Decode a token straight into an [`Identity`].
pub fn identity_from_token(token: &str, secret: &str) -> Result<Identity, TokenError> {
    decode_jwt(token, secret)?.into_identity()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-must-be-at-least-32-chars-long!";

    #[test]
    fn test_jwt_encoding_decoding() {
        let identity = Identity::new(7, "dana", Role::Agent);

        let token = encode_jwt(&identity, SECRET, 24)
            .expect("JWT encoding should succeed");
        let claims = decode_jwt(&token, SECRET)
            .expect("JWT decoding should succeed");

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "dana");
        assert_eq!(claims.role, Role::Agent);
        assert_eq!(claims.into_identity().unwrap(), identity);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let identity = Identity::new(1, "sam", Role::Customer);
        let token = encode_jwt(&identity, SECRET, 1).unwrap();

        let result = identity_from_token(&token, "another-secret-that-is-also-32-chars-long");
        assert!(matches!(result, Err(TokenError::Decode(_))));
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            username: "x".to_string(),
            role: Role::Customer,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.into_identity(), Err(TokenError::InvalidSubject(_))));
    }
}
