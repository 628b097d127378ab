use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use game_types::User;

/// Claims carried by a signed session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,             // Player id (UUID)
    pub exp: u64,                // Expiry
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>, // Avatar URL
}

pub struct AuthService {
    decoding_key: DecodingKey,
    dev_mode: bool,
}

impl AuthService {
    /// Validate HS256 session tokens signed with `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            dev_mode: false,
        }
    }

    pub fn new_dev_mode() -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(&[]),
            dev_mode: true,
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn validate_token(&self, token: &str) -> Result<User, AuthError> {
        if self.dev_mode {
            return self.validate_dev_token(token);
        }

        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::warn!("Session token validation failed: {:?}", e);
                AuthError::from(e)
            })?;

        Self::claims_to_user(token_data.claims)
    }

    fn claims_to_user(claims: SessionClaims) -> Result<User, AuthError> {
        // A player's id must be stable across requests, so no fallback id here
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            tracing::warn!("Token subject is not a UUID: {}", claims.sub);
            AuthError::InvalidToken
        })?;

        Ok(User {
            id: user_id,
            email: claims.email.unwrap_or_else(|| "unknown@example.com".to_string()),
            display_name: claims.name.unwrap_or_else(|| "Unknown User".to_string()),
            image: claims.picture,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn validate_dev_token(&self, token: &str) -> Result<User, AuthError> {
        tracing::debug!(
            "Validating dev token (first 20 chars): {}",
            token.chars().take(20).collect::<String>()
        );

        // JWT-shaped tokens: read the claims without checking the signature
        if token.split('.').count() == 3 {
            let mut validation = Validation::new(Algorithm::HS256);
            validation.insecure_disable_signature_validation();
            validation.validate_exp = false;
            validation.required_spec_claims.clear();

            let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
                .map_err(|e| {
                    tracing::warn!("Failed to read dev token claims: {:?}", e);
                    AuthError::InvalidToken
                })?;
            return Self::claims_to_user(token_data.claims);
        }

        // Simple string format: "user_id:email:name"
        let mut parts = token.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(user_id), Some(email), Some(name)) if !name.is_empty() => {
                let id = Uuid::parse_str(user_id).map_err(|_| AuthError::InvalidToken)?;
                Ok(User {
                    id,
                    email: email.to_string(),
                    display_name: name.to_string(),
                    image: None,
                    created_at: chrono::Utc::now().to_rfc3339(),
                })
            }
            _ => Err(AuthError::InvalidToken),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}
