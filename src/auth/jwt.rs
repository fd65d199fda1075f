//! Session Token Handler
//! Mission: Sign and verify the tokens that name a server-side session

use crate::auth::models::{Claims, Session};
use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// HS256 signer for session tokens
pub struct JwtHandler {
    secret: String,
}

impl JwtHandler {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Sign a token for `session`, expiring with it.
    pub fn generate_token(&self, session: &Session) -> Result<String> {
        let claims = Claims {
            sub: session.principal_id.clone(),
            sid: session.id.to_string(),
            school: session.school,
            exp: session.expires_at.timestamp() as usize,
        };

        debug!(
            "Signing session token {} for principal {}",
            session.id, session.principal_id
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign session token")
    }

    /// Verify signature and expiry, returning the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}
