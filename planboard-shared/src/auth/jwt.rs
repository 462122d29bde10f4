/// Session token generation and validation
///
/// Sessions are stateless JWTs signed with HS256 and a process-wide
/// secret. Claims carry identity (user id, email) and role, with a fixed
/// one-day expiry. There are no refresh tokens and no rotation; an
/// expired session means logging in again.
///
/// # Example
///
/// ```
/// use planboard_shared::auth::jwt::{create_token, validate_token, Claims};
/// use planboard_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "user@example.com".to_string(), Role::User);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
///
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Token issuer claim value
const ISSUER: &str = "planboard";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Invalid token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// Session token claims
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus the identity
/// fields the server needs on every authenticated request without a user
/// lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID
    pub sub: Uuid,

    /// Email at time of issuance
    pub email: String,

    /// Account role at time of issuance
    pub role: Role,

    /// Issuer, always "planboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Fixed session lifetime: one day
    pub fn session_lifetime() -> Duration {
        Duration::days(1)
    }

    /// Creates claims expiring one day from now
    pub fn new(user_id: Uuid, email: String, role: Role) -> Self {
        Self::with_expiration(user_id, email, role, Self::session_lifetime())
    }

    /// Creates claims with a custom expiration (used by tests)
    pub fn with_expiration(user_id: Uuid, email: String, role: Role, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            email,
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed session token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies the signature, expiry, not-before time, and issuer.
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens so callers can surface
/// an expiry-specific message, and `JwtError::ValidationError` for every
/// other failure.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "user@example.com".to_string(), Role::User);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "planboard");
        assert!(!claims.is_expired());
        // One-day expiry
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "admin@example.com".to_string(), Role::Admin);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.email, "admin@example.com");
        assert_eq!(validated.role, Role::Admin);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "u@example.com".to_string(), Role::User);
        let token = create_token(&claims, SECRET).expect("Should create token");

        assert!(validate_token(&token, "a-completely-different-secret-key").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "u@example.com".to_string(),
            Role::User,
            Duration::seconds(-3600),
        );
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }

    #[test]
    fn test_validate_garbage_token() {
        assert!(matches!(
            validate_token("not.a.token", SECRET).unwrap_err(),
            JwtError::ValidationError(_)
        ));
    }
}
