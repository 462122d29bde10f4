/// Authenticated request context
///
/// After the API server validates a bearer token, it inserts an
/// [`AuthContext`] into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor, so session identity is always an
/// explicit parameter rather than ambient state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::Role;

/// Identity and role of the authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email from the session token
    pub email: String,

    /// Role from the session token
    pub role: Role,
}

impl AuthContext {
    /// Builds a context from validated session claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }

    /// True if the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
