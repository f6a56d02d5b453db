/// Request authentication context
///
/// The API's auth layer validates the bearer token and inserts an
/// [`AuthContext`] into the request extensions; handlers extract it to learn
/// who is acting.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self { user_id: claims.sub }
    }
}

/// Extracts the token from an `Authorization` header value
///
/// Accepts `Bearer <token>` (scheme matched case-insensitively) and returns
/// None for any other shape.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
