//! Response types for the auth endpoints.
//!
//! Login and registration are opaque to the client: the server decides what
//! a valid credential is and answers with the user's profile and, optionally,
//! a bearer token for later requests.

use lapak_core::Role;
use serde::Deserialize;

/// Profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    /// Display name; used as the customer name on orders.
    #[serde(default)]
    pub name: String,
    /// Phone number as the server stores it.
    #[serde(default)]
    pub phone: String,
    /// Account role. Accounts without one are customers.
    #[serde(default)]
    pub role: Role,
}

/// Body returned by `POST /login` and `POST /register`.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    /// The authenticated user.
    pub user: UserProfile,
    /// Bearer token, if the server issues one.
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let json = r#"{"user":{"name":"Siti","phone":"081234567890","role":"admin"},"token":"abc"}"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.user.name, "Siti");
        assert_eq!(auth.user.role, Role::Admin);
        assert_eq!(auth.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_minimal_response() {
        let json = r#"{"user":{"name":"Budi","role":"user"}}"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.user.role, Role::Customer);
        assert!(auth.token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let json = r#"{"user":{"name":"Budi"},"token":"very-secret-token"}"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        let debug_output = format!("{auth:?}");
        assert!(debug_output.contains("Budi"));
        assert!(!debug_output.contains("very-secret-token"));
    }
}
