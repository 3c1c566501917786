//! Wire DTOs for the account endpoints.
//!
//! DESIGN
//! ======
//! Only the shapes the session layer needs: the identity record, the two
//! accepted login-response shapes, and the registration request/response.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// The authenticated user as returned by the identity endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric user identifier.
    pub id: i64,
    pub email: String,
    /// Display name, if the user set one.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Account creation timestamp, as sent by the server.
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login response: either a bare `token` or an OAuth-style `access_token`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    AccessToken {
        access_token: String,
        #[serde(default)]
        token_type: Option<String>,
    },
    Token {
        token: String,
    },
}

impl LoginResponse {
    /// The credential, whichever shape carried it.
    #[must_use]
    pub fn into_token(self) -> String {
        match self {
            Self::AccessToken { access_token, .. } => access_token,
            Self::Token { token } => token,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<&'a str>,
}

/// Registration result. Servers answer either with the created record or a
/// bare `{"ok": true}`, so every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
}
