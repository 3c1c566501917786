//! Account endpoint wrappers.
//!
//! Login and register go out without the credential; the identity endpoint
//! always carries it.

use serde::Serialize;
use serde_json::Value;

use super::gateway::{Gateway, RequestOptions};
use super::types::{Identity, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::error::RequestError;

pub const REGISTER_PATH: &str = "accounts/register";
pub const LOGIN_PATH: &str = "accounts/login";
pub const ME_PATH: &str = "accounts/me";

fn encode<T: Serialize>(payload: &T) -> Result<Value, RequestError> {
    serde_json::to_value(payload).map_err(|e| RequestError::Encode(e.to_string()))
}

/// Create an account via `POST accounts/register`.
///
/// # Errors
///
/// Returns the gateway's classified failure (e.g. 409 when the email exists).
pub async fn register(gateway: &Gateway, request: &RegisterRequest<'_>) -> Result<RegisterResponse, RequestError> {
    let body = encode(request)?;
    gateway
        .request(REGISTER_PATH, RequestOptions::post(body).public())
        .await
}

/// Exchange credentials for a token via `POST accounts/login`.
///
/// # Errors
///
/// Returns the gateway's classified failure, or `Decode` if the response
/// carries neither token shape.
pub async fn login(gateway: &Gateway, email: &str, password: &str) -> Result<LoginResponse, RequestError> {
    let body = encode(&LoginRequest { email, password })?;
    gateway
        .request(LOGIN_PATH, RequestOptions::post(body).public())
        .await
}

/// Fetch the current user via `GET accounts/me`.
///
/// # Errors
///
/// Returns `Unauthorized` when the credential is missing or rejected.
pub async fn me(gateway: &Gateway) -> Result<Identity, RequestError> {
    gateway.request(ME_PATH, RequestOptions::get()).await
}
