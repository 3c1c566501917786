//! Request gateway: the one place requests are built and responses classified.
//!
//! ERROR HANDLING
//! ==============
//! Every response lands in exactly one bucket:
//! - 2xx: the parsed body is returned.
//! - 401: the unauthorized hook runs (once, before the caller sees anything),
//!   then the call fails with `RequestError::Unauthorized`.
//! - anything else: `RequestError::Api` with a message derived from the body.
//!
//! Body parsing never fails: JSON if it parses, raw text otherwise, `Null`
//! when empty.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::rc::Rc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{HttpRequest, Method, Transport, build_url};
use crate::config::SessionConfig;
use crate::error::RequestError;
use crate::util::storage::TokenStore;

/// Receives every 401 the gateway observes.
///
/// The gateway awaits the hook before surfacing the failure, so whatever the
/// hook starts (session termination) begins before any caller's own error
/// handling runs.
#[async_trait(?Send)]
pub trait UnauthorizedHook {
    async fn on_unauthorized(&self, status: u16, body: &Value);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Attach the stored credential, if any. Defaults to true.
    pub requires_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::Get, body: None, requires_auth: true }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post(body: Value) -> Self {
        Self { method: Method::Post, body: Some(body), requires_auth: true }
    }

    /// Send without the credential (login, register).
    #[must_use]
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }
}

pub struct Gateway {
    base_url: String,
    prefix: String,
    transport: Rc<dyn Transport>,
    tokens: TokenStore,
    hook: Option<Rc<dyn UnauthorizedHook>>,
}

impl Gateway {
    pub fn new(config: &SessionConfig, transport: Rc<dyn Transport>, tokens: TokenStore) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            prefix: config.api_prefix.clone(),
            transport,
            tokens,
            hook: None,
        }
    }

    /// Register the single unauthorized subscriber.
    #[must_use]
    pub fn with_unauthorized_hook(mut self, hook: Rc<dyn UnauthorizedHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Final URL for a caller-supplied path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        build_url(&self.base_url, &with_prefix(&self.prefix, path))
    }

    /// Send a request and decode a 2xx body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure, or `Decode` if a 2xx body does not
    /// match `T`.
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, RequestError> {
        let body = self.request_value(path, options).await?;
        serde_json::from_value(body).map_err(|e| RequestError::Decode(e.to_string()))
    }

    /// Send a request and return the parsed 2xx body as-is.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized`, `Api` or `Network` per the classification rules.
    pub async fn request_value(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        let mut headers = vec![("Content-Type".to_owned(), "application/json".to_owned())];
        if options.requires_auth {
            if let Some(token) = self.tokens.get() {
                headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
            }
        }

        let request = HttpRequest {
            method: options.method,
            url: self.url_for(path),
            headers,
            body: options.body.as_ref().map(Value::to_string),
        };
        let method = request.method.as_str();
        let url = request.url.clone();

        let response = self.transport.send(request).await.map_err(|err| {
            tracing::warn!(method, %url, error = %err, "request failed");
            RequestError::Network(err.0)
        })?;

        let body = parse_body(&response.body);
        match response.status {
            200..=299 => Ok(body),
            401 => {
                tracing::warn!(method, %url, "request unauthorized");
                if let Some(hook) = &self.hook {
                    hook.on_unauthorized(401, &body).await;
                }
                Err(RequestError::Unauthorized { status: 401, body })
            }
            status => {
                let message = error_message(status, &body);
                tracing::debug!(method, %url, status, %message, "request rejected");
                Err(RequestError::Api { status, message, body })
            }
        }
    }
}

/// Route `path` under `prefix` exactly once.
pub(crate) fn with_prefix(prefix: &str, path: &str) -> String {
    if path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/')) {
        return path.to_owned();
    }
    match path.strip_prefix('/') {
        Some(rest) => format!("{prefix}/{rest}"),
        None => format!("{prefix}/{path}"),
    }
}

pub(crate) fn parse_body(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Display message for a non-2xx response.
///
/// Preference order: a string `detail`, the first `msg` of a list-shaped
/// `detail`, a plain-text body, then `HTTP {status}`.
pub(crate) fn error_message(status: u16, body: &Value) -> String {
    if let Some(message) = detail_message(body) {
        return message.to_owned();
    }
    match body {
        Value::String(text) => text.clone(),
        _ => format!("HTTP {status}"),
    }
}

fn detail_message(body: &Value) -> Option<&str> {
    match body.get("detail")? {
        Value::String(detail) => Some(detail),
        Value::Array(items) => items.first()?.get("msg")?.as_str(),
        _ => None,
    }
}
