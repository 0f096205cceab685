//! Request executor and session token state for the ME Frp API.
//!
//! # Design
//! Every endpoint wrapper funnels through `Client::execute`, which builds the
//! request, sends it exactly once, and decodes the envelope without judging
//! its business code. Judging is left to the wrapper (`Envelope::into_result`).
//!
//! The bearer token is the only mutable state. It lives behind an `RwLock`
//! so concurrent calls can read it for header injection while `login` or
//! `reset_access_key` replace it. Nothing outside this crate can write it.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::envelope::{decode_envelope, Envelope};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{Transport, UreqTransport};

/// Body argument for calls that send none.
pub(crate) const NO_BODY: Option<&()> = None;

/// Blocking client for the ME Frp API.
///
/// `Client` is `Send + Sync`; share it behind an `Arc` to issue calls from
/// several threads.
pub struct Client {
    config: ClientConfig,
    token: RwLock<Option<String>>,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client using the default blocking `ureq` transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Result<Self, ClientError>
    where
        T: Transport + 'static,
    {
        config.validate()?;
        let token = RwLock::new(config.token.clone());
        Ok(Self {
            config,
            token,
            transport: Box::new(transport),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The bearer token currently attached to requests.
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the session token with one issued by the service.
    pub(crate) fn store_token(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = (!token.is_empty()).then(|| token.to_string());
        tracing::info!(authenticated = guard.is_some(), "session token replaced");
    }

    /// Join `path` onto the base URL. A query string already in `path` is
    /// kept as-is.
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.config.base_url)
        } else {
            format!("{}/{path}", self.config.base_url)
        }
    }

    /// Build the request for one call without sending it.
    ///
    /// A body is serialized to JSON and sent with `content-type:
    /// application/json` whatever the method. `authorization` is present
    /// only while a token is held.
    pub fn build_request<B>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> Result<HttpRequest, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = Vec::new();

        let body = body
            .map(|b| serde_json::to_string(b).map_err(ClientError::Serialization))
            .transpose()?;
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        if let Some(token) = self.token.read().unwrap_or_else(PoisonError::into_inner).as_deref() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        if let Some(user_agent) = &self.config.user_agent {
            headers.push(("user-agent".to_string(), user_agent.clone()));
        }

        Ok(HttpRequest {
            method,
            url: self.url(path),
            headers,
            body,
        })
    }

    /// Send one request and decode its envelope.
    ///
    /// Returns `Transport` or `Decode` errors only (and `Serialization` if
    /// the body cannot be encoded). A non-200 business code comes back inside
    /// the `Envelope` for the caller to judge.
    pub fn execute<B, T>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> Result<Envelope<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, body)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            authenticated = request.header("authorization").is_some(),
            has_body = request.body.is_some(),
            "sending request"
        );

        let response = self.transport.send(&request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");

        decode_envelope(&response)
    }

    pub(crate) fn get<T>(&self, path: &str) -> Result<Envelope<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        self.execute(HttpMethod::Get, path, NO_BODY)
    }

    pub(crate) fn post<B, T>(&self, path: &str, body: &B) -> Result<Envelope<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(HttpMethod::Post, path, Some(body))
    }
}
