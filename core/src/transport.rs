//! The I/O seam between the client and the network.
//!
//! # Design
//! `Transport` takes a fully built `HttpRequest` and returns whatever the
//! server answered, with any HTTP status, as an `HttpResponse`. Only a failure
//! to obtain a response is an error. `UreqTransport` is the blocking default;
//! tests substitute recording transports.

use std::io::Read;
use std::time::Duration;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Largest response body kept. Anything beyond is cut off, which leaves
/// invalid JSON for envelope decoding to reject.
pub const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// Executes one HTTP round-trip. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// The agent is built with `http_status_as_error(false)` so 4xx/5xx
/// responses come back as data for envelope decoding.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds the whole call; `None` leaves ureq's defaults.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();

        // GET may carry a body: /auth/node/secret expects one.
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, None) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Get, Some(body)) => {
                with_headers(self.agent.get(url).force_send_body(), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(url), headers).send(body.as_bytes()),
        };

        let mut response = result.map_err(|e| {
            tracing::warn!(method = %request.method, url, error = %e, "transport failure");
            ClientError::transport(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let mut body = Vec::new();
        response
            .body_mut()
            .as_reader()
            .take(MAX_BODY_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(|e| {
                tracing::warn!(method = %request.method, url, error = %e, "failed to read response body");
                ClientError::transport(e)
            })?;
        if body.len() as u64 > MAX_BODY_BYTES {
            tracing::warn!(method = %request.method, url, limit = MAX_BODY_BYTES, "response body truncated");
            body.truncate(MAX_BODY_BYTES as usize);
        }

        Ok(HttpResponse { status, headers, body })
    }
}
