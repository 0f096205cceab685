//! Recording transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

enum Canned {
    Response(HttpResponse),
    TransportError(String),
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub(crate) struct StubTransport {
    queue: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub(crate) fn push_json(&self, status: u16, body: &str) {
        self.queue.lock().unwrap().push_back(Canned::Response(HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.as_bytes().to_vec(),
        }));
    }

    pub(crate) fn push_transport_error(&self, message: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Canned::TransportError(message.to_string()));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    /// Parsed JSON body of the last request.
    pub(crate) fn last_body(&self) -> serde_json::Value {
        let req = self.last_request();
        serde_json::from_str(req.body.as_deref().expect("request had no body")).unwrap()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.queue.lock().unwrap().pop_front() {
            Some(Canned::Response(response)) => Ok(response),
            Some(Canned::TransportError(message)) => Err(ClientError::transport(message)),
            None => Err(ClientError::transport("stub transport has no queued response")),
        }
    }
}

impl Transport for Arc<StubTransport> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        self.as_ref().send(request)
    }
}

/// A client wired to a fresh stub, plus a handle to inspect the stub.
pub(crate) fn stub_client() -> (Client, Arc<StubTransport>) {
    let stub = Arc::new(StubTransport::default());
    let client = Client::with_transport(ClientConfig::new("http://localhost:3000"), Arc::clone(&stub)).unwrap();
    (client, stub)
}
