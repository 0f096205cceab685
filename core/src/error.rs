//! Error types for the ME Frp API client.
//!
//! # Design
//! Three kinds never overlap. `Transport` means no response arrived.
//! `Decode` means a response arrived but its body is not an envelope.
//! `Api` means the envelope decoded and its business `code` was not 200.
//! The executor only ever returns the first two; `Api` is produced by each
//! endpoint wrapper when it judges the decoded envelope.

/// Errors returned by `Client`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection refused, DNS, TLS, timeout, or a body that could not be read.
    #[error("transport error: {source}")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The response body is not a JSON envelope of the expected shape.
    #[error("decode error: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        raw_body: String,
    },

    /// The envelope's business code was not 200.
    #[error("api error: {message} (code: {code})")]
    Api { code: i64, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn transport<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ClientError::Transport {
            source: source.into(),
        }
    }

    /// Business code carried by an `Api` error.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
