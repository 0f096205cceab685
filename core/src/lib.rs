//! Blocking client for the ME Frp tunnel service API.
//!
//! # Overview
//! Every call goes through one executor: `Client::execute` builds an
//! authenticated JSON request, sends it once over a `Transport`, and decodes
//! the `{code, message, data}` envelope the service answers with. Endpoint
//! wrappers (`login`, `node_list`, `delete_tunnel`, ...) then judge the
//! envelope: business code 200 is success, anything else is
//! `ClientError::Api` carrying the service's message and code.
//!
//! # Design
//! - The HTTP status is never used to decide success; the service answers
//!   200 at the transport layer and reports real status in `code`.
//! - `ClientError` keeps transport, decode, and business failures apart.
//! - The session token is set only by `login` and `reset_access_key` and is
//!   guarded by a lock, so a `Client` can be shared across threads.
//! - `Transport` is the only I/O seam; `UreqTransport` is the default.

mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
mod node;
mod public;
pub mod transport;
mod tunnel;
pub mod types;
mod user;

#[cfg(test)]
mod testing;

pub use client::Client;
pub use config::ClientConfig;
pub use envelope::{decode_envelope, Empty, Envelope, SUCCESS_CODE};
pub use error::ClientError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    ChangePasswordRequest, LogQuery, LoginRequest, Node, NodeConnection, NodeStatus, NodeToken, OperationLogList,
    RecoverAccountRequest, RegisterRequest, Statistics, StoreItem, Tunnel, TunnelConfig, TunnelDefinition, UserGroup,
    UserInfo, UserLogStats,
};
