//! Client configuration.
//!
//! Built in code with `ClientConfig::new` and the `with_*` setters, or read
//! from the environment with `ClientConfig::from_env`.

use std::time::Duration;

use crate::error::ClientError;

/// Path used for tunnel updates unless overridden.
///
/// The service documentation lists the create path for this operation, so the
/// path stays configurable until it is confirmed against the live service.
pub const DEFAULT_TUNNEL_UPDATE_PATH: &str = "/auth/proxy/update";

/// Settings a `Client` is constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, e.g. `https://api.example.com/api`. Trailing slashes are stripped.
    pub base_url: String,
    /// Bearer token to start with. `None` means unauthenticated.
    pub token: Option<String>,
    /// Whole-request timeout handed to the transport.
    pub timeout: Option<Duration>,
    /// Sent as the `user-agent` header when set.
    pub user_agent: Option<String>,
    pub tunnel_update_path: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            timeout: None,
            user_agent: None,
            tunnel_update_path: DEFAULT_TUNNEL_UPDATE_PATH.to_string(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_tunnel_update_path(mut self, path: impl Into<String>) -> Self {
        self.tunnel_update_path = path.into();
        self
    }

    /// Read configuration from `MEFRP_BASE_URL` (required), `MEFRP_TOKEN`,
    /// `MEFRP_TIMEOUT_SECS` and `MEFRP_TUNNEL_UPDATE_PATH`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("MEFRP_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ClientError::Config("MEFRP_BASE_URL is not set".to_string()))?;
        let mut config = Self::new(base_url.trim());

        if let Some(token) = lookup("MEFRP_TOKEN") {
            config = config.with_token(token);
        }
        if let Some(secs) = lookup("MEFRP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("MEFRP_TIMEOUT_SECS is not a number: {secs}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(path) = lookup("MEFRP_TUNNEL_UPDATE_PATH") {
            config = config.with_tunnel_update_path(path);
        }
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base url must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if !self.tunnel_update_path.starts_with('/') {
            return Err(ClientError::Config(format!(
                "tunnel update path must start with '/': {}",
                self.tunnel_update_path
            )));
        }
        Ok(())
    }
}
