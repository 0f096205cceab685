//! Request and response payloads for the ME Frp API.
//!
//! # Design
//! Request bodies are fully typed since the client writes them. Response
//! payloads type only the fields the client uses to address resources or
//! hands back directly (ids, tokens, config text). Everything else the
//! service sends is kept in a flattened `fields` map so no data is lost
//! when the service adds or renames fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailCodeRequest {
    pub email: String,
    pub captcha_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub email_code: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub captcha_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoverAccountRequest {
    pub username: String,
    pub password: String,
}

/// Changing the password also resets the frp token and access key server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaRequest {
    pub captcha_token: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeIdRequest {
    pub node_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyIdRequest {
    pub proxy_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToggleTunnelRequest {
    pub proxy_id: i64,
    pub is_disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TunnelConfigRequest {
    pub proxy_id: i64,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TunnelConfigsRequest {
    pub proxy_ids: Vec<i64>,
    pub format: String,
}

/// Tunnel definition sent to create and update.
///
/// `proxy_id` is only sent when set. Service options without a typed field
/// (encryption, compression, host rewrites, ...) go in `options`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TunnelDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<i64>,
    pub node_id: i64,
    pub proxy_name: String,
    pub proxy_type: String,
    pub local_ip: String,
    pub local_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// Query for the operation log listing. `start_time`/`end_time` are passed
/// through as the service formats them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub page: u32,
    pub page_size: u32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl LogQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            start_time: None,
            end_time: None,
        }
    }

    pub fn between(mut self, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        self.start_time = Some(start_time.into());
        self.end_time = Some(end_time.into());
        self
    }

    /// Query string without the leading `?`. Values are form-urlencoded;
    /// unset or empty times are omitted.
    pub fn to_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("page", &self.page.to_string());
        query.append_pair("pageSize", &self.page_size.to_string());
        if let Some(start) = self.start_time.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("startTime", start);
        }
        if let Some(end) = self.end_time.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("endTime", end);
        }
        query.finish()
    }
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Opaque service record: the full JSON object as sent.
macro_rules! opaque_payload {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
        pub struct $name {
            #[serde(flatten)]
            pub fields: Map<String, Value>,
        }

        impl $name {
            pub fn get(&self, key: &str) -> Option<&Value> {
                self.fields.get(key)
            }
        }
    };
}

opaque_payload!(
    /// Live status of a node (load, online state, ...).
    NodeStatus
);
opaque_payload!(
    /// Credentials for connecting frpc to a node.
    NodeToken
);
opaque_payload!(
    /// Connection address of a node the user has tunnels on.
    NodeConnection
);
opaque_payload!(Statistics);
opaque_payload!(StoreItem);
opaque_payload!(UserInfo);
opaque_payload!(UserGroup);
opaque_payload!(OperationLogList);
opaque_payload!(UserLogStats);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub node_id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tunnel {
    #[serde(default)]
    pub proxy_id: i64,
    #[serde(default)]
    pub node_id: i64,
    #[serde(default)]
    pub proxy_name: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Generated frpc configuration for one or more tunnels.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TunnelConfig {
    #[serde(default)]
    pub config: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Reject `""` where the service must hand back a credential.
fn non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.is_empty() {
        return Err(serde::de::Error::invalid_value(serde::de::Unexpected::Str(""), &"a non-empty token"));
    }
    Ok(value)
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(deserialize_with = "non_empty")]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewTokenResponse {
    #[serde(deserialize_with = "non_empty")]
    pub new_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UserGroupsResponse {
    #[serde(default)]
    pub groups: Vec<UserGroup>,
}

/// The log listing nests its payload one level deeper than other calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OperationLogPage {
    #[serde(default)]
    pub data: OperationLogList,
}
