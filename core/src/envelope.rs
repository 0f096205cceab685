//! The `{code, message, data}` wrapper every service response is sent in.
//!
//! # Design
//! Decoding and judging are separate steps. `decode_envelope` turns a raw
//! response into an `Envelope<T>` and never looks at `code` except to decide
//! how strict to be about `data`. `Envelope::into_result` is the judgement
//! each endpoint wrapper applies: `code == 200` is the only success signal,
//! and the HTTP status plays no part in it.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ClientError;
use crate::http::HttpResponse;

/// Business code the service uses for success.
pub const SUCCESS_CODE: i64 = 200;

/// A decoded response envelope.
///
/// `data` is `None` when the service omitted it, sent `null`, or sent a
/// payload that does not fit `T` alongside a failure code.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub code: i64,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Judge the envelope: any code other than 200 becomes `ClientError::Api`
    /// with the service's message and code verbatim.
    ///
    /// A successful envelope without data yields `T::default()`, which is what
    /// the service means when it drops an empty list or an empty object.
    pub fn into_result(self) -> Result<T, ClientError>
    where
        T: Default,
    {
        if !self.is_success() {
            tracing::debug!(code = self.code, message = %self.message, "service rejected call");
            return Err(ClientError::Api {
                code: self.code,
                message: self.message,
            });
        }
        Ok(self.data.unwrap_or_default())
    }

    /// Like `into_result`, but a successful envelope must carry `data`.
    ///
    /// Used where an absent payload cannot mean "nothing", such as a login
    /// that must return a token.
    pub fn into_required(self) -> Result<T, ClientError> {
        if !self.is_success() {
            tracing::debug!(code = self.code, message = %self.message, "service rejected call");
            return Err(ClientError::Api {
                code: self.code,
                message: self.message,
            });
        }
        match self.data {
            Some(data) => Ok(data),
            None => {
                tracing::warn!(message = %self.message, "success envelope without data");
                Err(ClientError::Decode {
                    source: <serde_json::Error as serde::de::Error>::missing_field("data"),
                    raw_body: serde_json::json!({ "code": self.code, "message": self.message }).to_string(),
                })
            }
        }
    }
}

/// Payload type for calls whose `data` carries nothing the caller needs.
///
/// Deserializes from any JSON value, so a success envelope with an
/// unexpected `data` shape is still a success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

impl<'de> Deserialize<'de> for Empty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Empty)
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// Decode a response body into an `Envelope<T>`, whatever its HTTP status.
pub fn decode_envelope<T>(response: &HttpResponse) -> Result<Envelope<T>, ClientError>
where
    T: DeserializeOwned,
{
    let decode_error = |source: serde_json::Error| {
        tracing::warn!(status = response.status, error = %source, "response is not an envelope");
        ClientError::Decode {
            source,
            raw_body: response.text().into_owned(),
        }
    };

    let raw: RawEnvelope = serde_json::from_slice(&response.body).map_err(decode_error)?;

    let data = match raw.data {
        Value::Null => None,
        value if raw.code == SUCCESS_CODE => Some(serde_json::from_value(value).map_err(decode_error)?),
        value => serde_json::from_value(value).ok(),
    };

    Ok(Envelope {
        code: raw.code,
        message: raw.message,
        data,
    })
}
