//! The `{data, includes, meta, errors}` envelope wrapping every v2 payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Top-level shape of a v2 response body.
///
/// All fields are independently optional. `data` and `errors` may both be
/// present: that is a partial success, not a failure, and is never turned
/// into an [`Error`]. Callers that care should check [`has_errors`].
///
/// [`has_errors`]: ResponseEnvelope::has_errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ResponseEnvelope<T> {
    /// Primary payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Objects referenced by `expansions`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Value>,
    /// Pagination and result metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    /// Per-item problems reported alongside (or instead of) `data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
}

impl<T> Default for ResponseEnvelope<T> {
    fn default() -> Self {
        Self {
            data: None,
            includes: None,
            meta: None,
            errors: None,
        }
    }
}

impl<T> ResponseEnvelope<T> {
    /// Take the payload, discarding the rest of the envelope.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Token for the next page, if the server reported one.
    pub fn next_token(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.next_token.as_deref())
    }

    /// Returns `true` if the envelope lists any errors.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Returns `true` if the envelope has both a payload and errors.
    pub fn is_partial(&self) -> bool {
        self.data.is_some() && self.has_errors()
    }
}

/// Result metadata. Unknown keys are kept in [`Meta::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Number of items in this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,
    /// Opaque token for the following page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    /// Opaque token for the preceding page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_token: Option<String>,
    /// Newest id in this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest_id: Option<String>,
    /// Oldest id in this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_id: Option<String>,
    /// Any other metadata keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of an envelope's `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Short problem summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Problem description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Problem type URI
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Kind of resource the problem concerns (`tweet`, `user`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Request parameter the problem concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Offending parameter value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Legacy free-form message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Any other keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode a response body according to its status.
///
/// A 2xx body must be a JSON envelope, otherwise the result is
/// [`Error::Parse`]. A non-2xx status always yields an error carrying the
/// status and body, whatever the body contains.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &[u8],
    rate_limit: Option<crate::RateLimit>,
) -> Result<ResponseEnvelope<T>> {
    if !status.is_success() {
        return Err(Error::from_api_response(status.as_u16(), body, rate_limit));
    }
    // 204 and friends carry no envelope at all.
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResponseEnvelope::default());
    }
    serde_json::from_slice(body).map_err(|e| Error::parse(e, body))
}
