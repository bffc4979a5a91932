//! Completed dispatch as seen by the caller.
//!
//! # Design
//! A `Response` owns the fully read body and the request that produced it,
//! so the same value answers both "what came back" (`text`, `json`,
//! `output`) and "what was sent" (`request`, `curl`).

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::http::Request;
use crate::output::{DecodeTarget, Output};

/// Result of a dispatch: status, raw body, and the request that produced it.
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub request: Request,
    output: Option<Arc<dyn DecodeTarget>>,
}

impl Response {
    pub(crate) fn new(
        status: u16,
        headers: HeaderMap,
        body: Vec<u8>,
        request: Request,
        output: Option<Arc<dyn DecodeTarget>>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            request,
            output,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the raw body, independently of any registered output.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(ClientError::DeserializationError)
    }

    /// The output target that was registered for this dispatch, if it holds
    /// a `T`.
    pub fn output<T: 'static>(&self) -> Option<Output<T>> {
        self.output
            .as_ref()?
            .as_any()
            .downcast_ref::<Output<T>>()
            .cloned()
    }

    pub fn curl(&self) -> String {
        self.request.curl()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("request", &self.request)
            .field("has_output", &self.output.is_some())
            .finish()
    }
}
