//! The network collaborator the dispatcher delegates to.
//!
//! # Design
//! `Transport` receives the fully assembled `Request` and returns the raw
//! response with its body still unread, so hooks and stream consumers see
//! the live stream. Connection handling, TLS and timeouts belong entirely to
//! the implementation.
//!
//! `UreqTransport` is the default: two blocking `ureq` agents sharing the
//! same timeout, one of which skips certificate verification for requests
//! flagged `insecure`. Non-2xx statuses are returned as data, never as
//! errors.

use std::time::Duration;

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::error::ClientError;
use crate::http::{RawResponse, Request};

/// Executes a request and returns the response with an unread body.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &Request) -> Result<RawResponse, ClientError>;
}

/// Blocking transport backed by `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    insecure_agent: Agent,
}

impl UreqTransport {
    /// `timeout` bounds each call end to end; `None` means no limit.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        let insecure_agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .tls_config(TlsConfig::builder().disable_verification(true).build())
            .build()
            .new_agent();
        Self { agent, insecure_agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &Request) -> Result<RawResponse, ClientError> {
        let agent = if request.insecure {
            tracing::warn!(url = %request.url, "TLS certificate verification disabled");
            &self.insecure_agent
        } else {
            &self.agent
        };

        let mut builder = http::Request::builder()
            .method(request.method.to_http())
            .uri(request.resolved_url());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.headers.clone());
        }

        let response = match request.body.bytes() {
            Some(bytes) => agent.run(builder.body(bytes.to_vec())?),
            None => agent.run(builder.body(())?),
        }
        .map_err(ClientError::transport)?;

        let (parts, body) = response.into_parts();
        Ok(RawResponse::new(parts.status.as_u16(), parts.headers, body.into_reader()))
    }
}
