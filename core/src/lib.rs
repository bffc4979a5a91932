//! Fluent blocking HTTP/REST client.
//!
//! # Overview
//! Chained setters on `Client` accumulate headers, query parameters, form
//! inputs and callbacks; each dispatch snapshots them into a `Request`,
//! runs it through the interceptor chain and a pluggable `Transport`, and
//! returns a `Response` that keeps the request for diagnostics such as
//! `curl` reconstruction.
//!
//! # Design
//! - The network is behind the `Transport` trait. `UreqTransport` is the
//!   default; tests substitute in-memory fakes.
//! - The request body is a tagged `RequestBody`: multipart whenever any form
//!   input is present, otherwise JSON when a body is given, otherwise empty.
//! - Interceptors compose by folding over the registered list, so the first
//!   one registered is outermost.
//! - Decoded output goes into a typed `Output<T>` slot shared with the
//!   caller.
//!
//! ```ignore
//! use vortex_core::{Client, Options, Output};
//!
//! let users: Output<Vec<User>> = Output::new();
//! let mut client = Client::new(Options::new("https://api.example.com"));
//! let response = client
//!     .set_header("Accept", "application/json")
//!     .set_query_param("page", "2")
//!     .set_output(&users)
//!     .get("/users")?;
//! println!("{}", response.curl());
//! ```

pub mod client;
pub mod config;
pub mod curl;
pub mod error;
pub mod form;
pub mod http;
pub mod interceptor;
pub mod output;
pub mod response;
pub mod transport;

pub use client::{Client, HookFn, StreamFn};
pub use config::Options;
pub use error::{BoxError, ClientError};
pub use form::{FormEncoder, FormFile, FormSummary, Multipart};
pub use crate::http::{HttpMethod, QueryParams, RawResponse, Reply, Request, RequestBody};
pub use interceptor::{compose, from_fn, FnInterceptor, Handler, Interceptor};
pub use output::{DecodeTarget, Output};
pub use response::Response;
pub use transport::{Transport, UreqTransport};
