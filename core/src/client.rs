//! Fluent client: configuration builder plus dispatcher.
//!
//! # Design
//! `Client` accumulates headers, query parameters, form inputs, an output
//! target, interceptors, hooks and a stream consumer through chained
//! `&mut self` setters. Each dispatch (`get`, `post`, ...) snapshots that
//! state into a fresh `Request`, runs it through the interceptor chain and
//! returns a `Response` carrying the snapshot.
//!
//! Configuration is not reset between dispatches; form paths and fields are
//! resent until the caller changes them. Open form files are the exception,
//! being consumed by the dispatch that encodes them.
//!
//! The innermost handler performs, in order: the transport call, every hook,
//! the stream consumer, reading the rest of the body, and decoding it into
//! the output target.

use std::fmt::Display;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::Options;
use crate::error::{BoxError, ClientError};
use crate::form::{FormFile, FormInputs, FormSummary};
use crate::http::{HttpMethod, QueryParams, RawResponse, Reply, Request, RequestBody};
use crate::interceptor::{compose, Handler, Interceptor};
use crate::output::{DecodeTarget, Output};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

/// Observer run after the network call, before the body is read.
pub type HookFn = dyn Fn(&Request, &RawResponse) -> Result<(), BoxError> + Send + Sync;

/// Consumer handed the live response before the dispatcher reads the body.
pub type StreamFn = dyn FnMut(&mut RawResponse) -> Result<(), BoxError> + Send;

/// Fluent HTTP client. Not meant to be shared across threads while being
/// reconfigured; every dispatch takes `&mut self`.
pub struct Client {
    transport: Box<dyn Transport>,
    base_url: String,
    timeout: Option<Duration>,
    retries: u32,
    headers: HeaderMap,
    query: QueryParams,
    output: Option<Arc<dyn DecodeTarget>>,
    interceptors: Vec<Box<dyn Interceptor>>,
    hooks: Vec<Box<HookFn>>,
    stream: Option<Box<StreamFn>>,
    form: FormInputs,
    insecure: bool,
    invalid_header: Option<ClientError>,
}

impl Client {
    /// Client backed by the default `ureq` transport.
    pub fn new(options: Options) -> Self {
        let transport = UreqTransport::new(options.timeout);
        Self::with_transport(options, transport)
    }

    pub fn with_transport(options: Options, transport: impl Transport + 'static) -> Self {
        if options.retries > 0 {
            debug!(retries = options.retries, "retry count is advisory; failed calls are not retried");
        }
        Self {
            transport: Box::new(transport),
            base_url: options.base_url,
            timeout: options.timeout,
            retries: options.retries,
            headers: HeaderMap::new(),
            query: QueryParams::new(),
            output: None,
            interceptors: Vec::new(),
            hooks: Vec::new(),
            stream: None,
            form: FormInputs::default(),
            insecure: false,
            invalid_header: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// Configured value for `key`, matched case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|value| value.to_str().ok())
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key)
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.base_url = base_url.into();
        self
    }

    /// Skip TLS certificate verification for subsequent dispatches.
    pub fn insecure(&mut self) -> &mut Self {
        self.insecure = true;
        self
    }

    /// Replace any value stored under `key`.
    ///
    /// An invalid name or value is reported by the next dispatch, which
    /// then sends nothing.
    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => return self.reject_header(key, e.to_string()),
        };
        let value = match HeaderValue::from_str(value) {
            Ok(value) => value,
            Err(e) => return self.reject_header(key, e.to_string()),
        };
        self.headers.insert(name, value);
        self
    }

    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in headers {
            self.set_header(key.as_ref(), value.as_ref());
        }
        self
    }

    fn reject_header(&mut self, key: &str, reason: String) -> &mut Self {
        if self.invalid_header.is_none() {
            self.invalid_header = Some(ClientError::InvalidHeader {
                name: key.to_string(),
                reason,
            });
        }
        self
    }

    pub fn set_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query.set(key, value);
        self
    }

    /// Set each pair, formatting values with `Display`.
    pub fn set_query_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Display,
    {
        for (key, value) in params {
            self.query.set(key, value.to_string());
        }
        self
    }

    /// Set one query parameter per top-level field of `params`.
    ///
    /// `params` must serialize to a JSON object. Strings are used as-is,
    /// `null` becomes empty, and nested values are set to their JSON text.
    pub fn set_query_params_from<T: Serialize + ?Sized>(&mut self, params: &T) -> Result<&mut Self, ClientError> {
        let fields = match serde_json::to_value(params).map_err(ClientError::SerializationError)? {
            serde_json::Value::Object(fields) => fields,
            other => return Err(ClientError::QueryShapeError(json_kind(&other))),
        };
        for (key, value) in fields {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            self.query.set(key, value);
        }
        Ok(self)
    }

    /// Decode successful dispatches into `output` until replaced or
    /// cleared.
    pub fn set_output<T>(&mut self, output: &Output<T>) -> &mut Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.output = Some(Arc::new(output.clone()));
        self
    }

    pub fn clear_output(&mut self) -> &mut Self {
        self.output = None;
        self
    }

    pub fn set_form_file_path(&mut self, field: impl Into<String>, path: impl Into<PathBuf>) -> &mut Self {
        self.form.paths.insert(field.into(), path.into());
        self
    }

    pub fn set_form_file(&mut self, field: impl Into<String>, file: FormFile) -> &mut Self {
        self.form.files.insert(field.into(), file);
        self
    }

    pub fn set_form_data<I, K, V>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form
            .fields
            .extend(fields.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Append an interceptor; the first one registered runs outermost.
    pub fn use_interceptor(&mut self, interceptor: impl Interceptor + 'static) -> &mut Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn use_hook<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Request, &RawResponse) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Hand every raw response to `consumer` before the body is read. Bytes
    /// it leaves unread end up in `Response::body`.
    pub fn stream<F>(&mut self, consumer: F) -> &mut Self
    where
        F: FnMut(&mut RawResponse) -> Result<(), BoxError> + Send + 'static,
    {
        self.stream = Some(Box::new(consumer));
        self
    }

    pub fn get(&mut self, path: &str) -> Result<Response, ClientError> {
        self.dispatch::<()>(HttpMethod::Get, path, None)
    }

    pub fn delete(&mut self, path: &str) -> Result<Response, ClientError> {
        self.dispatch::<()>(HttpMethod::Delete, path, None)
    }

    pub fn post<B: Serialize + ?Sized>(&mut self, path: &str, body: &B) -> Result<Response, ClientError> {
        self.dispatch(HttpMethod::Post, path, Some(body))
    }

    pub fn put<B: Serialize + ?Sized>(&mut self, path: &str, body: &B) -> Result<Response, ClientError> {
        self.dispatch(HttpMethod::Put, path, Some(body))
    }

    pub fn patch<B: Serialize + ?Sized>(&mut self, path: &str, body: &B) -> Result<Response, ClientError> {
        self.dispatch(HttpMethod::Patch, path, Some(body))
    }

    /// Dispatch without a JSON body.
    pub fn request(&mut self, method: HttpMethod, path: &str) -> Result<Response, ClientError> {
        self.dispatch::<()>(method, path, None)
    }

    fn dispatch<B: Serialize + ?Sized>(
        &mut self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ClientError> {
        if let Some(err) = self.invalid_header.take() {
            return Err(err);
        }

        let (body, form) = if !self.form.is_empty() {
            if body.is_some() {
                warn!(%method, path, "form inputs present; JSON body ignored");
            }
            let (multipart, summary) = self.form.encode()?;
            (RequestBody::Multipart(multipart), summary)
        } else if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(ClientError::SerializationError)?;
            (RequestBody::Json(bytes), FormSummary::default())
        } else {
            (RequestBody::Empty, FormSummary::default())
        };

        let raw_url = format!("{}{}", self.base_url, path);
        let url = Url::parse(&raw_url).map_err(|source| ClientError::InvalidUrl {
            url: raw_url.clone(),
            source,
        })?;

        let mut request = Request::new(method, url);
        if method.sends_query() {
            request.query = self.query.clone();
        }
        request.headers = self.merged_headers(method, &body)?;
        request.body = body;
        request.form = form;
        request.insecure = self.insecure;

        debug!(%method, url = %request.resolved_url(), "dispatching request");

        let transport = self.transport.as_ref();
        let hooks = &self.hooks;
        let stream = self.stream.as_mut();
        let output = self.output.as_ref();
        let innermost: Handler<'_> = Box::new(move |request: &mut Request| {
            let mut raw = transport.execute(request)?;
            for hook in hooks {
                hook(&*request, &raw).map_err(ClientError::HookError)?;
            }
            if let Some(consumer) = stream {
                let consumer: &mut StreamFn = consumer;
                consumer(&mut raw).map_err(ClientError::StreamError)?;
            }
            let mut body = Vec::new();
            raw.body.read_to_end(&mut body).map_err(ClientError::BodyReadError)?;
            if let Some(target) = output {
                target.decode(&body).map_err(ClientError::DeserializationError)?;
            }
            Ok(Reply {
                status: raw.status,
                headers: raw.headers,
                body,
            })
        });

        let reply = compose(&self.interceptors, innermost)(&mut request)?;
        debug!(status = reply.status, bytes = reply.body.len(), "request completed");

        Ok(Response::new(
            reply.status,
            reply.headers,
            reply.body,
            request,
            self.output.clone(),
        ))
    }

    /// Default Content-Type first, then the configured headers. A multipart
    /// Content-Type replaces any configured one.
    fn merged_headers(&self, method: HttpMethod, body: &RequestBody) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        let multipart = matches!(body, RequestBody::Multipart(_));
        if let RequestBody::Multipart(multipart) = body {
            let value = HeaderValue::from_str(&multipart.content_type()).map_err(|e| ClientError::InvalidHeader {
                name: CONTENT_TYPE.to_string(),
                reason: e.to_string(),
            })?;
            headers.insert(CONTENT_TYPE, value);
        } else if method.has_payload() && !self.headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        for (name, value) in &self.headers {
            if multipart && *name == CONTENT_TYPE {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        Ok(headers)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
