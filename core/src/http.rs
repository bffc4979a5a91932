//! HTTP data types shared by the dispatcher, the transport, and callbacks.
//!
//! # Design
//! `Request` is the descriptor of one dispatched call. It is assembled fresh
//! from the client configuration on every dispatch, handed mutably to the
//! interceptor chain, and finally frozen inside the returned `Response` for
//! diagnostics such as curl reconstruction.
//!
//! `RawResponse` is what the transport hands back: status, headers and a
//! live body stream. `Reply` is the fully read form of it that travels back
//! out through the interceptor chain.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use http::HeaderMap;
use url::Url;

use crate::form::{FormSummary, Multipart};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET and DELETE carry the accumulated query parameters.
    pub fn sends_query(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }

    /// POST, PUT and PATCH default their Content-Type to JSON.
    pub fn has_payload(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn to_http(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query-parameter multimap with keys kept in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value stored under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), vec![value.into()]);
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterate over every key/value pair, keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
    }

    /// `application/x-www-form-urlencoded` rendering, sorted by key.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(self.iter());
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

/// Serialized request body, selected at dispatch time from the configured
/// inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Vec<u8>),
    Multipart(Multipart),
}

impl RequestBody {
    /// Bytes to put on the wire, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(bytes) => Some(bytes),
            RequestBody::Multipart(multipart) => Some(multipart.bytes()),
        }
    }
}

/// Snapshot of one dispatched request.
///
/// `url` holds base URL plus path; the query parameters that were actually
/// attached live in `query` and are joined by [`Request::resolved_url`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub query: QueryParams,
    pub body: RequestBody,
    pub form: FormSummary,
    pub insecure: bool,
}

impl Request {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            query: QueryParams::new(),
            body: RequestBody::Empty,
            form: FormSummary::default(),
            insecure: false,
        }
    }

    /// URL with the attached query parameters appended.
    pub fn resolved_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.to_string();
        }
        let mut url = self.url.clone();
        url.query_pairs_mut().extend_pairs(self.query.iter());
        url.to_string()
    }

    /// Render this request as a runnable `curl` command.
    pub fn curl(&self) -> String {
        crate::curl::render(self)
    }
}

/// Response as returned by the transport, body still unread.
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Box<dyn Read>,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Read + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Fully read response travelling back out through the interceptor chain.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    /// Synthetic reply, used by interceptors that answer without calling
    /// the inner handler.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_set_replaces_previous_values() {
        let mut query = QueryParams::new();
        query.add("key", "a");
        query.add("key", "b");
        query.set("key", "c");
        assert_eq!(query.get_all("key"), ["c".to_string()]);
    }

    #[test]
    fn query_encodes_sorted_and_escaped() {
        let query: QueryParams = [("b", "two words"), ("a", "x&y")].into_iter().collect();
        assert_eq!(query.encode(), "a=x%26y&b=two+words");
    }

    #[test]
    fn resolved_url_appends_query() {
        let mut req = Request::new(HttpMethod::Get, Url::parse("http://localhost:3000/items").unwrap());
        assert_eq!(req.resolved_url(), "http://localhost:3000/items");

        req.query.set("page", "2");
        assert_eq!(req.resolved_url(), "http://localhost:3000/items?page=2");
    }

    #[test]
    fn resolved_url_extends_existing_query() {
        let mut req = Request::new(
            HttpMethod::Delete,
            Url::parse("http://localhost:3000/items?force=true").unwrap(),
        );
        req.query.set("id", "7");
        assert_eq!(req.resolved_url(), "http://localhost:3000/items?force=true&id=7");
    }

    #[test]
    fn resolved_url_keeps_query_before_fragment() {
        let mut req = Request::new(HttpMethod::Get, Url::parse("http://api.local/items#top").unwrap());
        req.query.set("key", "value");

        let resolved = Url::parse(&req.resolved_url()).unwrap();
        assert_eq!(resolved.as_str(), "http://api.local/items?key=value#top");
        assert_eq!(resolved.query(), Some("key=value"));
        assert_eq!(resolved.fragment(), Some("top"));
    }

    #[test]
    fn method_classification() {
        assert!(HttpMethod::Get.sends_query());
        assert!(HttpMethod::Delete.sends_query());
        assert!(!HttpMethod::Post.sends_query());
        assert!(HttpMethod::Patch.has_payload());
        assert!(!HttpMethod::Delete.has_payload());
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }
}
