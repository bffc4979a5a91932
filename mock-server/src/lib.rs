//! Echo server used to observe what the client actually puts on the wire.
//!
//! # Design
//! Every route reflects the request back as JSON so tests can assert on the
//! method, decoded query string, headers, raw body and multipart parts the
//! server received, without the server holding any state.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, Query},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/echo` saw.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    /// Lower-cased header names; repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// One part of a multipart body received by `/upload`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/upload", post(upload))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: flat,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn upload(mut multipart: Multipart) -> Result<Json<Vec<UploadedPart>>, (StatusCode, String)> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content = field.bytes().await.map_err(bad_multipart)?;
        parts.push(UploadedPart {
            name,
            file_name,
            content: String::from_utf8_lossy(&content).into_owned(),
        });
    }
    Ok(Json(parts))
}

fn bad_multipart(err: MultipartError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(serde_json::json!({ "status": code }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/echo".to_string(),
            query: BTreeMap::from([("key".to_string(), "value".to_string())]),
            headers: BTreeMap::new(),
            body: String::new(),
        };
        let json = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echo);
    }

    #[test]
    fn uploaded_part_without_file_name_serializes_null() {
        let part = UploadedPart {
            name: "field".to_string(),
            file_name: None,
            content: "value".to_string(),
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["file_name"], serde_json::Value::Null);
        assert_eq!(json["content"], "value");
    }
}
