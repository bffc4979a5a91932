//! Verify curl rendering against JSON test vectors stored in `test-vectors/`.
//!
//! Each case describes a request descriptor field by field and the exact
//! command line it must render to.

use vortex_core::{HttpMethod, Request, RequestBody};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn string_map(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .map(|pairs| {
            pairs
                .iter()
                .map(|pair| {
                    let pair = pair.as_array().unwrap();
                    (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

fn build_request(case: &serde_json::Value) -> Request {
    let method = parse_method(case["method"].as_str().unwrap());
    let url = url::Url::parse(case["url"].as_str().unwrap()).unwrap();
    let mut req = Request::new(method, url);

    for (name, value) in string_map(&case["headers"]) {
        req.headers.append(
            http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            http::HeaderValue::from_str(&value).unwrap(),
        );
    }
    for (key, value) in string_map(&case["query"]) {
        req.query.add(key, value);
    }
    if let Some(body) = case["body"].as_str() {
        req.body = RequestBody::Json(body.as_bytes().to_vec());
    }
    for (field, path) in string_map(&case["form_paths"]) {
        req.form.paths.insert(field, path);
    }
    for (field, value) in string_map(&case["form_fields"]) {
        req.form.fields.insert(field, value);
    }
    if let Some(files) = case["form_files"].as_array() {
        for file in files {
            let file = file.as_array().unwrap();
            req.form.files.insert(
                file[0].as_str().unwrap().to_string(),
                file[1].as_str().map(str::to_string),
            );
        }
    }
    req.insecure = case["insecure"].as_bool().unwrap_or(false);
    req
}

#[test]
fn curl_test_vectors() {
    let raw = include_str!("../../test-vectors/curl.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let req = build_request(&case["request"]);
        assert_eq!(req.curl(), case["expected"].as_str().unwrap(), "{name}");
    }
}
