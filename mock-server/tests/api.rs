use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, UploadedPart};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_method_path_and_query() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/echo/items/7?force=true&reason=two+words")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.path, "/echo/items/7");
    assert_eq!(echo.query["force"], "true");
    assert_eq!(echo.query["reason"], "two words");
}

#[tokio::test]
async fn echo_reflects_headers_and_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header("X-Trace", "a")
                .header("X-Trace", "b")
                .body(r#"{"key":"value"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.headers["x-trace"], "a, b");
    assert_eq!(echo.body, r#"{"key":"value"}"#);
}

// --- upload ---

#[tokio::test]
async fn upload_lists_multipart_parts() {
    let body = "--B\r\n\
                Content-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
                Content-Type: application/octet-stream\r\n\r\n\
                contents\r\n\
                --B\r\n\
                Content-Disposition: form-data; name=\"title\"\r\n\r\n\
                hello\r\n\
                --B--\r\n";
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=B")
                .body(body.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let parts: Vec<UploadedPart> = body_json(resp).await;
    assert_eq!(
        parts,
        vec![
            UploadedPart {
                name: "doc".to_string(),
                file_name: Some("a.txt".to_string()),
                content: "contents".to_string(),
            },
            UploadedPart {
                name: "title".to_string(),
                file_name: None,
                content: "hello".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn upload_without_multipart_content_type_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body("{}".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

// --- status ---

#[tokio::test]
async fn status_answers_with_requested_code() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/418").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], 418);
}

#[tokio::test]
async fn status_rejects_out_of_range_code() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/1000").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app()
        .oneshot(Request::builder().uri("/nowhere").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}
