use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, CSRF_FAILURE_BODY, LARGE_DATA_LEN, LATIN1_BODY};
use tower::ServiceExt;

const TOKEN: &str = "test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_body_and_headers() {
    let mut req = json_request("POST", "/echo", r#"{"name":"Car","value":3}"#);
    req.headers_mut().insert("x-csrftoken", TOKEN.parse().unwrap());

    let resp = app(TOKEN).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.csrf_token.as_deref(), Some(TOKEN));
    assert_eq!(echo.content_type.as_deref(), Some("application/json"));
    assert_eq!(echo.body["name"], "Car");
    assert_eq!(echo.body["value"], 3);
}

#[tokio::test]
async fn echo_empty_body_is_null() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/echo").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert!(echo.csrf_token.is_none());
    assert!(echo.body.is_null());
}

#[tokio::test]
async fn echo_rejects_invalid_json() {
    let resp = app(TOKEN)
        .oneshot(json_request("PUT", "/echo", "{oops"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- status ---

#[tokio::test]
async fn status_returns_requested_code_as_text() {
    let resp = app(TOKEN)
        .oneshot(json_request("POST", "/status/404", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"status 404");
}

#[tokio::test]
async fn status_out_of_range_is_400() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/status/42").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- malformed ---

#[tokio::test]
async fn malformed_is_200_with_non_json_body() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/malformed").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"not-json");
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

// --- large ---

#[tokio::test]
async fn large_is_valid_json_past_ten_megabytes() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/large").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["data"].as_str().unwrap().len(), LARGE_DATA_LEN);
}

// --- latin1 ---

#[tokio::test]
async fn latin1_body_is_not_utf8() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/latin1/404").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], LATIN1_BODY);
    assert!(std::str::from_utf8(&body).is_err());
}

// --- protected ---

#[tokio::test]
async fn protected_accepts_matching_token() {
    let mut req = json_request("POST", "/protected", "{}");
    req.headers_mut().insert("x-csrftoken", TOKEN.parse().unwrap());

    let resp = app(TOKEN).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn protected_rejects_missing_token() {
    let resp = app(TOKEN)
        .oneshot(json_request("POST", "/protected", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(&body_bytes(resp).await[..], CSRF_FAILURE_BODY.as_bytes());
}

#[tokio::test]
async fn protected_rejects_wrong_token() {
    let mut req = json_request("POST", "/protected", "{}");
    req.headers_mut().insert("x-csrftoken", "forged".parse().unwrap());

    let resp = app(TOKEN).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
