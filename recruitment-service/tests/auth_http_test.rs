mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn login_rejects_malformed_payload() {
    let app = common::test_router().await;

    let response = app
        .oneshot(
            Request::post("/api/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email": "not-an-email"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejects_invalid_email() {
    let app = common::test_router().await;

    let response = app
        .oneshot(
            Request::post("/api/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email": "not-an-email", "password": "secret"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn me_without_cookie_is_unauthorized() {
    let app = common::test_router().await;

    let response = app
        .oneshot(Request::get("/api/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn me_with_garbage_cookie_is_unauthorized() {
    let app = common::test_router().await;

    let response = app
        .oneshot(
            Request::get("/api/me")
                .header(header::COOKIE, "token=not.a.real.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let app = common::test_router().await;

    let response = app
        .oneshot(Request::post("/api/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("Max-Age=0"));

    let body = body_json(response).await;
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn contact_rejects_missing_fields() {
    let app = common::test_router().await;

    let response = app
        .oneshot(
            Request::post("/api/contact")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "Visitor"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contact_accepts_a_valid_message() {
    let app = common::test_router().await;

    let response = app
        .oneshot(
            Request::post("/api/contact")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{
                        "name": "Visitor",
                        "email": "visitor@example.com",
                        "subject": "Opening hours",
                        "message": "When is the office open?"
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Message sent successfully");
}

#[tokio::test]
async fn create_role_rejects_empty_name() {
    let app = common::test_router().await;

    let response = app
        .oneshot(
            Request::post("/api/roles")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"role_name": ""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn security_headers_are_applied() {
    let app = common::test_router().await;

    let response = app
        .oneshot(Request::post("/api/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .map(|v| v.to_str().unwrap()),
        Some("nosniff")
    );
}
