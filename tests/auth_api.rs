//! Authentication API integration tests
//!
//! Signup, login (by username or email), session history and `/api/auth/me`.

mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::TestApp;

const FIREFOX_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) Gecko/20100101 Firefox/131.0";

fn signup_body(username: &str, email: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": email,
        "password": "longboard99",
        "instagramHandle": "@kelly.surfs",
    })
}

#[tokio::test]
async fn test_signup_returns_token_and_user() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/auth/signup", signup_body("kelly", "kelly@surf.test"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "kelly");
    assert_eq!(body["user"]["instagramHandle"], "kelly.surfs");
    assert_eq!(body["user"]["messageCount"], 0);
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_signup_conflicts_and_validation() {
    let app = TestApp::new();
    app.post("/api/auth/signup", signup_body("kelly", "kelly@surf.test"))
        .await;

    let (status, _) = app
        .post("/api/auth/signup", signup_body("kelly", "other@surf.test"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post("/api/auth/signup", signup_body("laird", "kelly@surf.test"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post("/api/auth/signup", signup_body("9lives", "nine@surf.test"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_records_session_and_me() {
    let app = TestApp::new();
    app.post("/api/auth/signup", signup_body("kelly", "kelly@surf.test"))
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "username": "kelly@surf.test", "password": "longboard99" })),
            &[("user-agent", FIREFOX_UA)],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let sessions = body["user"]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["browser"], "Firefox");
    assert_eq!(sessions[0]["os"], "Windows");
    assert!(!body["user"]["lastLoginAt"].is_null());

    let token = body["token"].as_str().unwrap().to_string();
    let bearer = format!("Bearer {}", token);
    let (status, body) = app
        .send(Method::GET, "/api/auth/me", None, &[("authorization", &bearer)])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "kelly@surf.test");
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = TestApp::new();
    app.post("/api/auth/signup", signup_body("kelly", "kelly@surf.test"))
        .await;

    let (status, wrong_password) = app
        .post(
            "/api/auth/login",
            json!({ "username": "kelly", "password": "shortboard" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = app
        .post(
            "/api/auth/login",
            json!({ "username": "nobody", "password": "shortboard" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["error"], unknown_user["error"]);
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::GET,
            "/api/auth/me",
            None,
            &[("authorization", "Bearer not.a.token")],
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
