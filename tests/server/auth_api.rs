use inkwell::application::state::AppStateConfig;
use inkwell::domain::tokens::TokenPair;
use inkwell::infrastructure::auth::JwtKeys;
use reqwest::Method;
use serde_json::json;

use crate::helpers::{
    TEST_PASSWORD, TEST_SECRET, register_and_login, send_json, spawn_app, spawn_app_with_config,
};

#[tokio::test]
async fn login_returns_bare_token_pair_and_user() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;

    assert!(!login.tokens.access_token.is_empty());
    assert!(!login.tokens.refresh_token.is_empty());
    assert_ne!(login.tokens.access_token, login.tokens.refresh_token);
    assert_eq!(login.user.username, "reader");
    assert_eq!(login.user.nickname, "reader");
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let app = spawn_app().await;
    register_and_login(&app, "reader").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "reader", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(body["code"], 401);
    assert_eq!(body["msg"], "用户名或密码错误");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn login_for_unknown_user_returns_same_401() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "ghost", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(body["msg"], "用户名或密码错误");
}

#[tokio::test]
async fn login_with_short_password_is_a_validation_error() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "reader", "password": "123" })),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["msg"], "密码不能少于6位");
}

#[tokio::test]
async fn refresh_issues_a_new_pair() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;

    let response = app
        .client
        .post(app.api_url("/auth/refresh"))
        .json(&json!({ "refresh_token": login.tokens.refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let pair: TokenPair = response.json().await.expect("Failed to parse tokens");
    assert_ne!(pair.access_token, login.tokens.access_token);

    let (status, body) = send_json(
        &app,
        Method::GET,
        "/users/profile",
        Some(&pair.access_token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["username"], "reader");
}

#[tokio::test]
async fn refresh_rejects_access_tokens_and_garbage() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;

    for token in [login.tokens.access_token.as_str(), "not-a-jwt", ""] {
        let (status, body) = send_json(
            &app,
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": token })),
        )
        .await;
        assert_eq!(status, 401, "token {token:?} should be rejected");
        assert_eq!(body["msg"], "Refresh token 已失效，请重新登录");
    }
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_bearer() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;

    let (status, body) = send_json(
        &app,
        Method::GET,
        "/users/profile",
        Some(&login.tokens.refresh_token),
        None,
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(body["msg"], "未登录或登录已过期");
}

#[tokio::test]
async fn auth_endpoints_are_rate_limited_per_ip() {
    let app = spawn_app_with_config(AppStateConfig {
        jwt_keys: JwtKeys::with_default_ttls(TEST_SECRET),
        auth_rate_limit_per_minute: 2,
    })
    .await;

    for _ in 0..2 {
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "ghost", "password": TEST_PASSWORD })),
        )
        .await;
        assert_eq!(status, 401);
    }

    let response = app
        .client
        .post(app.api_url("/auth/login"))
        .json(&json!({ "username": "ghost", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 429);
    assert!(response.headers().contains_key("retry-after"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 429);
    assert_eq!(body["msg"], "请求过于频繁，请稍后再试");

    // Catalog routes sit outside the limiter.
    let response = app
        .client
        .get(app.api_url("/categories"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn malformed_json_body_returns_envelope_400() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.api_url("/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 400);
    assert_eq!(body["msg"], "请求体格式错误");
}

#[tokio::test]
async fn unknown_route_returns_envelope_404() {
    let app = spawn_app().await;

    let (status, body) = send_json(&app, Method::GET, "/nope", None, None).await;

    assert_eq!(status, 404);
    assert_eq!(body["msg"], "接口不存在");
}
