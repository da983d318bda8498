use reqwest::Method;
use serde_json::json;

use crate::helpers::{TEST_PASSWORD, get_json, register_and_login, send_json, spawn_app};

#[tokio::test]
async fn register_returns_user_without_password_hash() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/users/register",
        None,
        Some(json!({ "username": "  reader ", "password": TEST_PASSWORD, "nickname": "书虫" })),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["code"], 200);
    assert_eq!(body["msg"], "注册成功");
    assert_eq!(body["data"]["username"], "reader");
    assert_eq!(body["data"]["nickname"], "书虫");
    assert!(body["data"]["id"].as_i64().is_some());
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_usernames() {
    let app = spawn_app().await;
    register_and_login(&app, "reader").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/users/register",
        None,
        Some(json!({ "username": "reader", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["msg"], "用户名已存在");
}

#[tokio::test]
async fn register_validates_username_and_password() {
    let app = spawn_app().await;

    let cases = [
        (json!({ "username": "", "password": TEST_PASSWORD }), "用户名不能为空"),
        (json!({ "username": "a", "password": TEST_PASSWORD }), "用户名至少2个字符"),
        (json!({ "username": "reader", "password": "" }), "密码不能为空"),
        (json!({ "username": "reader", "password": "12345" }), "密码不能少于6位"),
    ];

    for (payload, message) in cases {
        let (status, body) =
            send_json(&app, Method::POST, "/users/register", None, Some(payload)).await;
        assert_eq!(status, 400);
        assert_eq!(body["msg"], message);
    }
}

#[tokio::test]
async fn profile_requires_a_token() {
    let app = spawn_app().await;

    let (status, body) = get_json(&app, "/users/profile", None).await;

    assert_eq!(status, 401);
    assert_eq!(body["msg"], "未登录或登录已过期");
}

#[tokio::test]
async fn profile_returns_the_token_owner() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;

    let (status, body) =
        get_json(&app, "/users/profile", Some(&login.tokens.access_token)).await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["id"], login.user.id.into_inner());
    assert_eq!(body["data"]["gender"], "保密");
}

#[tokio::test]
async fn public_user_lookup_by_id() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;

    let (status, body) = get_json(&app, &format!("/users/{}", login.user.id), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["username"], "reader");

    let (status, body) = get_json(&app, "/users/9999", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["msg"], "用户不存在");

    let (status, body) = get_json(&app, "/users/abc", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], 400);
}
