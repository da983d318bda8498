use futures::future::join_all;
use reqwest::Method;
use serde_json::json;

use crate::helpers::{
    get_json, register_and_login, seed_book, send_json, spawn_app, spawn_app_on_disk,
};

#[tokio::test]
async fn reading_record_routes_require_authentication() {
    let app = spawn_app().await;

    let (status, _) = get_json(&app, "/reading-records", None).await;
    assert_eq!(status, 401);

    let (status, _) = send_json(&app, Method::DELETE, "/reading-records/clear", None, None).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn first_save_creates_record_and_counts_a_read() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let token = login.tokens.access_token.as_str();
    let (book, chapters) = seed_book(&app, "Novel", None, 3).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/reading-records",
        Some(token),
        Some(json!({ "book_id": book.id, "chapter_id": chapters[0].id, "progress": 40 })),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["book_id"], book.id.into_inner());
    assert_eq!(body["data"]["chapter_id"], chapters[0].id.into_inner());
    assert_eq!(body["data"]["progress"], 40);
    assert_eq!(body["data"]["user_id"], login.user.id.into_inner());

    let (_, body) = get_json(&app, &format!("/books/{}", book.id), None).await;
    assert_eq!(body["data"]["read_count"], 1);
}

#[tokio::test]
async fn later_saves_update_in_place() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let token = login.tokens.access_token.as_str();
    let (book, chapters) = seed_book(&app, "Novel", None, 3).await;

    let (_, first) = send_json(
        &app,
        Method::POST,
        "/reading-records",
        Some(token),
        Some(json!({ "book_id": book.id, "chapter_id": chapters[0].id, "progress": 10 })),
    )
    .await;
    let (_, second) = send_json(
        &app,
        Method::POST,
        "/reading-records",
        Some(token),
        Some(json!({ "book_id": book.id, "chapter_id": chapters[2].id, "progress": 75 })),
    )
    .await;

    assert_eq!(first["data"]["id"], second["data"]["id"]);

    let (status, body) =
        get_json(&app, &format!("/reading-records/book/{}", book.id), Some(token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["chapter_id"], chapters[2].id.into_inner());
    assert_eq!(body["data"]["chapter_title"], "第3章");
    assert_eq!(body["data"]["chapter_order_num"], 3);
    assert_eq!(body["data"]["progress"], 75);

    let (_, body) = get_json(&app, &format!("/books/{}", book.id), None).await;
    assert_eq!(body["data"]["read_count"], 1);
}

#[tokio::test]
async fn save_validates_payload_and_references() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let token = login.tokens.access_token.as_str();
    let (book, chapters) = seed_book(&app, "Novel", None, 1).await;
    let (other, other_chapters) = seed_book(&app, "Other", None, 1).await;

    let cases = [
        (
            json!({ "book_id": book.id, "chapter_id": chapters[0].id, "progress": 101 }),
            400,
            "progress 必须在 0 到 100 之间",
        ),
        (
            json!({ "book_id": 9999, "chapter_id": chapters[0].id, "progress": 0 }),
            404,
            "书籍不存在",
        ),
        (
            json!({ "book_id": book.id, "chapter_id": 9999, "progress": 0 }),
            404,
            "章节不存在",
        ),
        (
            json!({ "book_id": book.id, "chapter_id": other_chapters[0].id, "progress": 0 }),
            400,
            "章节不属于该书籍",
        ),
    ];

    for (payload, status, message) in cases {
        let (actual, body) =
            send_json(&app, Method::POST, "/reading-records", Some(token), Some(payload)).await;
        assert_eq!(actual, status, "{message}");
        assert_eq!(body["msg"], message);
    }

    let (_, body) = get_json(&app, &format!("/books/{}", other.id), None).await;
    assert_eq!(body["data"]["read_count"], 0);
}

#[tokio::test]
async fn save_with_missing_fields_is_a_bad_body() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/reading-records",
        Some(&login.tokens.access_token),
        Some(json!({ "book_id": 1 })),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["msg"], "请求体格式错误");
}

#[tokio::test]
async fn progress_for_unread_book_is_null() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let (book, _) = seed_book(&app, "Unread", None, 1).await;

    let (status, body) = get_json(
        &app,
        &format!("/reading-records/book/{}", book.id),
        Some(&login.tokens.access_token),
    )
    .await;

    assert_eq!(status, 200);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn history_is_most_recent_first_with_book_details() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let token = login.tokens.access_token.as_str();
    let (first, first_chapters) = seed_book(&app, "First", Some("历史"), 1).await;
    let (second, second_chapters) = seed_book(&app, "Second", None, 1).await;

    for (book, chapter) in [(&first, &first_chapters[0]), (&second, &second_chapters[0])] {
        send_json(
            &app,
            Method::POST,
            "/reading-records",
            Some(token),
            Some(json!({ "book_id": book.id, "chapter_id": chapter.id, "progress": 5 })),
        )
        .await;
    }

    let (status, body) = get_json(&app, "/reading-records?page=1&page_size=1", Some(token)).await;

    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["page"], 1);
    assert_eq!(data["page_size"], 1);
    assert_eq!(data["total_pages"], 2);
    let items = data["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["book_title"], "Second");
    assert_eq!(items[0]["chapter_title"], "第1章");
    assert_eq!(items[0]["author"], "Author");

    let (_, body) = get_json(&app, "/reading-records?page=2&page_size=1", Some(token)).await;
    assert_eq!(body["data"]["items"][0]["book_title"], "First");
}

#[tokio::test]
async fn batch_progress_keys_by_book_id() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let token = login.tokens.access_token.as_str();
    let (read, chapters) = seed_book(&app, "Read", None, 2).await;
    let (unread, _) = seed_book(&app, "Unread", None, 1).await;

    send_json(
        &app,
        Method::POST,
        "/reading-records",
        Some(token),
        Some(json!({ "book_id": read.id, "chapter_id": chapters[1].id, "progress": 60 })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/reading-records/batch",
        Some(token),
        Some(json!({ "book_ids": [read.id, unread.id, read.id] })),
    )
    .await;

    assert_eq!(status, 200);
    let map = body["data"].as_object().expect("data object");
    assert_eq!(map.len(), 1);
    let progress = &map[&read.id.to_string()];
    assert_eq!(progress["progress"], 60);
    assert_eq!(progress["chapter_order_num"], 2);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/reading-records/batch",
        Some(token),
        Some(json!({ "book_ids": [] })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn batch_progress_rejects_oversized_requests() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let ids: Vec<i64> = (1..=101).collect();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/reading-records/batch",
        Some(&login.tokens.access_token),
        Some(json!({ "book_ids": ids })),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["msg"], "book_ids 最多100个");
}

#[tokio::test]
async fn deleting_and_clearing_history() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "reader").await;
    let token = login.tokens.access_token.as_str();
    let (a, a_chapters) = seed_book(&app, "A", None, 1).await;
    let (b, b_chapters) = seed_book(&app, "B", None, 1).await;

    for (book, chapter) in [(&a, &a_chapters[0]), (&b, &b_chapters[0])] {
        send_json(
            &app,
            Method::POST,
            "/reading-records",
            Some(token),
            Some(json!({ "book_id": book.id, "chapter_id": chapter.id, "progress": 1 })),
        )
        .await;
    }

    let (status, body) = send_json(
        &app,
        Method::DELETE,
        &format!("/reading-records/book/{}", a.id),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["msg"], "删除成功");

    let (status, body) = send_json(
        &app,
        Method::DELETE,
        &format!("/reading-records/book/{}", a.id),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["msg"], "阅读记录不存在");

    let (status, body) =
        send_json(&app, Method::DELETE, "/reading-records/clear", Some(token), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["msg"], "已清空阅读历史");

    let (_, body) = get_json(&app, "/reading-records", Some(token)).await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["page_size"], 20);

    // Clearing an empty history still succeeds.
    let (status, _) =
        send_json(&app, Method::DELETE, "/reading-records/clear", Some(token), None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn histories_are_per_user() {
    let app = spawn_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;
    let (book, chapters) = seed_book(&app, "Shared", None, 1).await;

    send_json(
        &app,
        Method::POST,
        "/reading-records",
        Some(&alice.tokens.access_token),
        Some(json!({ "book_id": book.id, "chapter_id": chapters[0].id, "progress": 50 })),
    )
    .await;

    let (_, body) = get_json(&app, "/reading-records", Some(&bob.tokens.access_token)).await;
    assert_eq!(body["data"]["total"], 0);

    let (_, body) = get_json(
        &app,
        &format!("/reading-records/book/{}", book.id),
        Some(&bob.tokens.access_token),
    )
    .await;
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn concurrent_saves_for_one_book_all_succeed() {
    let app = spawn_app_on_disk().await;
    let login = register_and_login(&app, "reader").await;
    let token = login.tokens.access_token.as_str();
    let (book, chapters) = seed_book(&app, "Racing", None, 5).await;

    let results = join_all(chapters.iter().enumerate().map(|(n, chapter)| {
        send_json(
            &app,
            Method::POST,
            "/reading-records",
            Some(token),
            Some(json!({ "book_id": book.id, "chapter_id": chapter.id, "progress": n * 10 })),
        )
    }))
    .await;

    for (status, body) in &results {
        assert_eq!(*status, 200, "{body}");
    }
    let first_id = &results[0].1["data"]["id"];
    assert!(results.iter().all(|(_, body)| &body["data"]["id"] == first_id));

    let (_, body) = get_json(&app, &format!("/books/{}", book.id), None).await;
    assert_eq!(body["data"]["read_count"], 1);

    let (status, _) =
        get_json(&app, &format!("/reading-records/book/{}", book.id), Some(token)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn token_of_a_deleted_user_cannot_save_progress() {
    let app = spawn_app().await;
    let login = register_and_login(&app, "ghost").await;
    let (book, chapters) = seed_book(&app, "Haunted", None, 1).await;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(login.user.id.into_inner())
        .execute(&app.pool)
        .await
        .expect("Failed to delete user");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/reading-records",
        Some(&login.tokens.access_token),
        Some(json!({ "book_id": book.id, "chapter_id": chapters[0].id, "progress": 5 })),
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(body["msg"], "未登录或登录已过期");

    let (_, body) = get_json(&app, &format!("/books/{}", book.id), None).await;
    assert_eq!(body["data"]["read_count"], 0);
}
