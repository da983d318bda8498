use crate::helpers::{get_json, seed_book, spawn_app};

#[tokio::test]
async fn listing_books_is_paginated_newest_first() {
    let app = spawn_app().await;
    for n in 1..=3 {
        seed_book(&app, &format!("Book {n}"), Some("玄幻"), 0).await;
    }

    let (status, body) = get_json(&app, "/books?page=1&limit=2", None).await;

    assert_eq!(status, 200);
    assert_eq!(body["code"], 200);
    assert_eq!(body["msg"], "success");
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "Book 3");
    assert_eq!(items[1]["title"], "Book 2");
    assert_eq!(body["pagination"]["current"], 1);
    assert_eq!(body["pagination"]["limit"], 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);

    let (_, body) = get_json(&app, "/books?page=2&limit=2", None).await;
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Book 1");
}

#[tokio::test]
async fn listing_books_defaults_and_blank_params() {
    let app = spawn_app().await;
    seed_book(&app, "Only", None, 0).await;

    let (status, body) = get_json(&app, "/books?page=&limit=", None).await;

    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["current"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["items"][0]["category"], "");
}

#[tokio::test]
async fn listing_books_caps_limit() {
    let app = spawn_app().await;

    let (status, body) = get_json(&app, "/books?limit=1000", None).await;

    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["pages"], 0);
}

#[tokio::test]
async fn listing_books_filters_by_category() {
    let app = spawn_app().await;
    seed_book(&app, "Sword", Some("武侠"), 0).await;
    seed_book(&app, "Rocket", Some("科幻"), 0).await;

    let (_, body) = get_json(&app, "/books?category=%E6%AD%A6%E4%BE%A0", None).await;
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Sword");
    assert_eq!(items[0]["category"], "武侠");

    // "全部" means no filter.
    let (_, body) = get_json(&app, "/books?category=%E5%85%A8%E9%83%A8", None).await;
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn listing_books_with_non_numeric_page_is_400() {
    let app = spawn_app().await;

    let (status, body) = get_json(&app, "/books?page=abc", None).await;

    assert_eq!(status, 400);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn book_detail_includes_tags_and_counts() {
    let app = spawn_app().await;
    let (book, _) = seed_book(&app, "Detail", Some("都市"), 3).await;

    let (status, body) = get_json(&app, &format!("/books/{}", book.id), None).await;

    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["id"], book.id.into_inner());
    assert_eq!(data["title"], "Detail");
    assert_eq!(data["category"], "都市");
    assert_eq!(data["tags"][0], "测试");
    assert_eq!(data["chapter_count"], 3);
    assert_eq!(data["status"], "连载中");
    assert!(data["author_user"].is_null());
}

#[tokio::test]
async fn missing_book_returns_404() {
    let app = spawn_app().await;

    let (status, body) = get_json(&app, "/books/424242", None).await;

    assert_eq!(status, 404);
    assert_eq!(body["code"], 404);
    assert_eq!(body["msg"], "Book not found");
}

#[tokio::test]
async fn search_matches_title_author_and_description_case_insensitively() {
    let app = spawn_app().await;
    seed_book(&app, "The Dragon King", None, 0).await;
    seed_book(&app, "Quiet Garden", None, 0).await;

    let (status, body) = get_json(&app, "/books/search?keyword=dragon", None).await;
    assert_eq!(status, 200);
    let items = body["data"].as_array().expect("data array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "The Dragon King");

    // Every seeded book is written by "Author".
    let (_, body) = get_json(&app, "/books/search?keyword=AUTHOR", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn search_matches_non_ascii_keywords_verbatim() {
    let app = spawn_app().await;
    seed_book(&app, "Élan Vital", None, 0).await;
    seed_book(&app, "斗破苍穹", None, 0).await;

    // "Élan"
    let (_, body) = get_json(&app, "/books/search?keyword=%C3%89lan", None).await;
    let items = body["data"].as_array().expect("data array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Élan Vital");

    let (_, body) = get_json(&app, "/books/search?keyword=VITAL", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    // "苍穹"
    let (_, body) = get_json(&app, "/books/search?keyword=%E8%8B%8D%E7%A9%B9", None).await;
    let items = body["data"].as_array().expect("data array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "斗破苍穹");
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let app = spawn_app().await;
    seed_book(&app, "Plain", None, 0).await;

    let (_, body) = get_json(&app, "/books/search?keyword=%25", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (_, body) = get_json(&app, "/books/search?keyword=_", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn blank_search_returns_empty_list() {
    let app = spawn_app().await;
    seed_book(&app, "Anything", None, 0).await;

    for path in ["/books/search", "/books/search?keyword=", "/books/search?keyword=%20%20"] {
        let (status, body) = get_json(&app, path, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(0), "{path}");
    }
}
