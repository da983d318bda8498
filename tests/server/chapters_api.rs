use crate::helpers::{get_json, seed_book, spawn_app};

#[tokio::test]
async fn chapter_list_is_ordered_and_omits_content() {
    let app = spawn_app().await;
    let (book, _) = seed_book(&app, "Saga", None, 3).await;

    let (status, body) = get_json(&app, &format!("/books/{}/chapters", book.id), None).await;

    assert_eq!(status, 200);
    let items = body["items"].as_array().expect("items array");
    let orders: Vec<i64> = items
        .iter()
        .map(|c| c["order_num"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert!(items[0].get("content").is_none());
    assert_eq!(body["pagination"]["limit"], 50);
    assert_eq!(body["pagination"]["total"], 3);
}

#[tokio::test]
async fn chapter_list_pages() {
    let app = spawn_app().await;
    let (book, _) = seed_book(&app, "Saga", None, 5).await;

    let (_, body) = get_json(
        &app,
        &format!("/books/{}/chapters?page=2&limit=2", book.id),
        None,
    )
    .await;

    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["order_num"], 3);
    assert_eq!(body["pagination"]["pages"], 3);
}

#[tokio::test]
async fn chapter_list_for_missing_book_is_404() {
    let app = spawn_app().await;

    let (status, body) = get_json(&app, "/books/999/chapters", None).await;

    assert_eq!(status, 404);
    assert_eq!(body["msg"], "Book not found");
}

#[tokio::test]
async fn chapter_detail_links_neighbours() {
    let app = spawn_app().await;
    let (book, chapters) = seed_book(&app, "Saga", None, 3).await;

    let (status, body) = get_json(&app, &format!("/chapters/{}", chapters[1].id), None).await;

    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["title"], "第2章");
    assert_eq!(data["content"], "Chapter 2 of Saga");
    assert_eq!(data["book"]["id"], book.id.into_inner());
    assert_eq!(data["book"]["title"], "Saga");
    assert_eq!(data["prev_chapter"]["id"], chapters[0].id.into_inner());
    assert_eq!(data["next_chapter"]["id"], chapters[2].id.into_inner());
}

#[tokio::test]
async fn first_and_last_chapters_have_no_outer_neighbour() {
    let app = spawn_app().await;
    let (_, chapters) = seed_book(&app, "Saga", None, 2).await;

    let (_, first) = get_json(&app, &format!("/chapters/{}", chapters[0].id), None).await;
    assert!(first["data"]["prev_chapter"].is_null());
    assert_eq!(first["data"]["next_chapter"]["title"], "第2章");

    let (_, last) = get_json(&app, &format!("/chapters/{}", chapters[1].id), None).await;
    assert!(last["data"]["next_chapter"].is_null());
}

#[tokio::test]
async fn missing_chapter_is_404() {
    let app = spawn_app().await;

    let (status, body) = get_json(&app, "/chapters/31337", None).await;

    assert_eq!(status, 404);
    assert_eq!(body["msg"], "Chapter not found");
}

#[tokio::test]
async fn chapter_word_count_defaults_to_character_count() {
    let app = spawn_app().await;
    let (_, chapters) = seed_book(&app, "Saga", None, 1).await;

    // "Chapter 1 of Saga" without spaces.
    assert_eq!(chapters[0].word_count, 14);
}
