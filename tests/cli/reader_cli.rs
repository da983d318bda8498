use crate::helpers::{run_inkwell, seed_book, spawn_server, stdout_json};

const PASSWORD: &str = "secret123";

#[tokio::test(flavor = "multi_thread")]
async fn category_list_prints_names() {
    let server = spawn_server().await;

    let output = run_inkwell(&["category", "list", "--api-url", &server.address], &[]).await;

    let names = stdout_json(&output);
    assert_eq!(names[0], "全部");
    assert_eq!(names.as_array().map(Vec::len), Some(11));
}

#[tokio::test(flavor = "multi_thread")]
async fn book_list_and_search_work_without_login() {
    let server = spawn_server().await;
    let (book, _) = seed_book(&server, "Orbit", &[("One", "text")]).await;

    let output = run_inkwell(&["book", "list", "--api-url", &server.address], &[]).await;
    let listing = stdout_json(&output);
    assert_eq!(listing["items"][0]["id"], book.id.into_inner());
    assert_eq!(listing["pagination"]["total"], 1);

    let output = run_inkwell(
        &["book", "search", "orbit", "--api-url", &server.address],
        &[],
    )
    .await;
    let found = stdout_json(&output);
    assert_eq!(found[0]["title"], "Orbit");
}

#[tokio::test(flavor = "multi_thread")]
async fn chapter_read_prints_plain_text() {
    let server = spawn_server().await;
    let (_, chapters) = seed_book(
        &server,
        "Orbit",
        &[("Launch", "Countdown begins."), ("Landing", "Touchdown.")],
    )
    .await;
    let id = chapters[0].id.to_string();

    let output = run_inkwell(
        &["chapter", "read", &id, "--api-url", &server.address],
        &[],
    )
    .await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Orbit · Launch"));
    assert!(stdout.contains("Countdown begins."));
    assert!(stdout.contains("Next: Landing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn profile_without_login_fails() {
    let server = spawn_server().await;

    let output = run_inkwell(&["profile", "--api-url", &server.address], &[]).await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("未登录或登录已过期"));
}

#[tokio::test(flavor = "multi_thread")]
async fn register_login_and_manage_shelf() {
    let server = spawn_server().await;
    let (book, chapters) = seed_book(&server, "Orbit", &[("One", "text")]).await;
    let book_id = book.id.to_string();

    let output = run_inkwell(
        &[
            "register",
            "--username",
            "cli-reader",
            "--api-url",
            &server.address,
        ],
        &[("INKWELL_PASSWORD", PASSWORD)],
    )
    .await;
    let user = stdout_json(&output);
    assert_eq!(user["username"], "cli-reader");

    let output = run_inkwell(
        &["login", "--username", "cli-reader", "--api-url", &server.address],
        &[("INKWELL_PASSWORD", PASSWORD)],
    )
    .await;
    let login = stdout_json(&output);
    let access = login["access_token"].as_str().expect("access token").to_string();
    let session = [("INKWELL_ACCESS_TOKEN", access.as_str())];

    let output = run_inkwell(
        &["shelf", "toggle", &book_id, "--api-url", &server.address],
        &session,
    )
    .await;
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "on shelf");

    let output = run_inkwell(
        &["shelf", "check", &book_id, "--api-url", &server.address],
        &session,
    )
    .await;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");

    let chapter_id = chapters[0].id.to_string();
    let output = run_inkwell(
        &[
            "history",
            "save",
            "--book-id",
            &book_id,
            "--chapter-id",
            &chapter_id,
            "--progress",
            "55",
            "--api-url",
            &server.address,
        ],
        &session,
    )
    .await;
    let record = stdout_json(&output);
    assert_eq!(record["progress"], 55);

    let output = run_inkwell(
        &["history", "list", "--api-url", &server.address],
        &session,
    )
    .await;
    let history = stdout_json(&output);
    assert_eq!(history["total"], 1);
    assert_eq!(history["items"][0]["book_title"], "Orbit");
}
