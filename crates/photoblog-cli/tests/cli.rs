//! CLI integration tests against a mock blog API.
//!
//! Each test starts a wiremock server, points the binary at it through the
//! environment and checks what it prints.

mod common;

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{API_KEY, BLOG_PATH, api_url, listing, run, run_failure, run_success};

async fn mount_page(server: &MockServer, offset: Option<u32>, body: Value) {
    let posts = format!("{}/posts", BLOG_PATH);
    let mock = Mock::given(method("GET"))
        .and(path(posts))
        .and(query_param("api_key", API_KEY))
        .and(query_param_is_missing("id"));
    let mock = match offset {
        Some(offset) => mock.and(query_param("offset", offset.to_string())),
        None => mock.and(query_param_is_missing("offset")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_feed_prints_first_page() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing(0..20, 45)).await;
    let home = TempDir::new().unwrap();

    let stdout = run_success(&["feed"], home.path(), &api_url(&server)).await;

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 20);
    assert!(lines[0].contains("https://media.example/0_640.jpg"));
    assert!(lines[0].contains("#sky"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_feed_loads_requested_pages_as_json() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing(0..20, 45)).await;
    mount_page(&server, Some(20), listing(20..40, 45)).await;
    mount_page(&server, Some(40), listing(40..45, 45)).await;
    let home = TempDir::new().unwrap();

    let output = run(
        &["feed", "--pages", "5", "--json", "--width", "800"],
        home.path(),
        &api_url(&server),
    )
    .await;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let units: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(units.len(), 45);
    assert_eq!(units[44]["post_id"], "44");
    assert_eq!(units[44]["index"], 44);
    // 800 wide: two columns of 400, so the 640 variant.
    assert_eq!(units[0]["image"]["width"], 640);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("45 posts, all loaded."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_feed_reports_empty_tag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/posts", BLOG_PATH)))
        .and(query_param("tag", "nothing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(0..0, 0)))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = run(&["feed", "--tag", "nothing"], home.path(), &api_url(&server)).await;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No posts found."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_shows_neighbours_from_cache() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing(0..3, 3)).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/posts", BLOG_PATH)))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let stdout = run_success(&["post", "1", "--json"], home.path(), &api_url(&server)).await;

    let view: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(view["id"], "1");
    assert_eq!(view["title"], "SUNSET 1");
    assert_eq!(view["date"], "March 4, 2021");
    assert_eq!(view["prev"], "0");
    assert_eq!(view["next"], "2");
    assert_eq!(view["image"], "https://media.example/1_1280.jpg");
    assert_eq!(view["notes"], 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_prints_fields() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing(0..3, 3)).await;
    let home = TempDir::new().unwrap();

    let stdout = run_success(&["post", "2"], home.path(), &api_url(&server)).await;

    assert!(stdout.contains("SUNSET 2"));
    let notes = stdout
        .lines()
        .find(|line| line.contains("Notes:"))
        .unwrap();
    assert!(notes.trim_end().ends_with("14"));
    let previous = stdout
        .lines()
        .find(|line| line.contains("Previous:"))
        .unwrap();
    assert!(previous.trim_end().ends_with('1'));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_not_found_fails() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing(0..3, 3)).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/posts", BLOG_PATH)))
        .and(query_param("id", "999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "meta": { "status": 404, "msg": "Not Found" },
            "response": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let stderr = run_failure(&["post", "999"], home.path(), &api_url(&server)).await;
    assert!(stderr.contains("Post 999 not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_crosses_page_boundary() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing(0..20, 25)).await;
    mount_page(&server, Some(20), listing(20..25, 25)).await;
    let home = TempDir::new().unwrap();
    let config = home.path().join("walk.json");
    std::fs::write(&config, r#"{ "navigation_debounce_ms": 0 }"#).unwrap();

    let stdout = run_success(
        &["--config", config.to_str().unwrap(), "walk", "18", "--steps", "4"],
        home.path(),
        &api_url(&server),
    )
    .await;

    let ids: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();
    assert_eq!(ids, vec!["18", "19", "20", "21", "22"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_stops_at_first_post() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing(0..5, 5)).await;
    let home = TempDir::new().unwrap();
    let config = home.path().join("walk.json");
    std::fs::write(&config, r#"{ "navigation_debounce_ms": 0 }"#).unwrap();

    let output = run(
        &["--config", config.to_str().unwrap(), "walk", "1", "--prev", "--steps", "3"],
        home.path(),
        &api_url(&server),
    )
    .await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("No more posts"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_info_prints_blog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/info", BLOG_PATH)))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "status": 200, "msg": "OK" },
            "response": { "blog": {
                "name": "example",
                "title": "Example Photos",
                "description": "Pictures of things",
                "url": "https://example.tumblr.com/",
                "total_posts": 45,
                "updated": 1_614_859_200
            }}
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let stdout = run_success(&["info"], home.path(), &api_url(&server)).await;
    assert!(stdout.contains("Example Photos"));
    assert!(stdout.contains("45"));
    assert!(stdout.contains("March 4, 2021"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/posts", BLOG_PATH)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "meta": { "status": 401, "msg": "Unauthorized" },
            "response": []
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let stderr = run_failure(&["feed"], home.path(), &api_url(&server)).await;
    assert!(stderr.contains("Unauthorized"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_config_is_rejected() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.json");
    std::fs::write(&config, r#"{ "page_size": 0 }"#).unwrap();

    let stderr = run_failure(
        &["--config", config.to_str().unwrap(), "feed"],
        home.path(),
        &api_url(&server),
    )
    .await;
    assert!(stderr.contains("Invalid config file"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_url_must_be_https_or_local() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    let stderr = run_failure(
        &["--api-url", "http://blog.example/v2", "feed"],
        home.path(),
        &api_url(&server),
    )
    .await;
    assert!(stderr.contains("Invalid API URL"));
}
