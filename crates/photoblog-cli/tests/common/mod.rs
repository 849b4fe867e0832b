#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use wiremock::MockServer;

pub const API_KEY: &str = "cli-test-key";

/// Path of the mocked blog below the server root.
pub const BLOG_PATH: &str = "/v2/blog/example";

/// API base URL for a mock server.
pub fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}{}", server.address().port(), BLOG_PATH)
}

/// Run the CLI binary with an isolated HOME and the given API URL.
///
/// Blocks until the process exits; call from `spawn_blocking` while a mock
/// server runs on the test runtime.
pub fn run_cli_with_env(args: &[&str], home: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_photoblog"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.env("PHOTOBLOG_API_KEY", API_KEY);
    cmd.env("PHOTOBLOG_API_URL", api_url);
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime.
pub async fn run(args: &[&str], home: &Path, api_url: &str) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let home = home.to_path_buf();
    let api_url = api_url.to_string();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &home, &api_url)
    })
    .await
    .unwrap()
}

/// Run the CLI and expect success.
pub async fn run_success(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run(args, home, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure.
pub async fn run_failure(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run(args, home, api_url).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A photo post as the API returns it.
pub fn photo_post(id: u64, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "id_string": id.to_string(),
        "type": "photo",
        "timestamp": 1_614_859_200,
        "summary": format!("sunset {}", id),
        "tags": tags,
        "note_count": id * 7,
        "post_url": format!("https://example.tumblr.com/post/{}", id),
        "photos": [{
            "alt_sizes": [
                { "width": 1280, "height": 960, "url": format!("https://media.example/{}_1280.jpg", id) },
                { "width": 640, "height": 480, "url": format!("https://media.example/{}_640.jpg", id) }
            ]
        }]
    })
}

/// A listing response with posts `ids` out of `total`.
pub fn listing(ids: std::ops::Range<u64>, total: u64) -> Value {
    let posts: Vec<Value> = ids.map(|id| photo_post(id, &["sky"])).collect();
    json!({
        "meta": { "status": 200, "msg": "OK" },
        "response": { "posts": posts, "total_posts": total }
    })
}
