use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_pagewatch(dir: &Path, config: Option<&str>) -> Output {
    let config_path = dir.join("pagewatch.ron");
    if let Some(config) = config {
        fs::write(&config_path, config).unwrap();
    }
    Command::new(env!("CARGO_BIN_EXE_pagewatch"))
        .current_dir(dir)
        .env("PAGEWATCH_CONFIG", &config_path)
        .env_remove("SENDKEY")
        .output()
        .expect("pagewatch runs")
}

#[test]
fn missing_push_key_is_logged_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let output = run_pagewatch(
        dir.path(),
        Some(r#"(target_url: "http://127.0.0.1:9/page", renderer: Http, state_path: "state.txt")"#),
    );

    assert!(output.status.success(), "{:?}", output);
    assert!(!dir.path().join("state.txt").exists());
}

#[test]
fn malformed_config_is_logged_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let output = run_pagewatch(dir.path(), Some("(target_url: "));

    assert!(output.status.success(), "{:?}", output);
    assert!(!dir.path().join("last_hash.txt").exists());
}

#[test]
fn absent_config_uses_defaults_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let output = run_pagewatch(dir.path(), None);

    assert!(output.status.success(), "{:?}", output);
    assert!(!dir.path().join("last_hash.txt").exists());
}
