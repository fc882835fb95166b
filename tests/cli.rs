#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn wikiman_bin() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_wikiman") {
        return PathBuf::from(path);
    }
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("target");
    path.push("debug");
    path.push("wikiman");
    path
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Runs wikiman with `echo` standing in for `man`, so the pager just prints
/// its arguments.
fn run(base: &Path, args: &[&str]) -> Output {
    Command::new(wikiman_bin())
        .args(["--base-path", base.to_str().expect("utf-8 path"), "--pager", "echo"])
        .args(args)
        .env_remove("WIKIMAN_LOG")
        .output()
        .expect("run wikiman")
}

#[test]
fn html_input_writes_page_and_runs_pager() {
    let dir = tempfile::tempdir().expect("tempdir");
    let html = fixture("article.html");

    let output = run(dir.path(), &["--html", html.to_str().unwrap(), "Example Topic"]);

    assert!(output.status.success());
    let page = dir.path().join("Example_Topic.1");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("-l {}", page.display()));
    let roff = fs::read_to_string(page).expect("read page");
    assert!(roff.starts_with(".TH \"EXAMPLE TOPIC\" 1\n.SH NAME\n"));
    assert!(roff.contains(".SH HISTORY\n"));
}

#[test]
fn cached_page_is_reused_without_fetching() {
    let dir = tempfile::tempdir().expect("tempdir");
    let page = dir.path().join("Cached_Article.3");
    fs::write(&page, ".TH \"CACHED\" 3\n").expect("seed cache");

    let output = run(dir.path(), &["-s", "3", "Cached Article", "--", "-P", "cat"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("-P cat -l {}", page.display()));
    assert_eq!(fs::read_to_string(page).expect("read page"), ".TH \"CACHED\" 3\n");
}

#[test]
fn refresh_replaces_cached_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let page = dir.path().join("Example_Topic.1");
    fs::write(&page, "stale").expect("seed cache");
    let html = fixture("article.html");

    let output = run(
        dir.path(),
        &["-f", "--html", html.to_str().unwrap(), "Example_Topic"],
    );

    assert!(output.status.success());
    let roff = fs::read_to_string(page).expect("read page");
    assert!(roff.starts_with(".TH \"EXAMPLE TOPIC\" 1\n"));
}

#[test]
fn missing_content_root_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let html = dir.path().join("broken.html");
    fs::write(&html, "<html><body><p>No article here.</p></body></html>").expect("write html");
    let page = dir.path().join("Broken.1");
    fs::write(&page, "previous").expect("seed cache");

    let output = run(dir.path(), &["--html", html.to_str().unwrap(), "Broken"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_to_string(page).expect("read page"), "previous");
}

#[test]
fn config_file_supplies_section() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("wikiman.yml");
    fs::write(&config, "section: 5\n").expect("write config");
    let html = fixture("article.html");

    let output = run(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--html",
            html.to_str().unwrap(),
            "Example Topic",
        ],
    );

    assert!(output.status.success());
    let roff = fs::read_to_string(dir.path().join("Example_Topic.5")).expect("read page");
    assert!(roff.starts_with(".TH \"EXAMPLE TOPIC\" 5\n"));
}
