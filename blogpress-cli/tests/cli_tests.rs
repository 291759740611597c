use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use blogpress_core::{index_store, PublishedRecord};

fn blogpress_cmd(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("blogpress"));
    cmd.arg("--root")
        .arg(root)
        .env_remove("BLOGPRESS_ROOT")
        .env_remove("SOURCE_DATE_EPOCH")
        .env_remove("RUST_LOG");
    cmd
}

fn write_post(root: &Path, slug: &str, title: &str, tags: &[&str], publish: bool) {
    let dir = root.join("content").join("posts");
    fs::create_dir_all(&dir).expect("create posts dir");
    let tags = tags
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        dir.join(format!("{slug}.md")),
        format!(
            "---\ntitle: {title}\nsummary: about {slug}\ntags: [{tags}]\npublish: {publish}\n---\n\nBody.\n"
        ),
    )
    .expect("write post");
}

fn index_records(root: &Path) -> Vec<PublishedRecord> {
    index_store::load_at(&root.join("published.json"))
        .expect("load index")
        .records
}

#[test]
fn init_creates_empty_index_once() {
    let root = TempDir::new().expect("root");

    blogpress_cmd(root.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized empty index"));
    assert_eq!(
        fs::read_to_string(root.path().join("published.json")).expect("read"),
        "[]"
    );

    blogpress_cmd(root.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("already exists"));
}

#[test]
fn reconcile_publishes_candidates_at_pinned_time() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "hello", "Hello", &["rust"], true);
    write_post(root.path(), "wip", "Work in progress", &[], false);

    blogpress_cmd(root.path())
        .args([
            "reconcile",
            "--candidates",
            "content/posts/hello.md,content/posts/wip.md",
            "--now",
            "1000",
        ])
        .assert()
        .success()
        .stdout(contains("hello").and(contains("published")))
        .stdout(contains("draft"));

    let records = index_records(root.path());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].slug.as_str(), "hello");
    assert_eq!(records[0].title, "Hello");
    assert_eq!((records[0].created, records[0].updated), (1000, 1000));
}

#[test]
fn source_date_epoch_pins_the_clock() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "hello", "Hello", &[], true);

    blogpress_cmd(root.path())
        .env("SOURCE_DATE_EPOCH", "1577836800")
        .args(["reconcile", "--candidates", "hello.md"])
        .assert()
        .success();

    assert_eq!(index_records(root.path())[0].created, 1_577_836_800);
}

#[test]
fn dry_run_reports_but_writes_nothing() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "hello", "Hello", &[], true);

    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "hello.md", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]").and(contains("would update")));

    assert!(!root.path().join("published.json").exists());
}

#[test]
fn reconcile_json_lists_every_outcome() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "a", "A", &[], true);
    write_post(root.path(), "b", "B", &[], false);

    let output = blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "a.md", "--candidates", "b.md", "--json", "--now", "5"])
        .output()
        .expect("run blogpress");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["written"], true);
    assert_eq!(report["records"], 1);
    let changes: Vec<(String, String)> = report["changes"]
        .as_array()
        .expect("changes array")
        .iter()
        .map(|c| {
            (
                c["slug"].as_str().unwrap_or_default().to_string(),
                c["change"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    assert_eq!(
        changes,
        [
            ("a".to_string(), "published".to_string()),
            ("b".to_string(), "draft".to_string())
        ]
    );
}

#[test]
fn revocation_through_cli_leaves_empty_index() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "hello", "Hello", &[], true);
    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "hello.md", "--now", "1000"])
        .assert()
        .success();

    write_post(root.path(), "hello", "Hello", &[], false);
    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "hello.md", "--now", "2000"])
        .assert()
        .success()
        .stdout(contains("revoked"));

    assert_eq!(
        fs::read_to_string(root.path().join("published.json")).expect("read"),
        "[]"
    );
}

#[test]
fn no_candidates_is_a_noop() {
    let root = TempDir::new().expect("root");

    blogpress_cmd(root.path())
        .arg("reconcile")
        .assert()
        .success()
        .stdout(contains("no candidates"));
    assert!(!root.path().join("published.json").exists());
}

#[test]
fn diff_shows_added_record_without_writing() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "hello", "Hello", &[], true);

    let assert = blogpress_cmd(root.path())
        .args(["diff", "--candidates", "hello.md", "--now", "1000"])
        .assert()
        .success()
        .stdout(contains("--- a/published.json"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    assert!(
        stdout
            .lines()
            .any(|line| line.starts_with('+') && line.contains("\"slug\": \"hello\"")),
        "expected an added slug line, got:\n{stdout}"
    );
    assert!(!root.path().join("published.json").exists());
}

#[test]
fn corrupt_index_fails_and_is_left_alone() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "hello", "Hello", &[], true);
    let index = root.path().join("published.json");
    fs::write(&index, "{ not json").expect("write corrupt index");

    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "hello.md"])
        .assert()
        .failure()
        .stderr(contains("reconcile failed").and(contains("published.json")));

    assert_eq!(fs::read_to_string(&index).expect("read"), "{ not json");
}

#[test]
fn missing_source_fails_without_writing() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "hello", "Hello", &[], true);

    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "hello.md,ghost.md"])
        .assert()
        .failure()
        .stderr(contains("ghost"));

    assert!(!root.path().join("published.json").exists());
}

#[test]
fn posts_and_tags_read_the_index() {
    let root = TempDir::new().expect("root");
    write_post(root.path(), "first", "First", &["rust", "notes"], true);
    write_post(root.path(), "second", "Second", &["rust"], true);
    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "first.md", "--now", "100"])
        .assert()
        .success();
    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "second.md", "--now", "200"])
        .assert()
        .success();

    let output = blogpress_cmd(root.path())
        .args(["posts", "--recent", "1", "--json"])
        .output()
        .expect("run blogpress");
    assert!(output.status.success());
    let posts: Vec<PublishedRecord> = serde_json::from_slice(&output.stdout).expect("posts json");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].slug.as_str(), "second");

    blogpress_cmd(root.path())
        .args(["posts", "--tag", "notes"])
        .assert()
        .success()
        .stdout(contains("First").and(contains("Second").not()));

    blogpress_cmd(root.path())
        .args(["tags", "--json"])
        .assert()
        .success()
        .stdout(contains("\"rust\": 2").and(contains("\"notes\": 1")));

    blogpress_cmd(root.path())
        .args(["posts", "ghost"])
        .assert()
        .failure()
        .stderr(contains("no published post with slug 'ghost'"));
}

#[test]
fn root_falls_back_to_environment() {
    let root = TempDir::new().expect("root");

    Command::new(assert_cmd::cargo::cargo_bin!("blogpress"))
        .env("BLOGPRESS_ROOT", root.path())
        .env_remove("SOURCE_DATE_EPOCH")
        .arg("init")
        .assert()
        .success();

    assert!(root.path().join("published.json").exists());
}

#[test]
fn site_config_relocates_the_index() {
    let root = TempDir::new().expect("root");
    fs::write(
        root.path().join("blogpress.yaml"),
        "index_file: data/index.json\n",
    )
    .expect("write config");
    write_post(root.path(), "hello", "Hello", &[], true);

    blogpress_cmd(root.path())
        .args(["reconcile", "--candidates", "hello.md", "--now", "1"])
        .assert()
        .success();

    assert!(root.path().join("data").join("index.json").exists());
    assert!(!root.path().join("published.json").exists());
}
