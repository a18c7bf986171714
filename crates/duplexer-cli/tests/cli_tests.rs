//! Integration tests for the duplexer binary

use assert_cmd::Command;
use lopdf::{dictionary, Document, Object};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG_ENV: &[&str] = &[
    "DUPLEXER_CONFIG",
    "INGEST_DIR",
    "COMPLETED_DIR",
    "ARCHIVE_DIR",
    "FAILED_DIR",
    "SCAN_GLOB",
    "FILE_STABILITY_SECONDS",
    "REQUIRE_READY_FILE",
    "POLL_INTERVAL_SECONDS",
    "FORCE_POLLING",
    "REVERSE_BACKS",
    "INSERT_BLANK_LASTBACK",
    "OUTPUT_SUFFIX",
    "LOG_LEVEL",
    "RUST_LOG",
];

/// Binary with no inherited configuration: env overrides removed and the
/// user config directory pointed into `home`.
fn duplexer(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("duplexer").unwrap();
    for key in CONFIG_ENV {
        cmd.env_remove(key);
    }
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn write_pdf(path: &Path, pages: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            }))
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Resources" => dictionary! {},
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let temp = TempDir::new().unwrap();
    duplexer(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch").and(predicate::str::contains("interleave")));
}

#[test]
fn test_cli_version() {
    let temp = TempDir::new().unwrap();
    duplexer(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

// ============================================================================
// watch
// ============================================================================

#[test]
fn test_watch_missing_input_dir_exits_1() {
    let temp = TempDir::new().unwrap();
    duplexer(temp.path())
        .args(["watch", "--once", "--input-dir"])
        .arg(temp.path().join("missing"))
        .arg("--output-dir")
        .arg(temp.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input directory does not exist"));
}

#[test]
fn test_watch_missing_explicit_config_exits_1() {
    let temp = TempDir::new().unwrap();
    duplexer(temp.path())
        .args(["watch", "--once", "-C"])
        .arg(temp.path().join("nope.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_watch_once_on_empty_dir_creates_routing_dirs() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("ingest");
    let output = temp.path().join("completed");
    fs::create_dir(&input).unwrap();

    duplexer(temp.path())
        .args(["watch", "--once", "--input-dir"])
        .arg(&input)
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed 0 file(s)"));

    assert!(output.is_dir());
    assert!(input.join("archive").is_dir());
    assert!(input.join("failed").is_dir());
}

#[test]
fn test_watch_once_routes_good_and_bad_scans() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("ingest");
    let output = temp.path().join("completed");
    fs::create_dir(&input).unwrap();
    write_pdf(&input.join("scan.pdf"), 4);
    fs::write(input.join("junk.pdf"), b"not a pdf").unwrap();

    duplexer(temp.path())
        .args(["watch", "--once", "--stability-seconds", "0", "--input-dir"])
        .arg(&input)
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed 2 file(s)"));

    assert_eq!(page_count(&output.join("scan.duplex.pdf")), 4);
    assert!(input.join("archive").join("scan.pdf").exists());
    assert!(input.join("failed").join("junk.pdf").exists());
    assert!(!input.join("scan.pdf").exists());
    assert!(!input.join("junk.pdf").exists());
}

#[test]
fn test_watch_clears_staged_outputs_left_by_a_killed_run() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("ingest");
    let output = temp.path().join("completed");
    fs::create_dir(&input).unwrap();
    fs::create_dir(&output).unwrap();
    let leftover = output.join(".duplexer-x7Yz.partial");
    fs::write(&leftover, b"half written").unwrap();

    duplexer(temp.path())
        .args(["watch", "--once", "--input-dir"])
        .arg(&input)
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .success();

    assert!(!leftover.exists());
}

#[test]
fn test_watch_reads_environment_and_config_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("ingest");
    let output = temp.path().join("completed");
    fs::create_dir(&input).unwrap();
    write_pdf(&input.join("scan.pdf"), 2);

    let config = temp.path().join("duplexer.toml");
    fs::write(
        &config,
        "[transform]\noutput_suffix = \"-interleaved\"\n\n[watch]\nstability_seconds = 3600.0\n",
    )
    .unwrap();

    duplexer(temp.path())
        .args(["watch", "--once", "-C"])
        .arg(&config)
        .env("INGEST_DIR", &input)
        .env("COMPLETED_DIR", &output)
        .env("FILE_STABILITY_SECONDS", "0")
        .assert()
        .success();

    assert!(output.join("scan-interleaved.pdf").exists());
}

#[test]
fn test_watch_rejects_bad_pattern() {
    let temp = TempDir::new().unwrap();
    duplexer(temp.path())
        .args(["watch", "--once", "--pattern", "[oops", "--input-dir"])
        .arg(temp.path())
        .arg("--output-dir")
        .arg(temp.path().join("out"))
        .assert()
        .code(1);
}

// ============================================================================
// interleave
// ============================================================================

#[test]
fn test_interleave_writes_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("scan.pdf");
    let output = temp.path().join("out.pdf");
    write_pdf(&input, 6);

    duplexer(temp.path())
        .arg("interleave")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully wrote"));

    assert_eq!(page_count(&output), 6);
}

#[test]
fn test_interleave_accepts_forward_backs() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("scan.pdf");
    let output = temp.path().join("out.pdf");
    write_pdf(&input, 4);

    duplexer(temp.path())
        .arg("interleave")
        .arg(&input)
        .arg(&output)
        .args(["--reverse-backs", "false"])
        .assert()
        .success();

    assert_eq!(page_count(&output), 4);
}

#[test]
fn test_interleave_odd_pages_exits_2() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("scan.pdf");
    let output = temp.path().join("out.pdf");
    write_pdf(&input, 3);

    duplexer(temp.path())
        .arg("interleave")
        .arg(&input)
        .arg(&output)
        .assert()
        .code(2);

    assert!(!output.exists());
}

#[test]
fn test_interleave_odd_pages_with_blank_padding() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("scan.pdf");
    let output = temp.path().join("out.pdf");
    write_pdf(&input, 3);

    duplexer(temp.path())
        .arg("interleave")
        .arg(&input)
        .arg(&output)
        .arg("--insert-blank-lastback")
        .assert()
        .success();

    assert_eq!(page_count(&output), 4);
}

#[test]
fn test_interleave_unreadable_input_exits_1() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("scan.pdf");
    fs::write(&input, b"garbage").unwrap();

    duplexer(temp.path())
        .arg("interleave")
        .arg(&input)
        .arg(temp.path().join("out.pdf"))
        .assert()
        .code(1);

    duplexer(temp.path())
        .arg("interleave")
        .arg(temp.path().join("missing.pdf"))
        .arg(temp.path().join("out.pdf"))
        .assert()
        .code(1);
}
