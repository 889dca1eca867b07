//! Tests for the `lectern` binary. None of these touch the network.

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use common::minimal_pdf_with_phrase;
use tempfile::TempDir;

fn lectern_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lectern"))
}

/// Temp dir with a config (embeddings disabled) and one small PDF.
fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let config_path = root.join("lectern.toml");
    fs::write(
        &config_path,
        r#"[chunking]
max_words = 300

[embedding]
provider = "disabled"

[llm]
base_url = "http://127.0.0.1:9"
api_key_env = "LECTERN_TEST_NO_KEY"
"#,
    )
    .unwrap();

    let pdf_path = root.join("notes.pdf");
    fs::write(&pdf_path, minimal_pdf_with_phrase("lecture notes phrase")).unwrap();

    (tmp, config_path, pdf_path)
}

fn run_lectern(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = lectern_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run lectern binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_chunk_prints_passages() {
    let (_tmp, config_path, pdf_path) = setup_test_env();
    let (stdout, stderr, success) =
        run_lectern(&config_path, &["chunk", pdf_path.to_str().unwrap()]);
    assert!(success, "chunk failed: {}", stderr);
    assert!(stdout.contains("notes.pdf: 1 passages (max 300 words)"), "{}", stdout);
    assert!(stdout.contains("[0] 3 words"), "{}", stdout);
    assert!(stdout.contains("lecture notes phrase"), "{}", stdout);
}

#[test]
fn test_chunk_full_prints_passage_text() {
    let (_tmp, config_path, pdf_path) = setup_test_env();
    let (stdout, stderr, success) =
        run_lectern(&config_path, &["chunk", "--full", pdf_path.to_str().unwrap()]);
    assert!(success, "chunk failed: {}", stderr);
    assert!(stdout.contains("\nlecture notes phrase"), "{}", stdout);
}

#[test]
fn test_chunk_missing_file() {
    let (tmp, config_path, _) = setup_test_env();
    let missing = tmp.path().join("missing.pdf");
    let (_, stderr, success) = run_lectern(&config_path, &["chunk", missing.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Failed to read"), "{}", stderr);
}

#[test]
fn test_chunk_rejects_non_pdf() {
    let (tmp, config_path, _) = setup_test_env();
    let bogus = tmp.path().join("bogus.pdf");
    fs::write(&bogus, "plain text, not a PDF").unwrap();
    let (_, stderr, success) = run_lectern(&config_path, &["chunk", bogus.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("PDF extraction failed"), "{}", stderr);
}

#[test]
fn test_ask_with_disabled_embeddings_fails() {
    let (_tmp, config_path, pdf_path) = setup_test_env();
    let (_, stderr, success) = run_lectern(
        &config_path,
        &["ask", "What is this?", "--pdf", pdf_path.to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("Embedding provider is disabled"), "{}", stderr);
}

#[test]
fn test_ask_requires_pdf() {
    let (_tmp, config_path, _) = setup_test_env();
    let (_, _, success) = run_lectern(&config_path, &["ask", "What is this?"]);
    assert!(!success);
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, _, pdf_path) = setup_test_env();
    let bad_config = tmp.path().join("bad.toml");
    fs::write(&bad_config, "[chunking]\nmax_words = 0\n").unwrap();
    let (_, stderr, success) = run_lectern(&bad_config, &["chunk", pdf_path.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("max_words"), "{}", stderr);
}

#[test]
fn test_missing_config_uses_defaults() {
    let (tmp, _, pdf_path) = setup_test_env();
    let absent = tmp.path().join("absent.toml");
    let (stdout, stderr, success) = run_lectern(&absent, &["chunk", pdf_path.to_str().unwrap()]);
    assert!(success, "chunk failed: {}", stderr);
    assert!(stdout.contains("(max 300 words)"), "{}", stdout);
}
