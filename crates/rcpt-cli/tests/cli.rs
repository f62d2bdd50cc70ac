use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Config file with the remote categorizer switched off.
fn offline_config(dir: &TempDir) -> String {
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "remote": { "enabled": false } }"#).expect("write config");
    path.display().to_string()
}

fn rcpt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rcpt").expect("binary built");
    cmd.arg("--config").arg(offline_config(dir));
    cmd
}

/// Generate endpoint stub answering every request with `label`.
///
/// Returns the endpoint URL and a counter of requests served.
fn stub_generate(label: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let endpoint = format!("http://{}/api/generate", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let served = Arc::clone(&hits);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            read_http_request(&mut stream);
            served.fetch_add(1, Ordering::SeqCst);

            let body = format!(r#"{{"response":"{}"}}"#, label);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (endpoint, hits)
}

fn read_http_request(stream: &mut impl Read) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    while let Ok(n) = stream.read(&mut chunk) {
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        let Some(header_end) = text.find("\r\n\r\n") else { continue };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if buf.len() >= header_end + 4 + content_length {
            return;
        }
    }
}

/// Command pointed at a config whose remote stage uses `endpoint`.
fn rcpt_remote(dir: &TempDir, endpoint: &str) -> Command {
    let path = dir.path().join("remote.json");
    let config = serde_json::json!({
        "remote": { "enabled": true, "endpoint": endpoint, "model": "stub", "timeout_secs": 5 }
    });
    fs::write(&path, config.to_string()).expect("write config");

    let mut cmd = Command::cargo_bin("rcpt").expect("binary built");
    cmd.arg("--config").arg(&path);
    for var in ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn extract_prints_json_record() {
    let dir = TempDir::new().unwrap();

    rcpt(&dir)
        .args(["extract", "tests/fixtures/diner.txt"])
        .assert()
        .success()
        .stdout(
            "{\"merchant\":\"Joe's Diner Store #42\",\"date\":\"03/14/2024\",\"total\":\"12.50\",\"category\":\"Food & Drink\"}\n",
        );
}

#[test]
fn extract_uses_fallback_total_and_fuel_rule() {
    let dir = TempDir::new().unwrap();

    rcpt(&dir)
        .args(["extract", "tests/fixtures/fuel.txt", "--format", "csv"])
        .assert()
        .success()
        .stdout("merchant,date,total,category\nSHELL,2024-05-02,40.99,Gas/Transport\n\n");
}

#[test]
fn extract_reads_stdin() {
    let dir = TempDir::new().unwrap();

    rcpt(&dir)
        .args(["extract", "-", "--format", "text"])
        .write_stdin("Starbucks\nLatte 4.50\nTotal 4.50\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Category: Food & Drink"))
        .stdout(predicate::str::contains("Total:    4.50"));
}

#[test]
fn extract_empty_stdin_gives_default_record() {
    let dir = TempDir::new().unwrap();

    rcpt(&dir)
        .args(["extract", "-"])
        .write_stdin("")
        .assert()
        .success()
        .stdout("{\"merchant\":\"\",\"date\":\"\",\"total\":\"\",\"category\":\"Other\"}\n");
}

#[test]
fn extract_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    rcpt(&dir)
        .args(["extract", "tests/fixtures/does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn remote_answer_overrides_rule_category() {
    let dir = TempDir::new().unwrap();
    let (endpoint, hits) = stub_generate("Shopping");

    rcpt_remote(&dir, &endpoint)
        .args(["extract", "tests/fixtures/diner.txt"])
        .assert()
        .success()
        .stdout(
            "{\"merchant\":\"Joe's Diner Store #42\",\"date\":\"03/14/2024\",\"total\":\"12.50\",\"category\":\"Shopping\"}\n",
        );

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn unreadable_input_gives_other_without_remote_call() {
    let dir = TempDir::new().unwrap();
    let unreadable = dir.path().join("scan.txt");
    fs::create_dir(&unreadable).unwrap();
    let (endpoint, hits) = stub_generate("Shopping");

    rcpt_remote(&dir, &endpoint)
        .args(["extract", "--show-warnings"])
        .arg(&unreadable)
        .assert()
        .success()
        .stdout("{\"merchant\":\"\",\"date\":\"\",\"total\":\"\",\"category\":\"Other\"}\n")
        .stderr(predicate::str::contains("OCR text unavailable"));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn no_remote_flag_skips_remote_stage() {
    let dir = TempDir::new().unwrap();
    let (endpoint, hits) = stub_generate("Shopping");

    rcpt_remote(&dir, &endpoint)
        .args(["extract", "tests/fixtures/diner.txt", "--no-remote"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"category\":\"Food & Drink\""));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    rcpt(&dir)
        .args(["batch", "tests/fixtures/*.txt", "--summary", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"))
        .stdout(predicate::str::contains("Totals by category:"))
        .stdout(predicate::str::contains("Food & Drink"));

    assert!(out.join("diner.json").exists());
    assert!(out.join("fuel.json").exists());
    assert!(out.join("noise.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 4);
    assert!(summary.contains("Gas/Transport"));
    assert!(summary.contains(",Other,"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();

    rcpt(&dir)
        .args(["batch", "tests/fixtures/*.nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("new.json");

    rcpt(&dir)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"keywords\""));

    rcpt(&dir)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_commands_use_config_flag() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.json");

    Command::cargo_bin("rcpt")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .args(["config", "set", "remote.model", "mistral"])
        .assert()
        .success();

    Command::cargo_bin("rcpt")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .args(["config", "get", "remote.model"])
        .assert()
        .success()
        .stdout("\"mistral\"\n");

    Command::cargo_bin("rcpt")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"mistral\""));
}
