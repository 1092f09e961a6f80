use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn init_git_repo(dir: &Path) {
    assert!(Command::new("git")
        .args(["init"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "core.autocrlf", "false"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.email", "you@example.com"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.name", "Your Name"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    assert!(Command::new("git")
        .args(["add", "."])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["commit", "-m", &format!("add {name}")])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn fixture_repo(dir: &Path) {
    init_git_repo(dir);
    commit_file(dir, "src/lib.rs", "fn one() {}\nfn two() {}\n");
    commit_file(dir, "README.md", "# readme\n\nhello\n");
}

#[test]
fn snapshot_plain_text_report_runs() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    fixture_repo(dir.path());

    let output = Command::cargo_bin("stockline")
        .unwrap()
        .args(["--repo"])
        .arg(dir.path())
        .args(["snapshot"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total lines"), "got: {stdout}");
    assert!(stdout.contains("Stocks"), "got: {stdout}");
}

#[test]
fn snapshot_json_outputs_tree_and_files() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    fixture_repo(dir.path());

    let output = Command::cargo_bin("stockline")
        .unwrap()
        .args(["--repo"])
        .arg(dir.path())
        .args(["snapshot", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON document");
    assert_eq!(1, value["version"].as_u64().unwrap());
    assert_eq!(5, value["tree"]["lines"].as_u64().unwrap());
    assert_eq!(2, value["files"].as_array().unwrap().len());
    let share = value["tree"]["stocks"][0]["share"].as_f64().unwrap();
    assert!((share - 1.0).abs() < 1e-9);
}

#[test]
fn snapshot_exclude_pattern_drops_files() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    fixture_repo(dir.path());

    let output = Command::cargo_bin("stockline")
        .unwrap()
        .args(["--repo"])
        .arg(dir.path())
        .args(["--exclude", "*.md", "snapshot", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files = value["files"].as_array().unwrap();
    assert_eq!(1, files.len());
    assert_eq!("src/lib.rs", files[0]["path"].as_str().unwrap());
}

#[test]
fn history_writes_parseable_ndjson() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    fixture_repo(dir.path());
    let out_path = dir.path().join("history.ndjson");

    Command::cargo_bin("stockline")
        .unwrap()
        .args(["--repo"])
        .arg(dir.path())
        .args(["history", "--threads", "2", "--quiet", "--output"])
        .arg(&out_path)
        .assert()
        .success();

    let text = fs::read_to_string(&out_path).unwrap();
    let mut day_lines = 0;
    for line in text.lines() {
        let value: serde_json::Value = serde_json::from_str(line).expect("valid NDJSON line");
        if value["_type"] == "day" {
            day_lines += 1;
        }
    }
    assert!(day_lines >= 1, "expected at least one day record");
}

#[test]
fn malformed_mailmap_aborts_before_processing() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    fixture_repo(dir.path());
    let mailmap = dir.path().join("broken.mailmap");
    fs::write(&mailmap, "this is not a mailmap\n").unwrap();

    Command::cargo_bin("stockline")
        .unwrap()
        .args(["--repo"])
        .arg(dir.path())
        .args(["--mailmap"])
        .arg(&mailmap)
        .args(["snapshot"])
        .assert()
        .failure();
}
