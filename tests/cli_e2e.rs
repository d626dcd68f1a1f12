//! End-to-end CLI tests for the parfetch binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Writes a manifest into `dir` and returns its path.
fn write_manifest(dir: &TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("job.yml");
    std::fs::write(&path, text).expect("write manifest");
    path
}

#[test]
fn test_binary_without_subcommand_shows_usage_error() {
    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parfetch"));
}

#[test]
fn test_download_missing_manifest_fails() {
    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.args(["download", "/nonexistent/job.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading manifest"));
}

#[test]
fn test_download_invalid_manifest_fails_before_any_task() {
    let temp = TempDir::new().unwrap();
    let manifest = write_manifest(
        &temp,
        "config:\n  download_dir: ./d\ndownloads:\n  - url: https://e.com/a\n    file: a\n    sha1: tooshort\n",
    );

    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.arg("download")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("sha1"));
}

#[test]
fn test_download_dry_run_prints_plan_without_io() {
    let temp = TempDir::new().unwrap();
    let download_dir = temp.path().join("never-created");
    let manifest = write_manifest(
        &temp,
        &format!(
            "config:\n  parallel_downloads: 3\n  download_dir: {}\ndownloads:\n  - url: https://example.com/a.bin\n    file: a.bin\n    overwrite: true\n  - url: https://example.com/b.bin\n    file: b.bin\n",
            download_dir.display()
        ),
    );

    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.args(["download", "--dry-run"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parallel downloads: 3"))
        .stdout(predicate::str::contains("a.bin <- https://example.com/a.bin"))
        .stdout(predicate::str::contains("overwrite: true"))
        .stdout(predicate::str::contains("b.bin"));

    assert!(
        !download_dir.exists(),
        "dry run must not create the download directory"
    );
}

#[test]
fn test_download_dry_run_respects_parallel_override() {
    let temp = TempDir::new().unwrap();
    let manifest = write_manifest(
        &temp,
        "config:\n  parallel_downloads: 3\n  download_dir: ./d\ndownloads: []\n",
    );

    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.args(["download", "--dry-run", "--parallel-downloads", "9"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parallel downloads: 9"));
}

#[test]
fn test_validate_reports_match_and_missing() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("hello.txt"), b"hello\n").unwrap();
    let manifest = write_manifest(
        &temp,
        &format!(
            "config:\n  download_dir: {}\ndownloads:\n  - url: https://example.com/hello\n    file: hello.txt\n    sha1: f572d396fae9206628714fb2ce00f72e94f2258f\n  - url: https://example.com/gone\n    file: gone.bin\n  - url: https://example.com/nohash\n    file: hello.txt2\n",
            temp.path().display()
        ),
    );

    // hello.txt2 does not exist either; reuse hello.txt for the no-hash case
    // by copying it.
    std::fs::copy(
        temp.path().join("hello.txt"),
        temp.path().join("hello.txt2"),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.arg("validate")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid SHA-1"))
        .stdout(predicate::str::contains("File does not exist!"))
        .stdout(predicate::str::contains("No hash configured"));
}

#[test]
fn test_validate_reports_mismatch() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("hello.txt"), b"tampered\n").unwrap();
    let manifest = write_manifest(
        &temp,
        &format!(
            "config:\n  download_dir: {}\ndownloads:\n  - url: https://example.com/hello\n    file: hello.txt\n    sha256: 5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03\n",
            temp.path().display()
        ),
    );

    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.arg("validate")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid SHA-256"));
}

#[test]
fn test_validate_rejects_duplicate_destinations() {
    let temp = TempDir::new().unwrap();
    let manifest = write_manifest(
        &temp,
        "config:\n  download_dir: ./d\ndownloads:\n  - url: https://e.com/a\n    file: same.bin\n  - url: https://e.com/b\n    file: same.bin\n",
    );

    let mut cmd = Command::cargo_bin("parfetch").unwrap();
    cmd.arg("validate")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate destination"));
}
