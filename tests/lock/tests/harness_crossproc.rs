//! Cross-process acceptance: spawn `wasm_fixture` to write `test.wasm`
//! into a scratch directory, then spawn `harness_fixture` there and check
//! its stdout byte for byte.

use std::path::Path;
use std::process::{Command, Output};

use sha2::{Digest, Sha256};

const WASM_FIXTURE: &str = env!("CARGO_BIN_EXE_wasm_fixture");
const HARNESS_FIXTURE: &str = env!("CARGO_BIN_EXE_harness_fixture");

/// Write a demo artifact to `dir/test.wasm`; returns the printed digest line.
fn write_fixture(dir: &Path, extra: &[&str]) -> String {
    let output = Command::new(WASM_FIXTURE)
        .arg(dir.join("test.wasm"))
        .args(extra)
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {WASM_FIXTURE}: {e}"));
    assert!(
        output.status.success(),
        "wasm_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

fn run_harness(dir: &Path, env_overrides: &[(&str, &str)]) -> Output {
    let mut command = Command::new(HARNESS_FIXTURE);
    command.current_dir(dir).env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }
    command
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {HARNESS_FIXTURE}: {e}"))
}

fn stdout_of(output: &Output) -> &str {
    std::str::from_utf8(&output.stdout).expect("stdout is valid UTF-8")
}

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[test]
fn default_fixture_prints_expected_lines() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &[]);
    let output = run_harness(dir.path(), &[]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_of(&output), "42\n9\nSuccess!\n");
}

#[test]
fn chained_fixture_prints_expected_lines() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &["--chained", "--const-val", "-10"]);
    let output = run_harness(dir.path(), &[]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_of(&output), "-10\n-1\nSuccess!\n");
}

#[test]
fn stdout_is_independent_of_log_level_and_env() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &[]);
    let baseline = run_harness(dir.path(), &[]);

    for overrides in [
        &[("RUST_LOG", "trace")][..],
        &[("LC_ALL", "C"), ("LANG", "C")][..],
        &[("TZ", "America/New_York"), ("HOME", "/nonexistent")][..],
    ] {
        let variant = run_harness(dir.path(), overrides);
        assert!(variant.status.success(), "{overrides:?}: {variant:?}");
        assert_eq!(
            baseline.stdout, variant.stdout,
            "stdout differs with {overrides:?}"
        );
    }
}

#[test]
fn fixture_digest_matches_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let line = write_fixture(dir.path(), &["--const-val", "7"]);
    let bytes = std::fs::read(dir.path().join("test.wasm")).unwrap();
    let expected = format!("artifact_digest=sha256:{}\n", hex::encode(Sha256::digest(&bytes)));
    assert_eq!(line, expected);
}

// ---------------------------------------------------------------------------
// Failure: non-zero exit, empty stdout, diagnostic on stderr
// ---------------------------------------------------------------------------

#[test]
fn missing_artifact_exits_nonzero_with_empty_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_harness(dir.path(), &[]);
    assert!(!output.status.success());
    assert_eq!(stdout_of(&output), "");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read artifact"), "stderr={stderr}");
}

#[test]
fn invalid_artifact_exits_nonzero_with_empty_stdout() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("test.wasm"), b"\0asm\x02\0\0\0").unwrap();
    let output = run_harness(dir.path(), &[]);
    assert!(!output.status.success());
    assert_eq!(stdout_of(&output), "");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("instantiation failed"), "stderr={stderr}");
}

#[test]
fn wasm_fixture_rejects_missing_output_path() {
    let output = Command::new(WASM_FIXTURE).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: wasm_fixture"));
}
