// e2e/cli_integration.rs: black-box tests of the `brstate` binary
//
// Runs the built executable with std::process::Command and checks exit codes
// and the key/value lines it prints.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Locate the `brstate` binary produced by Cargo.
fn brstate_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_brstate") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop(); // remove test binary filename
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("brstate");
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(brstate_bin())
        .args(args)
        .output()
        .expect("failed to run brstate")
}

/// Value printed on the `key   value` line of `stdout`.
fn field(stdout: &[u8], key: &str) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .find_map(|l| {
            let mut parts = l.split_whitespace();
            (parts.next() == Some(key)).then(|| parts.next().unwrap_or("").to_string())
        })
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, bytes).unwrap();
    p
}

// ── 1. --version / --help ────────────────────────────────────────────────────

#[test]
fn test_cli_version() {
    let out = run(&["--version"]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("brstate"), "version output: {text}");
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_help_lists_subcommands() {
    let out = run(&["--help"]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    for sub in ["layout", "probe", "bench"] {
        assert!(text.contains(sub), "help should mention {sub}");
    }
}

#[test]
fn test_cli_unknown_subcommand_fails() {
    let out = run(&["frobnicate"]);
    assert!(!out.status.success());
}

// ── 2. layout ────────────────────────────────────────────────────────────────

#[test]
fn test_cli_layout_small_alphabet() {
    let out = run(&["layout", "--alphabet", "4", "--trees", "2"]);
    assert!(out.status.success());
    assert_eq!(field(&out.stdout, "max_table_size").as_deref(), Some("402"));
    assert_eq!(field(&out.stdout, "htrees_offset").as_deref(), Some("3216"));
    assert_eq!(field(&out.stdout, "total_bytes").as_deref(), Some("3224"));
}

#[test]
fn test_cli_layout_rejects_huge_alphabet() {
    let out = run(&["layout", "--alphabet", "5000"]);
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("_ERROR_INVALID_ARGUMENTS"), "stderr: {err}");
}

// ── 3. probe ─────────────────────────────────────────────────────────────────

#[test]
fn test_cli_probe_reports_window() {
    let dir = TempDir::new().unwrap();
    // WBITS 22 followed by arbitrary payload.
    let input = write_file(dir.path(), "in.br", &[0x0B, 0x80, 0x00, 0x03]);
    let out = run(&["probe", input.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(field(&out.stdout, "window_bits").as_deref(), Some("22"));
    assert_eq!(field(&out.stdout, "ringbuffer_size").as_deref(), Some("4194304"));
    assert_eq!(field(&out.stdout, "allocations"), field(&out.stdout, "frees"));
}

#[test]
fn test_cli_probe_with_dictionary() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "in.br", &[0x00]);
    let dict = write_file(dir.path(), "dict.bin", &[b'd'; 500]);
    let out = run(&[
        "probe",
        input.to_str().unwrap(),
        "--dict",
        dict.to_str().unwrap(),
        "--chunk-size",
        "1K",
    ]);
    assert!(out.status.success());
    assert_eq!(field(&out.stdout, "window_bits").as_deref(), Some("16"));
    assert_eq!(field(&out.stdout, "dict_len").as_deref(), Some("500"));
}

#[test]
fn test_cli_probe_empty_file_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "empty.br", &[]);
    let out = run(&["probe", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("truncated"));
}

#[test]
fn test_cli_probe_quiet_suppresses_errors() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "bad.br", &[0x11]);
    let out = run(&["-qq", "probe", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stderr.is_empty());
}

#[test]
fn test_cli_probe_memory_limit() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "in.br", &[0x0B]);
    let out = run(&["probe", input.to_str().unwrap(), "--mem-limit", "64K"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("_ERROR_ALLOC_RING_BUFFER"));
}

#[test]
fn test_cli_probe_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.br");
    let out = run(&["probe", missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot read"));
}

// ── 4. bench ─────────────────────────────────────────────────────────────────

#[test]
fn test_cli_bench_balanced() {
    let out = run(&["bench", "--iterations", "50", "--threads", "2"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("50 lifecycles"));
    assert!(text.contains("balanced"));
}

#[test]
fn test_cli_bench_respects_env_workers() {
    let out = Command::new(brstate_bin())
        .args(["bench", "-i", "8"])
        .env("BRSTATE_NBWORKERS", "3")
        .output()
        .expect("failed to run brstate");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("3 threads"));
}
