//! CLI surface tests: directory scanning, output streams, exit codes.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp directory");
    dir
}

fn write_fixture(dir: &Path, name: &str, source: &str) {
    std::fs::write(dir.join(name), source).expect("should write fixture file");
}

const UNSAFE_FN: &str = r#"package demo

func GetUser(db *sqlx.DB, name string) {
	var r row
	db.Get(&r, "SELECT * FROM users WHERE name="+name)
}
"#;

const SAFE_FN: &str = r#"package demo

func GetUserSafe(db *sqlx.DB, name string) {
	var r row
	db.Get(&r, "SELECT id FROM users WHERE name=?", name)
}
"#;

#[test]
fn findings_go_to_stdout_one_per_line_and_exit_zero() {
    let dir = unique_dir("sqlsift_cli_lines");
    write_fixture(&dir, "users.go", UNSAFE_FN);

    let output = Command::new(env!("CARGO_BIN_EXE_sqlsift"))
        .arg("--dir")
        .arg(&dir)
        .output()
        .expect("should run sqlsift binary");

    assert_eq!(
        output.status.code(),
        Some(0),
        "findings are not failures, got {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "GetUser exist sql injection",
            "GetUser exist select * or select (x).*",
        ],
        "stderr was:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn clean_code_produces_no_output() {
    let dir = unique_dir("sqlsift_cli_clean");
    write_fixture(&dir, "users.go", SAFE_FN);

    let output = Command::new(env!("CARGO_BIN_EXE_sqlsift"))
        .arg("--dir")
        .arg(&dir)
        .output()
        .expect("should run sqlsift binary");

    assert_eq!(output.status.code(), Some(0));
    assert!(
        output.stdout.is_empty(),
        "expected no findings, got:\n{}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn triple_dot_suffix_scans_subdirectories() {
    let dir = unique_dir("sqlsift_cli_recursive");
    std::fs::create_dir_all(dir.join("internal")).expect("should create temp dirs");
    write_fixture(&dir.join("internal"), "users.go", UNSAFE_FN);

    let without = Command::new(env!("CARGO_BIN_EXE_sqlsift"))
        .arg("--dir")
        .arg(&dir)
        .output()
        .expect("should run sqlsift binary");
    assert!(
        without.stdout.is_empty(),
        "a plain root must not recurse, got:\n{}",
        String::from_utf8_lossy(&without.stdout)
    );

    let recursive = Command::new(env!("CARGO_BIN_EXE_sqlsift"))
        .arg("--dir")
        .arg(format!("{}...", dir.display()))
        .output()
        .expect("should run sqlsift binary");
    let stdout = String::from_utf8_lossy(&recursive.stdout);
    assert!(
        stdout.contains("GetUser exist sql injection"),
        "recursive scan should reach nested files, got:\n{stdout}"
    );
}

#[test]
fn unparseable_files_are_skipped_and_the_scan_continues() {
    let dir = unique_dir("sqlsift_cli_broken");
    write_fixture(&dir, "broken.go", "package demo\n\nfunc f( {\n");
    write_fixture(&dir, "users.go", UNSAFE_FN);

    let output = Command::new(env!("CARGO_BIN_EXE_sqlsift"))
        .arg("--dir")
        .arg(&dir)
        .output()
        .expect("should run sqlsift binary");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("GetUser exist sql injection"),
        "the parseable file should still be analyzed, got:\n{stdout}"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("broken.go"),
        "the skipped file should be reported on stderr, got:\n{stderr}"
    );
}

#[test]
fn json_flag_emits_a_structured_array() {
    let dir = unique_dir("sqlsift_cli_json");
    write_fixture(&dir, "users.go", UNSAFE_FN);

    let output = Command::new(env!("CARGO_BIN_EXE_sqlsift"))
        .arg("--dir")
        .arg(&dir)
        .arg("--json")
        .output()
        .expect("should run sqlsift binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let findings: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    let array = findings.as_array().expect("findings should be an array");
    assert_eq!(array.len(), 2, "got:\n{stdout}");
    assert_eq!(array[0]["function"], "GetUser");
    assert_eq!(array[0]["kind"], "sql_injection");
    assert_eq!(array[1]["kind"], "select_asterisk");
}
