use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

const SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

fn sample(uri: Option<&str>) -> Value {
    let artifact_location = match uri {
        Some(uri) => json!({"uri": uri}),
        None => json!({}),
    };
    json!({
        "$schema": SCHEMA,
        "version": "2.1.0",
        "runs": [{
            "tool": {"driver": {"name": "x", "semanticVersion": "1.0"}},
            "results": [{
                "ruleId": "R1",
                "message": {"text": "finding"},
                "locations": [{"physicalLocation": {"artifactLocation": artifact_location}}],
            }],
        }],
    })
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).expect("serialize")).expect("write SARIF");
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read SARIF")).expect("parse SARIF")
}

fn rebase(root: &Path, working: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sarif-rebase"))
        .arg("--root")
        .arg(root)
        .arg("--working")
        .arg(working)
        .args(args)
        .current_dir(root)
        .output()
        .expect("run sarif-rebase")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "sarif-rebase failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn rewrites_single_file_into_output() {
    let root = tempfile::tempdir().expect("create root dir");
    let working = root.path().join("sub").join("dir");
    fs::create_dir_all(&working).expect("create working dir");
    write_json(&working.join("results.sarif"), &sample(Some("src/a.py")));

    let output = rebase(
        root.path(),
        &working,
        &["-s", "sub/dir/results.sarif", "-o", "rebased.sarif"],
    );

    assert_success(&output);
    let rebased = read_json(&root.path().join("rebased.sarif"));
    assert_eq!(rebased, sample(Some("sub/dir/src/a.py")));
    assert_eq!(
        read_json(&working.join("results.sarif")),
        sample(Some("src/a.py"))
    );
}

#[test]
fn writes_to_stdout_when_output_is_dash() {
    let root = tempfile::tempdir().expect("create root dir");
    let working = root.path().join("app");
    fs::create_dir_all(&working).expect("create working dir");
    write_json(&working.join("results.sarif"), &sample(Some("main.py")));

    let output = rebase(
        root.path(),
        &working,
        &["--sarif", "app/results.sarif", "--output", "-"],
    );

    assert_success(&output);
    let printed: Value = serde_json::from_slice(&output.stdout).expect("parse stdout");
    assert_eq!(printed, sample(Some("app/main.py")));
}

#[test]
fn result_without_uri_is_kept_unless_clearing_empty_runs() {
    let root = tempfile::tempdir().expect("create root dir");
    let working = root.path().join("app");
    fs::create_dir_all(&working).expect("create working dir");
    write_json(&working.join("results.sarif"), &sample(None));

    let kept = rebase(
        root.path(),
        &working,
        &["--sarif", "app/results.sarif", "--output", "kept.sarif"],
    );
    let cleared = rebase(
        root.path(),
        &working,
        &[
            "--sarif",
            "app/results.sarif",
            "--output",
            "cleared.sarif",
            "--clear-empty-runs",
        ],
    );

    assert_success(&kept);
    assert_success(&cleared);
    assert_eq!(read_json(&root.path().join("kept.sarif")), sample(None));
    assert_eq!(
        read_json(&root.path().join("cleared.sarif"))["runs"][0]["results"],
        json!([])
    );
}

#[test]
fn directory_batch_continues_past_bad_files() {
    let root = tempfile::tempdir().expect("create root dir");
    let working = root.path().join("scanner");
    let reports = working.join("reports");
    fs::create_dir_all(&reports).expect("create reports dir");
    write_json(&reports.join("a.sarif"), &sample(Some("a.py")));
    fs::write(reports.join("b.json"), "{ truncated").expect("write broken report");
    write_json(&reports.join("c.json"), &sample(Some("c.py")));
    fs::write(reports.join("readme.md"), "# reports").expect("write readme");

    let output = rebase(
        root.path(),
        &working,
        &["--sarif", "scanner/reports", "--output", "rebased"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let failure_lines: Vec<&str> = stderr
        .lines()
        .filter(|line| line.contains("failed to rebase"))
        .collect();
    assert_eq!(failure_lines.len(), 1, "stderr: {stderr}");
    assert!(failure_lines[0].contains("b.json"), "stderr: {stderr}");
    let rebased = root.path().join("rebased");
    assert_eq!(read_json(&rebased.join("a.sarif")), sample(Some("scanner/a.py")));
    assert_eq!(read_json(&rebased.join("c.json")), sample(Some("scanner/c.py")));
    assert!(!rebased.join("b.json").exists());
    assert!(!rebased.join("readme.md").exists());
}

#[test]
fn non_sarif_input_is_rejected_without_writing() {
    let root = tempfile::tempdir().expect("create root dir");
    let working = root.path().join("app");
    fs::create_dir_all(&working).expect("create working dir");
    write_json(&working.join("package.json"), &json!({"name": "app"}));

    let output = rebase(
        root.path(),
        &working,
        &["--sarif", "app/package.json", "--output", "out.json"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a SARIF file"), "stderr: {stderr}");
    assert!(!root.path().join("out.json").exists());
}

#[test]
fn stdout_output_is_rejected_for_directories() {
    let root = tempfile::tempdir().expect("create root dir");
    let working = root.path().join("scanner");
    let reports = working.join("reports");
    fs::create_dir_all(&reports).expect("create reports dir");
    write_json(&reports.join("a.sarif"), &sample(Some("a.py")));

    let output = rebase(
        root.path(),
        &working,
        &["--sarif", "scanner/reports", "--output", "-"],
    );

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!root.path().join("-").exists());
    assert_eq!(read_json(&reports.join("a.sarif")), sample(Some("a.py")));
}
