//! End-to-end CLI tests: invokes the built `dlogcover` binary against a
//! real temp project tree, the way a user would from a shell.

use assert_cmd::Command;
use indoc::indoc;
use std::fs;
use tempfile::TempDir;

fn write_project(dir: &TempDir, source: &str) -> std::path::PathBuf {
    let src = dir.path().join("main.cpp");
    fs::write(&src, source).unwrap();
    src
}

#[test]
fn analyze_single_logged_function_reports_full_coverage_json() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        indoc! {r#"
            void f(){ qDebug() << "x"; }
        "#},
    );

    let mut cmd = Command::cargo_bin("dlogcover").unwrap();
    cmd.arg("analyze")
        .arg(dir.path())
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(report["overall_ratio"].as_f64(), Some(1.0));
    assert_eq!(report["files"].as_array().unwrap().len(), 1);
}

#[test]
fn analyze_empty_directory_fails_with_no_source_files_exit_code() {
    let dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("dlogcover").unwrap();
    cmd.arg("analyze").arg(dir.path());

    cmd.assert().code(2);
}

#[test]
fn analyze_if_else_only_then_branch_logs_reports_partial_branch_coverage() {
    let dir = TempDir::new().unwrap();
    write_project(
        &dir,
        indoc! {r#"
            void f(int x){ if(x>0){ qInfo() << "pos"; } else { return; } }
        "#},
    );

    let mut cmd = Command::cargo_bin("dlogcover").unwrap();
    cmd.arg("analyze")
        .arg(dir.path())
        .arg("--format")
        .arg("json")
        .arg("-o")
        .arg(dir.path().join("report.json"));

    cmd.assert().success();

    let contents = fs::read_to_string(dir.path().join("report.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let branch = &report["files"][0]["stats"]["branch"];
    assert_eq!(branch["total"].as_u64(), Some(2));
    assert_eq!(branch["covered"].as_u64(), Some(1));
}

#[test]
fn analyze_text_format_includes_overall_percentage_header() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, "void f(){ qDebug() << \"x\"; }\n");

    let mut cmd = Command::cargo_bin("dlogcover").unwrap();
    cmd.arg("analyze").arg(dir.path());

    let output = cmd.assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Overall coverage"));
}
