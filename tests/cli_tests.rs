//! Integration tests for the planfmt CLI.
//!
//! These tests verify the binary works end-to-end.

use std::io::Write;
use std::process::{Command, Stdio};

/// Get the path to the planfmt binary
fn planfmt_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    path.push("planfmt");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

/// Run planfmt and return output
fn run_planfmt(args: &[&str]) -> std::process::Output {
    Command::new(planfmt_binary())
        .args(args)
        .output()
        .expect("Failed to execute planfmt")
}

/// Run planfmt with the given stdin and return output
fn run_planfmt_with_stdin(args: &[&str], input: &str) -> std::process::Output {
    let mut child = Command::new(planfmt_binary())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn planfmt");

    child
        .stdin
        .as_mut()
        .expect("stdin not piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for planfmt")
}

fn sample_plan() -> &'static str {
    r#"{
        "resource_changes": [{
            "address": "aws_instance.web",
            "mode": "managed",
            "type": "aws_instance",
            "name": "web",
            "provider_name": "aws",
            "change": {
                "actions": ["create"],
                "before": null,
                "after": {"id": "i-12345", "size": 2}
            }
        }],
        "provider_schemas": {
            "aws": {
                "resource_schemas": {
                    "aws_instance": {
                        "block": {
                            "attributes": {
                                "id": {"type": "string"},
                                "size": {"type": "number"}
                            }
                        }
                    }
                }
            }
        }
    }"#
}

#[test]
fn test_planfmt_version() {
    let output = run_planfmt(&["--version"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("planfmt"));
}

#[test]
fn test_planfmt_help() {
    let output = run_planfmt(&["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("render"));
    assert!(stdout.contains("stream"));
}

#[test]
fn test_render_plan_file() {
    let dir = std::env::temp_dir().join("planfmt-cli-tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("plan.json");
    std::fs::write(&path, sample_plan()).unwrap();

    let output = run_planfmt(&["render", path.to_str().unwrap(), "--no-color"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# aws_instance.web will be created"));
    assert!(stdout.contains("+ resource \"aws_instance\" \"web\" {"));
    assert!(stdout.contains("+ id   = \"i-12345\""));
    assert!(stdout.contains("+ size = 2"));
    assert!(stdout.contains("Plan: 1 to add, 0 to change, 0 to destroy."));
}

#[test]
fn test_render_missing_file_fails() {
    let output = run_planfmt(&["render", "/nonexistent/plan.json"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read plan file"));
}

#[test]
fn test_stream_passes_plain_lines_through() {
    let output = run_planfmt_with_stdin(&["stream", "--no-color"], "hello\nworld\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hello"));
    assert!(stdout.contains("world"));
}

#[test]
fn test_stream_defers_logs_after_plan_start() {
    let input = concat!(
        r#"{"type": "version", "@message": "starting"}"#,
        "\n",
        r#"{"type": "planned_change"}"#,
        "\n",
        r#"{"type": "change_summary", "@message": "summary line"}"#,
        "\n",
    );
    let output = run_planfmt_with_stdin(&["stream", "--no-color"], input);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let starting = stdout.find("starting").expect("version log missing");
    let summary = stdout.find("summary line").expect("deferred log missing");
    assert!(starting < summary);
}
