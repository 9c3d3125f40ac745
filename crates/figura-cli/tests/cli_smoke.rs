use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(rel: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(rel);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("figura-cli"))
}

#[test]
fn render_prints_svg() {
    let output = cli()
        .args(["render", fixture("specs/optics_convex.json").to_string_lossy().as_ref()])
        .output()
        .expect("run figura-cli");
    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("image-real"));
}

#[test]
fn render_writes_png_next_to_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("triangle.json");
    fs::copy(fixture("specs/geometry_right_triangle.json"), &input).expect("copy fixture");

    cli()
        .args(["render", "--format", "png", input.to_string_lossy().as_ref()])
        .assert()
        .success();

    let bytes = fs::read(input.with_extension("png")).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
}

#[test]
fn render_of_missing_data_fails_with_placeholder() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("empty.json");
    fs::write(&input, r#"{"type": "circuit", "data": {"components": []}}"#).unwrap();

    let output = cli()
        .args(["render", input.to_string_lossy().as_ref()])
        .output()
        .expect("run figura-cli");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("figura-error"));
}

#[test]
fn batch_writes_rendered_containers() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out.json");
    cli()
        .args([
            "batch",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("specs/batch.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let items = value.as_array().expect("array output");
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|c| c["rendered"] == serde_json::json!(true)));
}

#[test]
fn batch_html_is_idempotent() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let first = tmp.path().join("first.html");
    let second = tmp.path().join("second.html");
    cli()
        .args([
            "batch",
            "--html",
            "--out",
            first.to_string_lossy().as_ref(),
            fixture("html/lesson.html").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    cli()
        .args([
            "batch",
            "--html",
            "--out",
            second.to_string_lossy().as_ref(),
            first.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn check_reports_the_domain() {
    let output = cli()
        .args(["check", fixture("specs/function_tan.json").to_string_lossy().as_ref()])
        .output()
        .expect("run figura-cli");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "function");
}

#[test]
fn eval_prints_one_value_per_argument() {
    let output = cli()
        .args(["eval", "2x + 1", "0", "-1.5", "3"])
        .output()
        .expect("run figura-cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["1", "-2", "7"]);

    let output = cli()
        .args(["eval", "ln(x)", "-1"])
        .output()
        .expect("run figura-cli");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "NaN");
}

#[test]
fn unknown_command_is_a_usage_error() {
    let output = cli().arg("draw").output().expect("run figura-cli");
    assert_eq!(output.status.code(), Some(2));
}
