use assert_cmd::Command;
use std::path::PathBuf;

fn sample(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let mut path = PathBuf::from(&manifest_dir);
    path.push("samples");
    path.push(name);
    path
}

#[test]
fn run_prints_values_and_printd_output() {
    let output = Command::cargo_bin("posec")
        .expect("posec binary")
        .arg("run")
        .arg(sample("pose.pk"))
        .output()
        .expect("failed to spawn posec binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(output.status.success(), "run failed: {}", String::from_utf8_lossy(&output.stderr));

    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines, vec!["0", "1", "2", "3", "16", "55", "0", "Pose2D { 4, 2, 0 }"]);
}

#[test]
fn run_keeps_going_after_failed_items() {
    let output = Command::cargo_bin("posec")
        .expect("posec binary")
        .arg("run")
        .arg(sample("broken.pk"))
        .output()
        .expect("failed to spawn posec binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout.trim(), "42");
    assert!(stderr.contains("nothere"), "missing unknown function report: {}", stderr);
    assert!(stderr.contains("expected ')' in prototype"), "missing syntax error report: {}", stderr);
}

#[test]
fn build_writes_ir_dump_to_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("pose.ir");

    let output = Command::cargo_bin("posec")
        .expect("posec binary")
        .arg("build")
        .arg(sample("pose.pk"))
        .arg("--dump")
        .arg("ir")
        .arg("-o")
        .arg(&out)
        .output()
        .expect("failed to spawn posec binary");

    assert!(output.status.success(), "build failed: {}", String::from_utf8_lossy(&output.stderr));
    let dump = std::fs::read_to_string(&out).expect("dump written");
    assert!(dump.contains("record Pose2D { x, y, theta }"));
    assert!(dump.contains("define moved("));
    assert!(dump.contains("-> ptr<Pose2D>"));
    assert!(dump.contains("declare sin("));
    assert!(!dump.contains("anon_expr"));
}

#[test]
fn build_rejects_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("posec.json");
    std::fs::write(&config, r#"{ "operators": { "(": 5 } }"#).expect("write config");

    let output = Command::cargo_bin("posec")
        .expect("posec binary")
        .arg("build")
        .arg(sample("pose.pk"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("failed to spawn posec binary");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(stderr.contains("cannot be used as a binary operator"), "{}", stderr);
}
