//! End-to-end tests driving the dirmap binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn dirmap(config_dir: &Path, args: &[&str]) -> Output {
    let config = config_dir.join("config.yaml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    Command::new(env!("CARGO_BIN_EXE_dirmap"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn sample_project(root: &Path) {
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/dep")).unwrap();
    fs::write(root.join("package.json"), "{}").unwrap();
    fs::write(root.join("src/main.py"), "import os\n\ndef main():\n    pass\n").unwrap();
    fs::write(root.join("notes.md"), "# Notes\n").unwrap();
}

#[test]
fn test_text_report_to_file() {
    let temp = tempdir().unwrap();
    let project = temp.path().join("proj");
    sample_project(&project);
    let out_file = temp.path().join("map.txt");

    let output = dirmap(
        temp.path(),
        &[project.to_str().unwrap(), "-o", out_file.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Scanning"));
    assert!(stderr.contains("Indexed 3 files in 1 dirs"));

    let report = fs::read_to_string(&out_file).unwrap();
    assert!(report.contains("Project Type: Node.js"));
    assert!(report.contains("proj/ (Root)"));
    assert!(report.contains("main.py"));
    assert!(report.contains("def main(...):"));
    assert!(!report.contains("node_modules"));

    assert!(project.join(".dirmap_cache.json").exists());
}

#[test]
fn test_json_to_stdout() {
    let temp = tempdir().unwrap();
    let project = temp.path().join("proj");
    sample_project(&project);

    let output = dirmap(
        temp.path(),
        &[project.to_str().unwrap(), "--stdout", "-f", "json", "--no-cache"],
    );
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["project_type"], "Node.js");
    assert_eq!(value["stats"]["files"], 3);
    assert_eq!(value["stats"]["dirs"], 1);
    assert!(!project.join(".dirmap_cache.json").exists());
}

#[test]
fn test_second_run_hits_cache() {
    let temp = tempdir().unwrap();
    let project = temp.path().join("proj");
    sample_project(&project);
    let args = [project.to_str().unwrap(), "--stdout"];

    assert!(dirmap(temp.path(), &args).status.success());
    let second = dirmap(temp.path(), &args);
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("[cache: 4 hits]"), "{stderr}");

    let cleared = dirmap(
        temp.path(),
        &[project.to_str().unwrap(), "--stdout", "--clear-cache"],
    );
    let stderr = String::from_utf8_lossy(&cleared.stderr);
    assert!(stderr.contains("[cache: 0 hits]"), "{stderr}");
}

#[test]
fn test_invalid_root_fails() {
    let temp = tempdir().unwrap();
    let output = dirmap(temp.path(), &[temp.path().join("missing").to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_unwritable_output_fails() {
    let temp = tempdir().unwrap();
    let project = temp.path().join("proj");
    sample_project(&project);
    let bad = temp.path().join("no/such/dir/map.txt");

    let output = dirmap(
        temp.path(),
        &[project.to_str().unwrap(), "-o", bad.to_str().unwrap(), "--no-cache"],
    );
    assert!(!output.status.success());
}

#[test]
fn test_config_file_applies() {
    let temp = tempdir().unwrap();
    let project = temp.path().join("proj");
    sample_project(&project);
    fs::write(
        temp.path().join("config.yaml"),
        "ignore_patterns:\n  - \"*.md\"\nuse_cache: false\n",
    )
    .unwrap();

    let output = dirmap(temp.path(), &[project.to_str().unwrap(), "--stdout"]);
    let report = String::from_utf8_lossy(&output.stdout);
    assert!(!report.contains("notes.md"));
    assert!(report.contains("main.py"));
}
