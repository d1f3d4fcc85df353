use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

#[test]
fn cli_help_lists_publish_command() {
    let mut cmd = Command::cargo_bin("static-hosting").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn publish_with_missing_config_file_fails() {
    let mut cmd = Command::cargo_bin("static-hosting").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg("/definitely/not/a/config.yaml")
        .arg("--url")
        .arg("https://example.com");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn publish_with_invalid_yaml_fails_with_parse_error() {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), b"publish: [:::").expect("Writing temp config failed");

    let mut cmd = Command::cargo_bin("static-hosting").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .arg("--url")
        .arg("https://example.com");
    cmd.assert().failure().stderr(
        predicate::str::contains("parse").or(predicate::str::contains("YAML")),
    );
}

#[test]
fn publish_without_a_url_on_closed_stdin_fails() {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"publish:\n  bucket: test-bucket-001\n  region: us-east-1\n",
    )
    .expect("Writing temp config failed");

    let mut cmd = Command::cargo_bin("static-hosting").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .write_stdin("");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("URL"));
}
