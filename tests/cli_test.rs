//! Command-line interface tests
//!
//! Uses `--dry-run` with a fixed date so the printed invocation is stable.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const TEST_DATE: &str = "Thu, 17 Nov 2005 18:49:58 GMT";

fn s3curl() -> Command {
    let mut cmd = Command::cargo_bin("s3curl").unwrap();
    cmd.env_remove("AWS_ACCESS_KEY_ID")
        .env_remove("AWS_SECRET_ACCESS_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_dry_run_get_prints_signed_invocation() {
    s3curl()
        .args([
            "--access-key",
            "AKIDEXAMPLE",
            "--secret-key",
            "secret",
            "--date",
            TEST_DATE,
            "--dry-run",
            "get",
            "/mybucket/photos/puppy.jpg",
            "puppy.jpg",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "curl -H 'Date: Thu, 17 Nov 2005 18:49:58 GMT' \
             -H 'Authorization: AWS AKIDEXAMPLE:0zys/bIONblPamdgQVUmKg9/uMM=' \
             -H 'content-type: ' -L -f \
             https://s3.amazonaws.com/mybucket/photos/puppy.jpg -o puppy.jpg\n",
        ));
}

#[test]
fn test_dry_run_reads_credentials_from_env() {
    s3curl()
        .env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")
        .env("AWS_SECRET_ACCESS_KEY", "secret")
        .args(["--date", TEST_DATE, "--dry-run", "delete", "/mybucket/photos/puppy.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "AWS AKIDEXAMPLE:wPGYuzJ7tYna1eI2e/ivWtyBT2s=",
        ))
        .stdout(predicate::str::ends_with("-X DELETE\n"));
}

#[test]
fn test_dry_run_json_upload_to_directory() {
    let output = s3curl()
        .args([
            "--access-key",
            "AKIDEXAMPLE",
            "--secret-key",
            "secret",
            "--date",
            TEST_DATE,
            "--dry-run",
            "--json",
            "put",
            "/mybucket/releases/",
            "/tmp/dir/app.tgz",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["operation"], "upload");
    assert_eq!(plan["method"], "PUT");
    assert_eq!(plan["resource"], "/mybucket/releases/app.tgz");
    assert_eq!(
        plan["authorization"],
        "AWS AKIDEXAMPLE:HT0AYivwznnxUTZhwqTDNSHA2L4="
    );
}

#[test]
fn test_config_file_supplies_endpoint_and_credentials() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "endpoint: \"http://localhost:9000\"\ncredentials:\n  access_key: \"AKIDEXAMPLE\"\n  secret_key: \"secret\"\ntransport:\n  binary: \"/opt/curl/bin/curl\""
    )
    .unwrap();

    s3curl()
        .arg("--config")
        .arg(file.path())
        .args(["--date", TEST_DATE, "--dry-run", "delete", "/mybucket/photos/puppy.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/opt/curl/bin/curl "))
        .stdout(predicate::str::contains(
            "http://localhost:9000/mybucket/photos/puppy.jpg",
        ));
}

#[test]
fn test_access_key_flag_layers_over_config_file_secret() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "credentials:\n  access_key: \"FILEKEY\"\n  secret_key: \"secret\""
    )
    .unwrap();

    s3curl()
        .arg("--config")
        .arg(file.path())
        .args(["--access-key", "AKIDEXAMPLE"])
        .args(["--date", TEST_DATE, "--dry-run", "delete", "/mybucket/photos/puppy.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "AWS AKIDEXAMPLE:wPGYuzJ7tYna1eI2e/ivWtyBT2s=",
        ));
}

#[test]
fn test_empty_date_fails() {
    s3curl()
        .args([
            "--access-key",
            "AKIDEXAMPLE",
            "--secret-key",
            "secret",
            "--date",
            "",
            "--dry-run",
            "delete",
            "/b/k",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fixed date"));
}

#[test]
fn test_get_without_local_file_fails() {
    s3curl()
        .args([
            "--access-key",
            "AKIDEXAMPLE",
            "--secret-key",
            "secret",
            "--dry-run",
            "get",
            "/mybucket/photos/puppy.jpg",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("local_file"));
}

#[test]
fn test_missing_secret_key_fails() {
    s3curl()
        .args(["--access-key", "AKIDEXAMPLE", "--dry-run", "delete", "/b/k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret_key"));
}

#[test]
fn test_missing_transport_binary_fails() {
    s3curl()
        .args([
            "--access-key",
            "AKIDEXAMPLE",
            "--secret-key",
            "secret",
            "--curl",
            "s3curl-definitely-not-installed",
            "delete",
            "/b/k",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[cfg(unix)]
#[test]
fn test_transport_exit_code_is_forwarded() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let script = dir.path().join("curl-403");
    std::fs::write(&script, "#!/bin/sh\nexit 22\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    s3curl()
        .args(["--access-key", "AKIDEXAMPLE", "--secret-key", "secret", "--curl"])
        .arg(&script)
        .args(["delete", "/b/k"])
        .assert()
        .code(22);
}
