use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pagemark(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pagemark").unwrap();
    cmd.env("PAGEMARK_CONFIG_DIR", root.join("config"))
        .env("PAGEMARK_SHARED_DIR", root.join("sync"))
        .env("PAGEMARK_DEVICE_ID", "ci")
        .env("NO_COLOR", "1")
        .env_remove("PAGEMARK_POSITION_CAPACITY")
        .env_remove("PAGEMARK_FOLDER_CAPACITY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn record_then_read_position() {
    let temp = TempDir::new().unwrap();

    pagemark(temp.path())
        .args(["record", "/docs/manual.pdf", "42"])
        .assert()
        .success();

    pagemark(temp.path())
        .args(["position", "/docs/manual.pdf"])
        .assert()
        .success()
        .stdout("42\n");

    assert!(temp.path().join("sync/shared_settings.json").exists());
    assert!(temp.path().join("config/settings_ci.json").exists());
}

#[test]
fn unknown_document_reads_zero() {
    let temp = TempDir::new().unwrap();

    pagemark(temp.path())
        .args(["position", "/never/opened.pdf"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn negative_page_is_an_error_and_writes_nothing() {
    let temp = TempDir::new().unwrap();

    pagemark(temp.path())
        .args(["record", "/a.pdf", "-1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid argument"));

    assert!(!temp.path().join("sync/shared_settings.json").exists());
}

#[test]
fn folders_are_listed_most_recent_first() {
    let temp = TempDir::new().unwrap();
    for folder in ["/a", "/b", "/a"] {
        pagemark(temp.path()).args(["folder", folder]).assert().success();
    }

    let output = pagemark(temp.path()).arg("folders").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let listed: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();

    assert_eq!(listed, vec!["/a", "/b"]);
}

#[test]
fn get_and_set_settings() {
    let temp = TempDir::new().unwrap();

    pagemark(temp.path())
        .args(["get", "zoom_level"])
        .assert()
        .success()
        .stdout("100\n");

    pagemark(temp.path())
        .args(["set", "zoom_level", "150"])
        .assert()
        .success();
    pagemark(temp.path())
        .args(["set", "window_geometry", "cafe"])
        .assert()
        .success();

    pagemark(temp.path())
        .args(["get", "zoom_level"])
        .assert()
        .success()
        .stdout("150\n");
    pagemark(temp.path())
        .args(["get", "window_geometry"])
        .assert()
        .success()
        .stdout("cafe\n");
}

#[test]
fn invalid_settings_are_rejected() {
    let temp = TempDir::new().unwrap();

    pagemark(temp.path())
        .args(["set", "zoom_level", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    pagemark(temp.path())
        .args(["set", "stream_deck_port", "0"])
        .assert()
        .failure();
    pagemark(temp.path())
        .args(["get", "colour_scheme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}

#[test]
fn corrupt_record_warns_but_succeeds() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("sync")).unwrap();
    fs::write(temp.path().join("sync/shared_settings.json"), "{{{{").unwrap();

    pagemark(temp.path())
        .args(["position", "/a.pdf"])
        .assert()
        .success()
        .stdout("0\n")
        .stderr(predicate::str::contains("replaced by defaults"));
}

#[test]
fn show_lists_settings_and_positions() {
    let temp = TempDir::new().unwrap();
    pagemark(temp.path())
        .args(["record", "/docs/guide.pdf", "7"])
        .assert()
        .success();

    pagemark(temp.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("stream_deck_port"))
        .stdout(predicate::str::contains("8765"))
        .stdout(predicate::str::contains("/docs/guide.pdf"))
        .stdout(predicate::str::contains("p.7"));
}

#[test]
fn paths_reports_both_records() {
    let temp = TempDir::new().unwrap();

    pagemark(temp.path())
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("settings_ci.json"))
        .stdout(predicate::str::contains("shared_settings.json"));
}

#[test]
fn config_file_capacity_is_honoured() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("config")).unwrap();
    fs::write(
        temp.path().join("config/pagemark.toml"),
        "folder_capacity = 2\n",
    )
    .unwrap();

    for folder in ["/one", "/two", "/three"] {
        pagemark(temp.path()).args(["folder", folder]).assert().success();
    }

    pagemark(temp.path())
        .arg("folders")
        .assert()
        .success()
        .stdout(predicate::str::contains("/three"))
        .stdout(predicate::str::contains("/two"))
        .stdout(predicate::str::contains("/one").not());
}

#[test]
fn zero_capacity_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();

    pagemark(temp.path())
        .env("PAGEMARK_POSITION_CAPACITY", "0")
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
