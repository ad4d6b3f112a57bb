use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bkt(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bkt").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_top_level_commands() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("team"))
        .stdout(predicate::str::contains("repo"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_is_printed() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn create_rejects_unknown_fork_policy() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["repo", "create", "widgets", "--fork-policy", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid fork policy"));
}

#[test]
fn create_rejects_unknown_language() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["repo", "create", "widgets", "--language", "klingon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid language"));
}

#[test]
fn update_rejects_private_with_public() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["repo", "update", "widgets", "--private", "--public"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn team_list_rejects_unknown_role() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["team", "list", "--role", "owner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid team role"));
}

#[test]
fn config_get_prints_default_api_url() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["config", "get", "api-url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://api.bitbucket.org/2.0/"));
}

#[test]
fn config_set_rejects_unknown_session_store() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["config", "set", "session-store", "vault"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid session store"));
}

#[test]
fn config_set_then_get_round_trips() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["config", "set", "session-store", "file"])
        .assert()
        .success();

    bkt(&home)
        .args(["config", "get", "session-store"])
        .assert()
        .success()
        .stdout(predicate::str::contains("file"));
}

#[test]
fn repo_list_without_session_asks_to_log_in() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["config", "set", "session-store", "file"])
        .assert()
        .success();

    bkt(&home)
        .args(["repo", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[cfg(target_os = "linux")]
#[test]
fn logout_recovers_from_unreadable_session() {
    let home = TempDir::new().unwrap();
    bkt(&home)
        .args(["config", "set", "session-store", "file"])
        .assert()
        .success();

    let session_file = home.path().join(".config/bucket-rs/session.json");
    std::fs::write(
        &session_file,
        r#"{"auth_type":"basic","credential":"amRvZTpwdw==","display_name":"Jane Doe","username":"jdoe","created_at":"2024-01-01T00:00:00Z","version":2}"#,
    )
    .unwrap();

    bkt(&home)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not currently authenticated"))
        .stderr(predicate::str::contains("ignoring saved session"));

    assert!(!session_file.exists());
}
