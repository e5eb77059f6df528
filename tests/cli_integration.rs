//! Integration tests for the OpVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! The vault password is supplied through `OPVAULT_PASSWORD`, and a
//! `.opvault.toml` with a low iteration count keeps key derivation fast.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "integration-password";

/// Helper: get a Command pointing at the opvault binary.
fn opvault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("opvault").expect("binary should exist")
}

/// Helper: a project dir with a fast-KDF config and the password set.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".opvault.toml")
        .write_str("pbkdf2_iterations = 10\n")
        .unwrap();
    tmp
}

fn opvault_in(dir: &TempDir) -> Command {
    let mut cmd = opvault();
    cmd.current_dir(dir.path()).env("OPVAULT_PASSWORD", PASSWORD);
    cmd
}

/// Pull the 32-character uuid out of `add`/`note` output.
fn uuid_from(output: &[u8]) -> String {
    let text = String::from_utf8_lossy(output);
    let start = text.find('(').expect("uuid in output") + 1;
    text[start..start + 32].to_string()
}

#[test]
fn help_flag_shows_usage() {
    opvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Password vault with opdata01 envelopes",
        ))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("note"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn version_flag_shows_version() {
    opvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("opvault"));
}

#[test]
fn no_args_shows_help() {
    opvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn generate_needs_no_vault() {
    let tmp = project();

    opvault_in(&tmp)
        .args(["generate", "--length", "24", "--digits", "4", "--symbols", "0"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[A-Za-z0-9]{24}\n$").unwrap());
}

#[test]
fn list_on_missing_vault_fails() {
    let tmp = project();

    opvault_in(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vault not found"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = project();

    opvault()
        .current_dir(tmp.path())
        .env("OPVAULT_PASSWORD", "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8 characters"));
}

#[test]
fn init_twice_fails() {
    let tmp = project();

    opvault_in(&tmp).arg("init").assert().success();
    tmp.child("vault.opvault").assert(predicate::path::exists());

    opvault_in(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_list_show_flow() {
    let tmp = project();
    opvault_in(&tmp).arg("init").assert().success();

    let added = opvault_in(&tmp)
        .args(["add", "Example Mail", "-u", "alice", "-p", "hunter22"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let uuid = uuid_from(&added);

    opvault_in(&tmp)
        .args(["note", "Wifi", "network password is on the fridge"])
        .assert()
        .success();

    opvault_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 item(s)"))
        .stdout(predicate::str::contains("Example Mail"))
        .stdout(predicate::str::contains("Wifi"));

    opvault_in(&tmp)
        .args(["show", &uuid[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("hunter22").not());

    opvault_in(&tmp)
        .args(["show", &uuid, "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter22"));

    opvault_in(&tmp)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 2 item(s) verified"));
}

#[test]
fn wrong_password_fails() {
    let tmp = project();
    opvault_in(&tmp).arg("init").assert().success();

    opvault()
        .current_dir(tmp.path())
        .env("OPVAULT_PASSWORD", "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));
}

#[test]
fn vault_flag_selects_another_file() {
    let tmp = project();

    opvault_in(&tmp)
        .args(["init", "--vault", "personal.opvault"])
        .assert()
        .success();

    tmp.child("personal.opvault").assert(predicate::path::exists());
    tmp.child("vault.opvault").assert(predicate::path::missing());

    opvault_in(&tmp)
        .args(["list", "--vault", "personal.opvault"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 item(s)"));
}

#[test]
fn tampered_item_fails_verify_and_show() {
    let tmp = project();
    opvault_in(&tmp).arg("init").assert().success();

    let added = opvault_in(&tmp)
        .args(["add", "Bank", "-p", "pw123456"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let uuid = uuid_from(&added);

    let vault = tmp.child("vault.opvault");
    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(vault.path()).unwrap()).unwrap();
    value["items"][0]["updated"] = serde_json::json!(1);
    std::fs::write(vault.path(), value.to_string()).unwrap();

    opvault_in(&tmp)
        .arg("verify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Integrity check failed"));

    opvault_in(&tmp)
        .args(["show", &uuid])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Integrity check failed"));
}
