//! Binary-level behaviour: arguments, operator aborts and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn release_command(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("epicsqt_release").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("EPICSQT_RELEASE_CONFIG")
        .env_remove("EPICSQT_SVN_URL");
    cmd
}

#[test]
fn test_help_shows_tag_argument() {
    let home = TempDir::new().unwrap();
    release_command(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TAG=<name>"));
}

#[test]
fn test_invalid_argument_is_rejected() {
    let home = TempDir::new().unwrap();
    release_command(&home)
        .arg("3.1.0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TAG=<name>"));
}

#[test]
fn test_answering_no_exits_cleanly() {
    let home = TempDir::new().unwrap();
    release_command(&home)
        .write_stdin("n\n")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Proceed (y/n): "))
        .stdout(predicate::str::contains(
            "Release process interrupted by the user.",
        ));
}

#[test]
fn test_closed_stdin_exits_cleanly() {
    let home = TempDir::new().unwrap();
    release_command(&home)
        .write_stdin("")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "Release process interrupted by the user.",
        ));
}

#[cfg(unix)]
#[test]
fn test_bad_configuration_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("release.toml");
    std::fs::write(&config, "repository = \"typo\"\n").unwrap();

    // Failures exit with -1
    release_command(&home)
        .env("EPICSQT_RELEASE_CONFIG", &config)
        .write_stdin("y\n")
        .assert()
        .code(255)
        .stderr(predicate::str::contains("release.toml"));
}
