use assert_cmd::Command;

#[test]
fn prints_help() {
    let mut cmd = Command::cargo_bin("prbot").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Usage"));
}

#[test]
fn prints_version() {
    let mut cmd = Command::cargo_bin("prbot").unwrap();

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn rejects_model_with_no_model() {
    let mut cmd = Command::cargo_bin("prbot").unwrap();

    cmd.args(["--model", "claude-haiku-4.5", "--no-model"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("cannot be used with"));
}
