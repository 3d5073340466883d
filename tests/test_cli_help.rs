use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_query_options() {
    let mut cmd = Command::cargo_bin("gatewatch").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--key"))
        .stdout(predicate::str::contains("--terminal"))
        .stdout(predicate::str::contains("--gate"))
        .stdout(predicate::str::contains("--family"))
        .stdout(predicate::str::contains("--raw-key"))
        .stdout(predicate::str::contains("--json"));
}
