//! Binary argument handling

use assert_cmd::Command;

#[test]
fn test_help_lists_commands() {
    let output = Command::cargo_bin("skin-arbitrage")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("scan"));
    assert!(stdout.contains("fetch"));
    assert!(stdout.contains("--cohort-size"));
}

#[test]
fn test_zero_cohort_size_rejected() {
    Command::cargo_bin("skin-arbitrage")
        .unwrap()
        .args(["fetch", "--ids", "ids.txt", "--cohort-size", "0"])
        .assert()
        .failure();
}

#[test]
fn test_missing_ids_file_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("skin-arbitrage")
        .unwrap()
        .current_dir(dir.path())
        .args(["fetch", "--ids", "does-not-exist.txt", "--no-progress"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_ids_file_writes_empty_outputs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ids.txt"), "# nothing yet\n").unwrap();

    Command::cargo_bin("skin-arbitrage")
        .unwrap()
        .current_dir(dir.path())
        .args(["fetch", "--ids", "ids.txt", "--output-format", "json"])
        .assert()
        .success();

    assert!(dir.path().join("outcomes.csv").exists());
    assert!(dir.path().join("youpin_prices.csv").exists());
}
