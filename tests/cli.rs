use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cadence(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cadence").unwrap();
    cmd.env("HOME", home.path())
        .arg("--data-dir")
        .arg(home.path().join("data"));
    cmd
}

fn add_cleaner(home: &TempDir) -> String {
    let output = cadence(home)
        .args([
            "expense", "add",
            "--profile", "p1",
            "--description", "Cleaner",
            "--amount", "80",
            "--frequency", "weekly",
            "--start", "2024-01-01",
            "--end", "2024-01-22",
            "--category", "home",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Generated 4 expense record(s)"), "unexpected output: {stdout}");
    stdout
        .lines()
        .find_map(|l| l.strip_prefix("Added expense template "))
        .unwrap()
        .trim()
        .to_string()
}

#[test]
fn init_creates_database() {
    let home = TempDir::new().unwrap();
    cadence(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized cadence"));
    assert!(home.path().join("data").join("cadence.db").exists());
}

#[test]
fn add_generates_and_run_is_idempotent() {
    let home = TempDir::new().unwrap();
    add_cleaner(&home);

    cadence(&home)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("expense: 1 template(s), 0 record(s) created"));

    cadence(&home)
        .args(["transactions", "--profile", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 row(s)"))
        .stdout(predicate::str::contains("2024-01-22"));
}

#[test]
fn rejects_invalid_templates() {
    let home = TempDir::new().unwrap();
    cadence(&home)
        .args([
            "expense", "add",
            "--profile", "p1",
            "--description", "Refund",
            "--amount", "-5",
            "--frequency", "monthly",
            "--start", "2024-01-01",
            "--category", "misc",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Amount must be positive"));

    cadence(&home)
        .args([
            "income", "add",
            "--profile", "p1",
            "--description", "Bonus",
            "--amount", "500",
            "--frequency", "one-time",
            "--start", "2024-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid template"));

    cadence(&home)
        .args(["income", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No income templates."));
}

#[test]
fn deactivate_and_list() {
    let home = TempDir::new().unwrap();
    let id = add_cleaner(&home);

    cadence(&home)
        .args(["expense", "deactivate", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deactivated expense template"));

    cadence(&home)
        .args(["expense", "deactivate", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("already inactive"));

    cadence(&home)
        .args(["expense", "list", "--active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expense templates."));

    cadence(&home)
        .args(["expense", "list", "--profile", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));
}

#[test]
fn unknown_template_is_an_error() {
    let home = TempDir::new().unwrap();
    cadence(&home)
        .args(["income", "generate", "recurring_missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown template: recurring_missing"));
}
