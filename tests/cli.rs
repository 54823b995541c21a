use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn envelope(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("envelope").unwrap();
    cmd.env("ENVELOPE_LEDGER_DATA_DIR", temp.path())
        .env_remove("ENVELOPE_HOUSEHOLD")
        .env_remove("RUST_LOG");
    cmd
}

fn run(temp: &TempDir, args: &[&str]) {
    envelope(temp).args(args).assert().success();
}

fn setup_household(temp: &TempDir) {
    run(temp, &["init"]);
    run(temp, &["household", "create", "Home"]);
    run(temp, &["household", "add-section", "Bills"]);
    run(temp, &["household", "add-category", "Bills", "Rent"]);
    run(temp, &["household", "add-category", "Bills", "Groceries"]);
    run(temp, &["month", "open", "2026-01"]);
}

#[test]
fn init_writes_settings() {
    let temp = TempDir::new().unwrap();
    envelope(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete"));
    assert!(temp.path().join("config.json").exists());
}

#[test]
fn assign_from_opening_balance() {
    let temp = TempDir::new().unwrap();
    setup_household(&temp);
    run(&temp, &["funding", "balance", "6000", "--as-of", "2026-01-01"]);

    envelope(&temp)
        .args(["budget", "assign", "Rent", "500", "--month", "2026-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("To be assigned: $5500.00"));

    envelope(&temp)
        .args(["budget", "assign", "Groceries", "6000", "--month", "2026-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient funds"));

    envelope(&temp)
        .args(["funding", "available"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$5500.00"));
}

#[test]
fn transfer_and_show() {
    let temp = TempDir::new().unwrap();
    setup_household(&temp);
    run(&temp, &["funding", "income", "1000", "--date", "2026-01-02", "--payee", "Employer"]);
    run(&temp, &["budget", "assign", "Rent", "400", "--month", "2026-01"]);
    run(&temp, &["budget", "transfer", "Rent", "Groceries", "150", "--month", "2026-01"]);

    envelope(&temp)
        .args(["budget", "show", "--month", "2026-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rent"))
        .stdout(predicate::str::contains("$250.00"))
        .stdout(predicate::str::contains("$150.00"))
        .stdout(predicate::str::contains("To be assigned: $600.00"));
}

#[test]
fn closed_month_rejects_assignment() {
    let temp = TempDir::new().unwrap();
    setup_household(&temp);
    run(&temp, &["funding", "balance", "100"]);
    run(&temp, &["month", "close", "2026-01"]);

    envelope(&temp)
        .args(["budget", "assign", "Rent", "10", "--month", "2026-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("closed"));
}

#[test]
fn several_households_need_a_choice() {
    let temp = TempDir::new().unwrap();
    run(&temp, &["household", "create", "Home"]);
    run(&temp, &["household", "create", "Cabin"]);

    envelope(&temp)
        .args(["month", "open", "2026-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--household"));

    envelope(&temp)
        .args(["--household", "Cabin", "month", "open", "2026-01"])
        .assert()
        .success();
}

#[test]
fn audit_lists_recent_changes() {
    let temp = TempDir::new().unwrap();
    setup_household(&temp);

    envelope(&temp)
        .args(["audit", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE"));
}
