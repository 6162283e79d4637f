use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

const BIN_NAME: &str = "ledgerdash";

const FOOD: &str = "6f1c0d0e-1a2b-4c3d-8e9f-000000000001";
const GROCERIES: &str = "6f1c0d0e-1a2b-4c3d-8e9f-000000000002";
const SALARY: &str = "6f1c0d0e-1a2b-4c3d-8e9f-000000000003";
const USER: &str = "6f1c0d0e-1a2b-4c3d-8e9f-0000000000ff";

fn command(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("LEDGERDASH_DATA_DIR", home);
    cmd.env_remove("LEDGERDASH_LOG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn seed_store(home: &Path) {
    let data_dir = home.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    let store = json!({
        "tables": {
            "categories": [
                {"id": FOOD, "name": "Food", "type": "expense", "color": "#ff8800", "icon": "utensils", "parent_id": null},
                {"id": GROCERIES, "name": "Groceries", "type": "expense", "color": "", "icon": "", "parent_id": FOOD},
                {"id": SALARY, "name": "Salary", "type": "income", "color": "", "icon": "", "parent_id": null}
            ],
            "budget_limits": [
                {"id": "6f1c0d0e-1a2b-4c3d-8e9f-0000000000a1", "user_id": USER, "category_id": FOOD, "amount": 500.0, "month": "2025-03-01"}
            ],
            "transactions": [
                {"id": "6f1c0d0e-1a2b-4c3d-8e9f-0000000000b1", "type": "expense", "amount": 300.5,
                 "date": "2025-03-10", "due_date": "2025-03-10", "status": "paid", "description": "Market",
                 "category_id": GROCERIES, "account_id": null, "credit_card_id": null,
                 "transfer_id": null, "investment_id": null},
                {"id": "6f1c0d0e-1a2b-4c3d-8e9f-0000000000b2", "type": "income", "amount": 3000.0,
                 "date": "2025-03-05", "due_date": "2025-03-05", "status": "paid", "description": "Pay",
                 "category_id": SALARY, "account_id": null, "credit_card_id": null,
                 "transfer_id": null, "investment_id": null}
            ]
        }
    });
    fs::write(data_dir.join("store.json"), store.to_string()).unwrap();
}

fn initialized_home() -> TempDir {
    let home = TempDir::new().unwrap();
    command(home.path()).arg("init").assert().success();
    home
}

#[test]
fn init_creates_settings_and_signs_in() {
    let home = TempDir::new().unwrap();
    command(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized ledgerdash").and(contains("Signed in as")));

    assert!(home.path().join("config.json").exists());
    command(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("Accounting mode: accrual").and(contains("(nobody)").not()));
}

#[test]
fn category_add_and_list_tree() {
    let home = initialized_home();
    command(home.path())
        .args(["category", "add", "Housing"])
        .assert()
        .success()
        .stdout(contains("Created category 'Housing'"));
    command(home.path())
        .args(["category", "add", "Rent", "--parent", "Housing"])
        .assert()
        .success()
        .stdout(contains("under 'Housing'"));

    command(home.path())
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(contains("Housing").and(contains("Rent")));
}

#[test]
fn category_add_rejects_grandchild() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path())
        .args(["category", "add", "Organic", "--parent", "Groceries"])
        .assert()
        .failure();
}

#[test]
fn budget_show_renders_rollup_table() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path())
        .args(["budget", "show", "2025-03"])
        .assert()
        .success()
        .stdout(
            contains("Budget 2025-03 (accrual basis)")
                .and(contains("Food"))
                .and(contains("Groceries"))
                .and(contains("$500.00"))
                .and(contains("$300.50")),
        );
}

#[test]
fn budget_show_exports_csv() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path())
        .args(["budget", "show", "2025-03", "--format", "csv"])
        .assert()
        .success()
        .stdout(contains("2025-03,accrual,parent,,Food,500.00,300.50,60"));
}

#[test]
fn budget_show_exports_json() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path())
        .args(["budget", "show", "2025-03", "-f", "json"])
        .assert()
        .success()
        .stdout(contains("\"schema_version\"").and(contains("\"Food\"")));
}

#[test]
fn budget_set_updates_limit() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path()).args(["login", USER]).assert().success();
    command(home.path())
        .args(["budget", "set", "Food", "600", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(contains("Budget for 'Food' in 2025-03 set to $600.00"));

    command(home.path())
        .args(["budget", "show", "2025-03", "-f", "csv"])
        .assert()
        .success()
        .stdout(contains("Food,600.00,300.50,50"));
}

#[test]
fn budget_set_requires_sign_in() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path()).arg("logout").assert().success();
    command(home.path())
        .args(["budget", "set", "Food", "600", "--period", "2025-03"])
        .assert()
        .failure()
        .stderr(contains("sign"));
}

#[test]
fn budget_set_rejects_year_scope() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path())
        .args(["budget", "set", "Food", "600", "--period", "2025"])
        .assert()
        .failure();
}

#[test]
fn dashboard_summarizes_month() {
    let home = initialized_home();
    seed_store(home.path());
    command(home.path())
        .args(["dashboard", "--date", "2025-03-15"])
        .assert()
        .success()
        .stdout(
            contains("Dashboard for 2025-03-15")
                .and(contains("$3,000.00").or(contains("$3000.00")))
                .and(contains("No investments")),
        );
}

#[test]
fn dashboard_rejects_csv() {
    let home = initialized_home();
    command(home.path())
        .args(["dashboard", "--format", "csv"])
        .assert()
        .failure();
}
