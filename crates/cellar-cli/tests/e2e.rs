//! End-to-end lifecycle tests for the `cellar` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_CSV: &str = "\
Wine,Producer,Country,Region,Colour,Vintage,Size,Price,Quantity,Tags
Grange,Penfolds,Australia,Barossa Valley,red,2016,750,950.00,1,icon;gift
Meursault,Domaine Roulot,France,Burgundy,white,2020,750,180.50,2,
";

fn cellar(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cellar").expect("binary built");
    cmd.arg("--dir").arg(dir.path());
    cmd
}

#[test]
fn init_writes_config_and_database() {
    let dir = tempfile::tempdir().expect("temp dir");

    cellar(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote cellar.toml"));

    assert!(dir.path().join("cellar.toml").exists());
    assert!(dir.path().join("cellar.sqlite3").exists());

    // Second init leaves the config alone.
    cellar(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("left untouched"));
}

#[test]
fn import_then_stats_then_export() {
    let dir = tempfile::tempdir().expect("temp dir");
    cellar(&dir).arg("init").assert().success();

    let csv_path = dir.path().join("bottles.csv");
    std::fs::write(&csv_path, SAMPLE_CSV).expect("write sample csv");

    cellar(&dir)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bottles added:   2"));

    let output = cellar(&dir)
        .args(["stats", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stats: serde_json::Value = serde_json::from_slice(&output).expect("stats json");
    assert_eq!(stats["total_bottles"], 3);
    assert_eq!(stats["total_value_cents"], 95000 + 2 * 18050);
    assert_eq!(stats["by_colour"][0]["name"], "white");

    cellar(&dir)
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Wine,Producer,Country,Region,Colour",
        ))
        .stdout(predicate::str::contains("Grange,Penfolds,Australia"));
}

#[test]
fn stats_human_output_shows_value() {
    let dir = tempfile::tempdir().expect("temp dir");
    cellar(&dir).arg("init").assert().success();

    let csv_path = dir.path().join("bottles.csv");
    std::fs::write(&csv_path, SAMPLE_CSV).expect("write sample csv");
    cellar(&dir).arg("import").arg(&csv_path).assert().success();

    cellar(&dir)
        .args(["stats", "--full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cellar value:"))
        .stdout(predicate::str::contains("$1311.00"))
        .stdout(predicate::str::contains("By country"))
        .stdout(predicate::str::contains("Australia"));
}

#[test]
fn import_reports_rejected_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    cellar(&dir).arg("init").assert().success();

    let csv_path = dir.path().join("bad.csv");
    std::fs::write(
        &csv_path,
        "Wine,Producer,Country,Region,Colour,Vintage,Size,Price,Quantity,Tags\n\
         ,NoWine,France,,red,,750,10.00,1,\n",
    )
    .expect("write csv");

    cellar(&dir)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing wine name"));
}

#[test]
fn import_missing_file_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    cellar(&dir).arg("init").assert().success();

    cellar(&dir)
        .arg("import")
        .arg(dir.path().join("nope.csv"))
        .assert()
        .failure();
}
