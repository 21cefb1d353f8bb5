//! Integration tests for `carepath add-pathway`.

mod common;

use assert_cmd::Command;
use common::{SAMPLE_PT_CSV, TestEnv};
use predicates::prelude::*;

fn carepath_in(env: &TestEnv) -> Command {
    env.carepath()
}

#[test]
fn test_add_pathway_clones_every_pair_as_pending() {
    let env = TestEnv::sample();
    let out = env.json(&["add-pathway", "Oncologia"]);

    assert_eq!(out["outcome"], "appended");
    assert_eq!(out["pathway"], "Oncologia");
    assert_eq!(out["added"], 5);

    let sheet = env.read("sheet.csv");
    for line in [
        "Oncologia,A,1,Pending,\n",
        "Oncologia,A,2,Pending,\n",
        "Oncologia,B,1,Pending,\n",
        "Oncologia,B,2,Pending,\n",
        "Oncologia,C,9,Pending,\n",
    ] {
        assert!(sheet.contains(line), "missing {:?} in {}", line, sheet);
    }
    assert!(sheet.ends_with("Oncologia,C,9,Pending,\n"));
}

#[test]
fn test_add_pathway_is_visible_to_options_and_list() {
    let env = TestEnv::sample();
    carepath_in(&env)
        .args(["add-pathway", "Oncologia"])
        .assert()
        .success();

    let options = env.json(&["options", "--pathway", "Oncologia"]);
    assert_eq!(options["clamped"], false);
    assert_eq!(options["selection"]["pathway"], "Oncologia");

    let list = env.json(&["list", "--pathway", "Oncologia"]);
    assert_eq!(list["count"], 5);
}

#[test]
fn test_add_pathway_trims_name() {
    let env = TestEnv::sample();
    let out = env.json(&["add-pathway", "  Oncologia  "]);
    assert_eq!(out["pathway"], "Oncologia");
    assert!(env.read("sheet.csv").contains("\nOncologia,A,1,Pending,\n"));
}

#[test]
fn test_add_pathway_blank_name_is_noop() {
    let env = TestEnv::sample();
    carepath_in(&env)
        .args(["add-pathway", "   "])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""outcome":"empty_name""#));

    assert_eq!(env.read("sheet.csv"), common::SAMPLE_CSV);
}

#[test]
fn test_add_pathway_human() {
    let env = TestEnv::sample();
    carepath_in(&env)
        .args(["add-pathway", "Oncologia", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Added pathway Oncologia with 5 pending tasks",
        ));
}

#[test]
fn test_add_pathway_portuguese_sheet() {
    let env = TestEnv::with_sheet(SAMPLE_PT_CSV);
    let out = env.json(&["add-pathway", "Oncologia"]);
    assert_eq!(out["added"], 3);

    let sheet = env.read("sheet.csv");
    assert!(sheet.contains("Oncologia,Acolhimento,1,Pendente,,\n"));
    assert!(sheet.contains("Oncologia,Seguimento,1,Pendente,,\n"));
}

#[test]
fn test_add_pathway_to_empty_sheet_adds_nothing() {
    let env = TestEnv::with_sheet("pathway,phase,task,status,note\n");
    let out = env.json(&["add-pathway", "Oncologia"]);
    assert_eq!(out["outcome"], "appended");
    assert_eq!(out["added"], 0);
}
