mod common;

use std::fs;

use common::Workspace;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn finished_delete_is_listed_and_pruned() {
    let ws = Workspace::new();
    ws.cmd().args(["namespace", "create", "ns1"]).assert().success();
    ws.cmd()
        .args(["namespace", "delete", "ns1"])
        .assert()
        .success();

    ws.cmd()
        .args(["chains", "--prune"])
        .assert()
        .success()
        .stdout(
            contains("op-0000000000000001")
                .and(contains("successful"))
                .and(contains("pruned 1 finished chain(s)")),
        );

    ws.cmd()
        .arg("chains")
        .assert()
        .success()
        .stdout(contains("no chains stored"));
}

#[test]
fn resume_with_nothing_pending() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("resume")
        .assert()
        .success()
        .stdout(contains("nothing to resume"));
}

#[test]
fn resume_finishes_interrupted_delete() {
    let ws = Workspace::new();
    ws.write_state(
        r#"{
            "namespaces": ["ns1"],
            "tables": [{"namespace": "ns1", "name": "t1"}],
            "reservations": [
                {"resource": "!namespaces", "operation": 1, "mode": "shared"},
                {"resource": "ns1", "operation": 1, "mode": "exclusive"}
            ]
        }"#,
    );
    fs::create_dir_all(ws.store_path()).expect("create store dir");
    fs::write(
        ws.store_path().join("op-0000000000000001.json"),
        r#"{
            "id": 1,
            "status": "in_progress",
            "stack": [
                {"step": "delete_namespace", "namespace": "ns1"},
                {"step": "clean_up", "namespace": "ns1"}
            ],
            "polls": 0,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#,
    )
    .expect("write chain");

    ws.cmd()
        .arg("chains")
        .assert()
        .success()
        .stdout(contains("in_progress").and(contains("head namespace_cleanup")));

    ws.cmd()
        .arg("resume")
        .assert()
        .success()
        .stdout(contains("op-0000000000000001: completed"));

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("no namespaces"));
    ws.cmd()
        .arg("reservations")
        .assert()
        .success()
        .stdout(contains("no reservations held"));
}

#[test]
fn reservations_lists_holders() {
    let ws = Workspace::new();
    ws.write_state(
        r#"{
            "namespaces": ["ns1"],
            "reservations": [{"resource": "ns1", "operation": 7, "mode": "exclusive"}]
        }"#,
    );

    ws.cmd()
        .arg("reservations")
        .assert()
        .success()
        .stdout(contains("ns1").and(contains("exclusive")).and(contains("op-0000000000000007")));
}
