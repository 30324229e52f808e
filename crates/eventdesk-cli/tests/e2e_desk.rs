//! E2E CLI workflow tests for the desk.
//!
//! Each test runs `evd` as a subprocess against an isolated temp data
//! directory and checks both the command output and the table files.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the evd binary, with `dir` as data directory.
fn evd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("evd"));
    cmd.current_dir(dir);
    cmd.env("EVENTDESK_DIR", dir);
    // Keep the caller's own config and login out of the test.
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd.env_remove("EVENTDESK_USER");
    cmd.env_remove("EVENTDESK_PASSWORD");
    cmd.env_remove("FORMAT");
    // Suppress tracing output that goes to stderr
    cmd.env("EVENTDESK_LOG", "error");
    cmd
}

fn as_admin(dir: &Path) -> Command {
    let mut cmd = evd(dir);
    cmd.env("EVENTDESK_USER", "admin")
        .env("EVENTDESK_PASSWORD", "adminpass");
    cmd
}

fn as_user1(dir: &Path) -> Command {
    let mut cmd = evd(dir);
    cmd.env("EVENTDESK_USER", "user1")
        .env("EVENTDESK_PASSWORD", "user1pass");
    cmd
}

fn init_desk(dir: &Path) {
    evd(dir).args(["init"]).assert().success();
}

fn json_out(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().expect("evd should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

fn json_err(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().expect("evd should not crash");
    assert!(!output.status.success(), "command unexpectedly succeeded");
    serde_json::from_slice(&output.stderr).expect("errors should be JSON on stderr")
}

fn table(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).expect("table file")
}

// ---------------------------------------------------------------------------
// Setup and accounts
// ---------------------------------------------------------------------------

#[test]
fn init_seeds_demo_data_and_writes_tables() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    assert!(dir.path().join("eventdesk.toml").exists());
    assert_eq!(
        table(dir.path(), "users.txt"),
        "1,admin,adminpass,0\n2,user1,user1pass,1\n3,user2,user2pass,1\n"
    );
    assert_eq!(table(dir.path(), "attendees.txt"), "");

    let events = json_out(as_user1(dir.path()).args(["event", "list"]));
    let names: Vec<&str> = events
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert_eq!(names, ["Tech Conference 2025", "Summer Music Festival"]);
}

#[test]
fn init_twice_needs_force() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());
    evd(dir.path())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    evd(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn commands_require_a_login() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let err = json_err(evd(dir.path()).args(["event", "list"]));
    assert_eq!(err["error"]["error_code"], "missing_credentials");

    let err = json_err(
        evd(dir.path())
            .args(["event", "list"])
            .env("EVENTDESK_USER", "admin")
            .env("EVENTDESK_PASSWORD", "wrong"),
    );
    assert_eq!(err["error"]["error_code"], "invalid_credentials");
}

#[test]
fn roles_gate_operations() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let err = json_err(as_user1(dir.path()).args(["inventory", "list"]));
    assert_eq!(err["error"]["error_code"], "E4001");

    let err = json_err(as_admin(dir.path()).args(["attendee", "register", "1", "--contact", "a@x"]));
    assert_eq!(err["error"]["error_code"], "E4001");
}

#[test]
fn signup_then_login() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let created = json_out(evd(dir.path()).args(["signup", "carol", "carolpass"]));
    assert_eq!(created["id"], 4);
    assert_eq!(created["role"], "regular_user");
    assert!(created.get("password").is_none());

    let me = json_out(
        evd(dir.path())
            .args(["whoami", "--user", "carol", "--password", "carolpass"]),
    );
    assert_eq!(me["username"], "carol");

    let err = json_err(evd(dir.path()).args(["signup", "carol", "another"]));
    assert_eq!(err["error"]["error_code"], "E3002");

    let err = json_err(evd(dir.path()).args(["signup", "dave", "abc"]));
    assert_eq!(err["error"]["error_code"], "E3003");
}

#[test]
fn admin_cannot_delete_itself() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let err = json_err(as_admin(dir.path()).args(["user", "delete", "admin"]));
    assert_eq!(err["error"]["error_code"], "E4001");

    as_admin(dir.path())
        .args(["user", "delete", "user2"])
        .assert()
        .success();
    assert!(!table(dir.path(), "users.txt").contains("user2"));
}

// ---------------------------------------------------------------------------
// Registration and attendance
// ---------------------------------------------------------------------------

#[test]
fn register_check_in_and_report() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let outcome = json_out(as_user1(dir.path()).args(["attendee", "register", "1", "--contact", "u1@x"]));
    assert_eq!(outcome["outcome"], "created");
    assert_eq!(outcome["attendee_id"], 1);

    let again = json_out(as_user1(dir.path()).args(["attendee", "register", "1", "--contact", "u1@x"]));
    assert_eq!(again["outcome"], "already_registered");

    assert_eq!(table(dir.path(), "attendees.txt"), "1,user1,u1@x,1,0\n");
    assert!(table(dir.path(), "events.txt").lines().next().expect("event 1").ends_with(",0,1,"));

    as_admin(dir.path())
        .args(["attendee", "checkin", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checked in"));

    let report = json_out(as_admin(dir.path()).args(["attendee", "report", "1"]));
    assert_eq!(report["registered"], 1);
    assert_eq!(report["checked_in"], 1);

    as_admin(dir.path())
        .args(["attendee", "report", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attendance Report for Event: Tech Conference 2025 (ID: 1)"));
}

#[test]
fn check_in_for_the_wrong_event_is_refused() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());
    as_user1(dir.path())
        .args(["attendee", "register", "1", "--contact", "u1@x"])
        .assert()
        .success();

    let err = json_err(as_admin(dir.path()).args(["attendee", "checkin", "2", "1"]));
    assert_eq!(err["error"]["error_code"], "E3005");
}

#[test]
fn closed_events_refuse_registration() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());
    as_admin(dir.path())
        .args(["event", "status", "2", "canceled"])
        .assert()
        .success();

    let err = json_err(as_user1(dir.path()).args(["attendee", "register", "2", "--contact", "u1@x"]));
    assert_eq!(err["error"]["error_code"], "E3004");
}

#[test]
fn cancel_removes_the_scoped_record() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());
    as_user1(dir.path())
        .args(["attendee", "register", "2", "--contact", "u1@x"])
        .assert()
        .success();

    let cancel = json_out(as_user1(dir.path()).args(["attendee", "cancel", "2"]));
    assert_eq!(cancel["attendee_id"], 1);
    assert_eq!(table(dir.path(), "attendees.txt"), "");

    let err = json_err(as_user1(dir.path()).args(["attendee", "cancel", "2"]));
    assert_eq!(err["error"]["error_code"], "E3005");
}

#[test]
fn contact_update_creates_a_profile_once() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let first = json_out(as_user1(dir.path()).args(["attendee", "contact", "555-0100"]));
    assert_eq!(first["created_profile"], 1);
    let second = json_out(as_user1(dir.path()).args(["attendee", "contact", "555-0199"]));
    assert!(second["created_profile"].is_null());
    assert_eq!(table(dir.path(), "attendees.txt"), "1,user1,555-0199,0,0\n");
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[test]
fn allocation_respects_availability() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let change = json_out(as_admin(dir.path()).args(["inventory", "allocate", "1", "Chairs", "80"]));
    assert_eq!(change["item"]["available"], 20);
    assert_eq!(change["held_by_event"], 80);

    let err = json_err(as_admin(dir.path()).args(["inventory", "allocate", "2", "2", "30"]));
    assert_eq!(err["error"]["error_code"], "E3001");
    assert!(
        err["error"]["message"]
            .as_str()
            .expect("message")
            .contains("only 20 available")
    );

    let err = json_err(as_admin(dir.path()).args(["inventory", "update", "Chairs", "--total", "50"]));
    assert_eq!(err["error"]["error_code"], "E3001");

    let back = json_out(as_admin(dir.path()).args(["inventory", "deallocate", "1", "chairs", "500"]));
    assert_eq!(back["quantity"], 80);
    assert_eq!(back["item"]["allocated"], 0);

    assert_eq!(
        table(dir.path(), "inventory.txt"),
        "1,Projector,5,0,HD Projector\n2,Chairs,100,0,Standard chairs\n"
    );
}

#[test]
fn deleting_an_event_returns_its_inventory() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());
    as_admin(dir.path())
        .args(["inventory", "allocate", "1", "Projector", "3"])
        .assert()
        .success();
    as_user1(dir.path())
        .args(["attendee", "register", "1", "--contact", "u1@x"])
        .assert()
        .success();

    let removal = json_out(as_admin(dir.path()).args(["event", "delete", "1"]));
    assert_eq!(removal["returned"], serde_json::json!([[1, 3]]));
    assert_eq!(removal["removed_attendees"].as_array().map(Vec::len), Some(1));

    assert!(table(dir.path(), "inventory.txt").starts_with("1,Projector,5,0,"));
    assert_eq!(table(dir.path(), "attendees.txt"), "");
    assert_eq!(table(dir.path(), "events.txt").lines().count(), 1);
}

#[test]
fn inventory_report_can_be_written() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());
    as_admin(dir.path())
        .args(["inventory", "report", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall Totals: Total: 105, Allocated: 0, Available: 105"));
    assert!(dir.path().join("inventory_report.txt").exists());
}

// ---------------------------------------------------------------------------
// Input hygiene, exports and damaged tables
// ---------------------------------------------------------------------------

#[test]
fn commas_in_free_text_are_refused() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());

    let err = json_err(as_admin(dir.path()).args([
        "event", "create", "--name", "Gala", "--date", "2025-12-01", "--time", "19:30",
        "--location", "Hall A, level 2",
    ]));
    assert_eq!(err["error"]["error_code"], "invalid_text");

    let err = json_err(as_admin(dir.path()).args([
        "event", "create", "--name", "Gala", "--date", "2025-13-01", "--time", "19:30",
    ]));
    assert_eq!(err["error"]["error_code"], "E3006");
}

#[test]
fn export_all_writes_every_table() {
    let dir = TempDir::new().expect("tempdir");
    let out = TempDir::new().expect("out");
    init_desk(dir.path());

    as_admin(dir.path())
        .args(["export", "all", "--out-dir"])
        .arg(out.path())
        .assert()
        .success();
    for name in [
        "users_export.txt",
        "events_export.txt",
        "attendees_export.txt",
        "inventory_export.txt",
    ] {
        assert!(out.path().join(name).exists(), "{name} missing");
    }
    assert_eq!(
        std::fs::read_to_string(out.path().join("users_export.txt")).expect("read"),
        table(dir.path(), "users.txt")
    );
}

#[test]
fn malformed_lines_are_skipped() {
    let dir = TempDir::new().expect("tempdir");
    init_desk(dir.path());
    std::fs::write(
        dir.path().join("inventory.txt"),
        "1,Projector,5,0,HD Projector\nnot,a,valid,line\n",
    )
    .expect("write");

    let rows = json_out(as_admin(dir.path()).args(["inventory", "list"]));
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
}

#[test]
fn completions_need_no_data_directory() {
    let dir = TempDir::new().expect("tempdir");
    evd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("evd"));
    assert!(!dir.path().join("users.txt").exists());
}
