//! Load/save behaviour of the table files: round trips, malformed lines,
//! drift repair and id reseeding.

use std::fs;
use std::path::Path;

use eventdesk_core::config::{DeskConfig, SeedConfig};
use eventdesk_core::model::{EventStatus, Role};
use eventdesk_core::{ErrorCode, Repository, Table};
use tempfile::TempDir;

fn unseeded() -> DeskConfig {
    DeskConfig {
        seed: SeedConfig { enabled: false },
        ..DeskConfig::default()
    }
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("write table");
}

#[test]
fn full_round_trip_preserves_every_table() {
    let dir = TempDir::new().expect("tempdir");
    let (mut repo, _) = Repository::open(dir.path(), DeskConfig::default()).expect("open");

    let attendee = repo
        .register("user1", 1, "u1@example.com")
        .expect("register")
        .attendee_id();
    repo.check_in(1, attendee).expect("check in");
    repo.allocate(1, 2, 25).expect("allocate chairs");
    repo.allocate(2, 1, 2).expect("allocate projector");
    repo.set_status(2, EventStatus::Ongoing).expect("status");
    repo.update_contact_info("user2", "555-0100").expect("contact");
    repo.create_user("carol", "carolpass", Role::Admin).expect("user");

    let (reloaded, report) = Repository::load_all(dir.path(), DeskConfig::default()).expect("reload");
    assert!(report.diagnostics.is_empty());
    assert!(report.missing.is_empty());
    assert!(report.reconcile.is_clean());
    assert_eq!(reloaded.state().users(), repo.state().users());
    assert_eq!(reloaded.state().events(), repo.state().events());
    assert_eq!(reloaded.state().attendees(), repo.state().attendees());
    assert_eq!(reloaded.state().inventory(), repo.state().inventory());
    assert_eq!(reloaded.state().ids(), repo.state().ids());
}

#[test]
fn malformed_line_is_skipped_with_one_diagnostic() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "inventory.txt",
        "1,Chairs,100,0,Standard chairs\nabc,Tables,10,0,Folding\n",
    );

    let (repo, report) = Repository::load_all(dir.path(), unseeded()).expect("load");
    assert_eq!(repo.state().inventory().len(), 1);
    assert_eq!(report.diagnostics.len(), 1);

    let diag = &report.diagnostics[0];
    assert_eq!(diag.table, Table::Inventory);
    assert_eq!(diag.line_no, 2);
    assert_eq!(diag.line, "abc,Tables,10,0,Folding");
    assert_eq!(ErrorCode::MalformedRecord.code(), "E2002");
}

#[test]
fn every_table_tolerates_garbage() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "users.txt", "1,admin,adminpass,0\n2,ghost,pw,2\nbroken\n");
    write(
        dir.path(),
        "events.txt",
        "1,Gala,2025-12-01,19:30,Ballroom,Winter gala,Social,0,1,\n2,Bad,2025-12-01,19:30,X,Y,Z,7,,\n",
    );
    write(dir.path(), "attendees.txt", "1,ana,ana@x,1,1\n2,ben,ben@x\n");

    let (repo, report) = Repository::load_all(dir.path(), unseeded()).expect("load");
    let state = repo.state();
    assert_eq!(state.users().len(), 1);
    assert_eq!(state.events().len(), 1);
    assert_eq!(state.attendees().len(), 1);
    assert!(state.attendee(1).expect("ana").checked_in);
    assert_eq!(report.diagnostics.len(), 4);
    assert_eq!(report.missing, vec![Table::Inventory]);
}

#[test]
fn load_repairs_drifted_allocated_quantities() {
    let dir = TempDir::new().expect("tempdir");
    // Inventory says 99 allocated; the events only hold 30 + 20.
    write(dir.path(), "inventory.txt", "1,Chairs,100,99,Standard chairs\n");
    write(
        dir.path(),
        "events.txt",
        "1,A,2025-01-01,10:00,L,D,C,0,,1:30\n2,B,2025-01-02,10:00,L,D,C,0,,1:20;9:4\n",
    );

    let (repo, report) = Repository::load_all(dir.path(), unseeded()).expect("load");
    let chairs = repo.state().item(1).expect("chairs");
    assert_eq!(chairs.allocated_quantity, 50);
    assert_eq!(chairs.available(), 50);
    assert_eq!(report.reconcile.drift.len(), 1);
    assert_eq!(report.reconcile.dangling.len(), 1);
    assert!(report.reconcile.overcommitted.is_empty());
}

#[test]
fn new_records_never_reuse_restored_ids() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "users.txt", "4,admin,adminpass,0\n9,user1,user1pass,1\n");
    write(dir.path(), "attendees.txt", "17,ana,ana@x,0,0\n");
    write(
        dir.path(),
        "events.txt",
        "5,Gala,2025-12-01,19:30,Ballroom,Winter gala,Social,0,,\n",
    );

    let (mut repo, _) = Repository::load_all(dir.path(), unseeded()).expect("load");
    assert_eq!(repo.create_user("new", "newpass", Role::RegularUser).expect("user").id, 10);
    let registration = repo.register("ben", 5, "ben@x").expect("register");
    assert_eq!(registration.attendee_id(), 18);
    assert_eq!(repo.add_item("Tables", 2, "").expect("item").id, 1);
}

#[test]
fn largest_u32_id_is_skipped_not_fatal() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "users.txt",
        "1,admin,adminpass,0\n4294967295,ghost,ghostpass,1\n",
    );

    let (mut repo, report) = Repository::load_all(dir.path(), unseeded()).expect("load");
    assert_eq!(repo.state().users().len(), 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].table, Table::Users);
    assert_eq!(report.diagnostics[0].line_no, 2);

    let user = repo.create_user("carol", "carolpass", Role::RegularUser).expect("user");
    assert_eq!(user.id, 2);
}

#[test]
fn crlf_and_blank_lines_load_cleanly() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "users.txt",
        "1,admin,adminpass,0\r\n\r\n2,user1,user1pass,1\r\n",
    );
    let (repo, report) = Repository::load_all(dir.path(), unseeded()).expect("load");
    assert!(report.diagnostics.is_empty());
    assert!(repo.state().authenticate("user1", "user1pass").is_some());
}
