//! Write-only export files.
//!
//! Nothing here is read back by the desk. Table exports use the same line
//! format as the table files, so they can be copied over a table by hand.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::codec::encode_table;
use crate::repo::Table;
use crate::report::InventoryReport;
use crate::state::DeskState;

pub const INVENTORY_REPORT_FILE: &str = "inventory_report.txt";

#[must_use]
pub fn attendee_list_file(event_id: u32) -> String {
    format!("attendees_event_{event_id}.txt")
}

#[must_use]
pub fn table_export_file(table: Table) -> String {
    format!("{table}_export.txt")
}

/// Write `attendees_event_<id>.txt` listing the event's resolvable
/// attendees. Ids that no longer resolve are left out.
///
/// # Errors
///
/// Fails if the event does not exist or the file cannot be written.
pub fn write_attendee_list(dir: &Path, state: &DeskState, event_id: u32) -> Result<PathBuf> {
    let event = state.event(event_id)?;

    let mut body = String::new();
    let _ = writeln!(
        body,
        "Attendee List for Event: {} (ID: {})",
        event.name, event.id
    );
    let _ = writeln!(body, "Date: {} Time: {}", event.date, event.time);
    let _ = writeln!(body, "Generated: {}", Utc::now().to_rfc3339());
    let _ = writeln!(body, "{}", "-".repeat(57));
    if event.attendee_ids.is_empty() {
        body.push_str("No attendees registered for this event.\n");
    } else {
        body.push_str("ID,Name,ContactInfo,CheckedInStatus\n");
        for attendee in event
            .attendee_ids
            .iter()
            .filter_map(|&id| state.attendees().get(id))
        {
            let _ = writeln!(
                body,
                "{},{},{},{}",
                attendee.id,
                attendee.name,
                attendee.contact_info,
                if attendee.checked_in {
                    "Checked In"
                } else {
                    "Not Checked In"
                }
            );
        }
    }

    write_file(dir, &attendee_list_file(event_id), &body)
}

/// Write `<table>_export.txt` in table-file format.
///
/// # Errors
///
/// Fails if the file cannot be written.
pub fn export_table(dir: &Path, state: &DeskState, table: Table) -> Result<PathBuf> {
    let body = match table {
        Table::Users => encode_table(state.users()),
        Table::Events => encode_table(state.events()),
        Table::Attendees => encode_table(state.attendees()),
        Table::Inventory => encode_table(state.inventory()),
    };
    write_file(dir, &table_export_file(table), &body)
}

/// Write the full inventory report to `inventory_report.txt`.
///
/// # Errors
///
/// Fails if the file cannot be written.
pub fn write_inventory_report(dir: &Path, state: &DeskState) -> Result<PathBuf> {
    let mut body = format!("Generated: {}\n", Utc::now().to_rfc3339());
    body.push_str(&InventoryReport::build(state).render_text());
    write_file(dir, INVENTORY_REPORT_FILE, &body)
}

fn write_file(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = body.len(), "exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeskError;

    fn seeded() -> DeskState {
        let mut state = DeskState::new(6);
        state.seed_if_empty();
        state
    }

    #[test]
    fn attendee_list_skips_dangling_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = seeded();
        let a = state.register("user1", 1, "u1@x").expect("r").attendee_id();
        let b = state.register("user2", 1, "u2@x").expect("r").attendee_id();
        state.check_in(1, a).expect("check in");
        state.attendees.remove(b);

        let path = write_attendee_list(dir.path(), &state, 1).expect("export");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("attendees_event_1.txt"));
        let text = std::fs::read_to_string(path).expect("read");
        assert!(text.starts_with("Attendee List for Event: Tech Conference 2025 (ID: 1)\n"));
        assert!(text.contains("ID,Name,ContactInfo,CheckedInStatus\n1,user1,u1@x,Checked In\n"));
        assert!(!text.contains("user2"));
    }

    #[test]
    fn attendee_list_for_missing_event_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = write_attendee_list(dir.path(), &seeded(), 42).expect_err("missing");
        assert!(matches!(
            err.downcast_ref::<DeskError>(),
            Some(DeskError::NotFound { .. })
        ));
    }

    #[test]
    fn table_export_matches_table_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = seeded();
        let path = export_table(dir.path(), &state, Table::Inventory).expect("export");
        assert!(path.ends_with("inventory_export.txt"));
        assert_eq!(
            std::fs::read_to_string(path).expect("read"),
            "1,Projector,5,0,HD Projector\n2,Chairs,100,0,Standard chairs\n"
        );
    }

    #[test]
    fn inventory_report_file_has_timestamp_and_body() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_inventory_report(dir.path(), &seeded()).expect("export");
        let text = std::fs::read_to_string(path).expect("read");
        assert!(text.starts_with("Generated: "));
        assert!(text.contains("Overall Totals: Total: 105, Allocated: 0, Available: 105"));
    }
}
