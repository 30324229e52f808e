//! Read-only views and reports.
//!
//! Event references to attendees and items are resolved by id. A reference
//! that no longer resolves is shown as [`UNKNOWN_ATTENDEE`] or
//! [`UNKNOWN_ITEM`] rather than treated as an error.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::DeskResult;
use crate::model::{Event, EventStatus, InventoryItem};
use crate::state::DeskState;

pub const UNKNOWN_ATTENDEE: &str = "Unknown Attendee";
pub const UNKNOWN_ITEM: &str = "Unknown Item";

/// An attendee id from an event's list, resolved against the attendee table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeeLine {
    pub id: u32,
    pub known: bool,
    pub name: String,
    pub contact_info: String,
    pub checked_in: bool,
}

/// An allocation entry resolved against the inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationLine {
    pub item_id: u32,
    pub known: bool,
    pub name: String,
    pub quantity: u32,
}

/// An event with its references resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub id: u32,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub status: EventStatus,
    pub attendees: Vec<AttendeeLine>,
    pub allocations: Vec<AllocationLine>,
}

impl EventView {
    #[must_use]
    pub fn build(state: &DeskState, event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
            category: event.category.clone(),
            status: event.status,
            attendees: attendee_lines(state, event),
            allocations: event
                .allocated_inventory
                .iter()
                .map(|(&item_id, &quantity)| {
                    let item = state.inventory().get(item_id);
                    AllocationLine {
                        item_id,
                        known: item.is_some(),
                        name: item.map_or_else(|| UNKNOWN_ITEM.to_string(), |i| i.name.clone()),
                        quantity,
                    }
                })
                .collect(),
        }
    }

    /// Multi-line human rendering.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Event ID: {}", self.id);
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Date: {} Time: {}", self.date, self.time);
        let _ = writeln!(out, "Location: {}", self.location);
        let _ = writeln!(out, "Category: {}", self.category);
        let _ = writeln!(out, "Status: {}", self.status);
        let _ = writeln!(out, "Description: {}", self.description);

        if self.attendees.is_empty() {
            out.push_str("Attendees: none\n");
        } else {
            let _ = writeln!(out, "Attendees ({}):", self.attendees.len());
            for a in &self.attendees {
                if a.known {
                    let _ = writeln!(
                        out,
                        "  - {} (ID: {}, Contact: {}, Checked-in: {})",
                        a.name,
                        a.id,
                        a.contact_info,
                        if a.checked_in { "Yes" } else { "No" }
                    );
                } else {
                    let _ = writeln!(out, "  - {} (ID: {})", a.name, a.id);
                }
            }
        }

        if self.allocations.is_empty() {
            out.push_str("Allocated inventory: none\n");
        } else {
            out.push_str("Allocated inventory:\n");
            for line in &self.allocations {
                let _ = writeln!(
                    out,
                    "  - {} (ID: {}): {} units",
                    line.name, line.item_id, line.quantity
                );
            }
        }
        out
    }
}

fn attendee_lines(state: &DeskState, event: &Event) -> Vec<AttendeeLine> {
    event
        .attendee_ids
        .iter()
        .map(|&id| match state.attendees().get(id) {
            Some(a) => AttendeeLine {
                id,
                known: true,
                name: a.name.clone(),
                contact_info: a.contact_info.clone(),
                checked_in: a.checked_in,
            },
            None => AttendeeLine {
                id,
                known: false,
                name: UNKNOWN_ATTENDEE.to_string(),
                contact_info: String::new(),
                checked_in: false,
            },
        })
        .collect()
}

/// Registration and check-in summary for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceReport {
    pub event_id: u32,
    pub event_name: String,
    pub attendees: Vec<AttendeeLine>,
    /// Every listed id, resolved or not.
    pub registered: usize,
    pub checked_in: usize,
    /// `checked_in / registered * 100`, or `0.0` with nobody registered.
    pub percentage: f64,
}

impl AttendanceReport {
    /// # Errors
    ///
    /// [`crate::DeskError::NotFound`] if no event has this id.
    pub fn build(state: &DeskState, event_id: u32) -> DeskResult<Self> {
        let event = state.event(event_id)?;
        let attendees = attendee_lines(state, event);
        let registered = attendees.len();
        let checked_in = attendees.iter().filter(|a| a.known && a.checked_in).count();
        #[allow(clippy::cast_precision_loss)]
        let percentage = if registered == 0 {
            0.0
        } else {
            checked_in as f64 / registered as f64 * 100.0
        };
        Ok(Self {
            event_id,
            event_name: event.name.clone(),
            attendees,
            registered,
            checked_in,
            percentage,
        })
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Attendance Report for Event: {} (ID: {})",
            self.event_name, self.event_id
        );
        if self.attendees.is_empty() {
            out.push_str("No attendees registered for this event.\n");
            return out;
        }
        out.push_str("Registered Attendees:\n");
        for a in &self.attendees {
            if a.known {
                let _ = writeln!(
                    out,
                    "  - Name: {}, Contact: {}, Checked-in: {}",
                    a.name,
                    a.contact_info,
                    if a.checked_in { "Yes" } else { "No" }
                );
            } else {
                let _ = writeln!(out, "  - {} (ID: {})", UNKNOWN_ATTENDEE, a.id);
            }
        }
        let _ = writeln!(out, "Total Registered: {}", self.registered);
        let _ = writeln!(out, "Total Checked-in: {}", self.checked_in);
        let _ = writeln!(out, "Attendance Percentage: {:.1}%", self.percentage);
        out
    }
}

/// One inventory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    pub id: u32,
    pub name: String,
    pub total: u32,
    pub allocated: u32,
    pub available: u32,
    pub description: String,
}

impl From<&InventoryItem> for InventoryRow {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            total: item.total_quantity,
            allocated: item.allocated_quantity,
            available: item.available(),
            description: item.description.clone(),
        }
    }
}

/// Allocations held by one event, known items only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAllocations {
    pub event_id: u32,
    pub event_name: String,
    /// `(item name, quantity)`.
    pub items: Vec<(String, u32)>,
}

/// Every item with totals, plus what each event holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    pub rows: Vec<InventoryRow>,
    pub total: u64,
    pub allocated: u64,
    pub available: u64,
    /// Events holding at least one known item, in event order.
    pub per_event: Vec<EventAllocations>,
}

impl InventoryReport {
    #[must_use]
    pub fn build(state: &DeskState) -> Self {
        let rows: Vec<InventoryRow> = state.inventory().iter().map(InventoryRow::from).collect();
        let total = rows.iter().map(|r| u64::from(r.total)).sum();
        let allocated = rows.iter().map(|r| u64::from(r.allocated)).sum();
        let available = rows.iter().map(|r| u64::from(r.available)).sum();

        let per_event = state
            .events()
            .iter()
            .filter_map(|event| {
                let items: Vec<(String, u32)> = event
                    .allocated_inventory
                    .iter()
                    .filter(|&(_, &quantity)| quantity > 0)
                    .filter_map(|(&item_id, &quantity)| {
                        state
                            .inventory()
                            .get(item_id)
                            .map(|item| (item.name.clone(), quantity))
                    })
                    .collect();
                (!items.is_empty()).then(|| EventAllocations {
                    event_id: event.id,
                    event_name: event.name.clone(),
                    items,
                })
            })
            .collect();

        Self {
            rows,
            total,
            allocated,
            available,
            per_event,
        }
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let rule = "-".repeat(71);
        let mut out = String::new();
        out.push_str("Full Inventory Report\n");
        if self.rows.is_empty() {
            out.push_str("No inventory items to report.\n");
            return out;
        }

        out.push_str("Item ID | Name              | Total | Allocated | Available | Description\n");
        let _ = writeln!(out, "{rule}");
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<8}| {:<17}| {:>5} | {:>9} | {:>9} | {}",
                row.id, row.name, row.total, row.allocated, row.available, row.description
            );
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "Overall Totals: Total: {}, Allocated: {}, Available: {}",
            self.total, self.allocated, self.available
        );

        out.push_str("\nAllocation per Event:\n");
        if self.per_event.is_empty() {
            out.push_str("  No inventory currently allocated to any event.\n");
        }
        for event in &self.per_event {
            let _ = writeln!(out, "  Event: {} (ID: {})", event.event_name, event.event_id);
            for (name, quantity) in &event.items {
                let _ = writeln!(out, "    - {name}: {quantity} units");
            }
        }
        let _ = writeln!(out, "{rule}");
        out
    }
}
