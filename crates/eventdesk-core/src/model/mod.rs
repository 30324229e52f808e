//! The four record types held by the desk.
//!
//! Every record carries a `u32` id issued by its table's
//! [`IdAllocator`](crate::ids::IdAllocator). Cross-table references (an
//! event's attendee ids and allocation keys) are plain ids looked up in the
//! owning store, and may dangle.

pub mod attendee;
pub mod event;
pub mod inventory;
pub mod user;

use std::fmt;

pub use attendee::{Attendee, CheckIn, GENERIC_EVENT_ID};
pub use event::{Event, EventDraft, EventPatch, EventStatus};
pub use inventory::InventoryItem;
pub use user::{Operation, Role, User};

/// Which table a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Event,
    Attendee,
    InventoryItem,
}

impl RecordKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Event => "event",
            Self::Attendee => "attendee",
            Self::InventoryItem => "inventory item",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record addressable by id inside a [`Store`](crate::store::Store).
pub trait Record {
    const KIND: RecordKind;

    fn id(&self) -> u32;
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}
