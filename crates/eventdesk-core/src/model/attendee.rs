use serde::Serialize;

use super::{Record, RecordKind};

/// `event_id` value of a profile that is not tied to any event.
pub const GENERIC_EVENT_ID: u32 = 0;

/// A registrant. Owned by the attendee table; events refer to it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendee {
    pub id: u32,
    pub name: String,
    pub contact_info: String,
    /// The event this record registers for, or [`GENERIC_EVENT_ID`].
    pub event_id: u32,
    /// One-way flag: set by check-in, never cleared.
    pub checked_in: bool,
}

/// Outcome of a check-in attempt on a registered attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckIn {
    CheckedIn,
    AlreadyCheckedIn,
}

impl Attendee {
    #[must_use]
    pub const fn is_generic(&self) -> bool {
        self.event_id == GENERIC_EVENT_ID
    }

    /// Case-insensitive name match, used to tie a login to its registrations.
    #[must_use]
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    pub(crate) fn check_in(&mut self) -> CheckIn {
        if self.checked_in {
            CheckIn::AlreadyCheckedIn
        } else {
            self.checked_in = true;
            CheckIn::CheckedIn
        }
    }
}

impl Record for Attendee {
    const KIND: RecordKind = RecordKind::Attendee;

    fn id(&self) -> u32 {
        self.id
    }
}
