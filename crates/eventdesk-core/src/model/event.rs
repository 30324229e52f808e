use serde::Serialize;
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use super::{ParseEnumError, Record, RecordKind, normalize};

/// Event lifecycle status. Transitions are free-form: any status may be
/// set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Canceled,
}

impl EventStatus {
    pub const ALL: [Self; 4] = [
        Self::Upcoming,
        Self::Ongoing,
        Self::Completed,
        Self::Canceled,
    ];

    /// On-disk ordinal, `0..=3` in declaration order.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Upcoming => 0,
            Self::Ongoing => 1,
            Self::Completed => 2,
            Self::Canceled => 3,
        }
    }

    #[must_use]
    pub const fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Upcoming),
            1 => Some(Self::Ongoing),
            2 => Some(Self::Completed),
            3 => Some(Self::Canceled),
            _ => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
        }
    }

    /// Completed and canceled events refuse new registrations.
    #[must_use]
    pub const fn accepts_registrations(self) -> bool {
        matches!(self, Self::Upcoming | Self::Ongoing)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// The admin-supplied fields of a new event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: String,
}

/// A partial edit of an event's descriptive fields. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl EventPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.category.is_none()
    }
}

/// A scheduled event, its registrant ids and its inventory allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: u32,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub status: EventStatus,
    /// Registered attendee ids, in registration order, without duplicates.
    pub attendee_ids: Vec<u32>,
    /// Item id to allocated quantity. Never holds a zero quantity.
    pub allocated_inventory: BTreeMap<u32, u32>,
}

impl Event {
    /// Build a fresh upcoming event with no registrants or allocations.
    #[must_use]
    pub fn new(id: u32, draft: EventDraft) -> Self {
        Self {
            id,
            name: draft.name,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            description: draft.description,
            category: draft.category,
            status: EventStatus::Upcoming,
            attendee_ids: Vec::new(),
            allocated_inventory: BTreeMap::new(),
        }
    }

    /// Append an attendee id. Returns `false` if it was already present.
    pub fn add_attendee(&mut self, attendee_id: u32) -> bool {
        if self.attendee_ids.contains(&attendee_id) {
            return false;
        }
        self.attendee_ids.push(attendee_id);
        true
    }

    /// Remove an attendee id. Returns `false` if it was not present.
    pub fn remove_attendee(&mut self, attendee_id: u32) -> bool {
        let before = self.attendee_ids.len();
        self.attendee_ids.retain(|id| *id != attendee_id);
        self.attendee_ids.len() != before
    }

    #[must_use]
    pub fn has_attendee(&self, attendee_id: u32) -> bool {
        self.attendee_ids.contains(&attendee_id)
    }

    /// Quantity of `item_id` currently held by this event.
    #[must_use]
    pub fn allocated(&self, item_id: u32) -> u32 {
        self.allocated_inventory.get(&item_id).copied().unwrap_or(0)
    }

    /// Event-side half of an allocation. Callers go through the allocation
    /// engine so the item side moves with it.
    pub(crate) fn record_allocation(&mut self, item_id: u32, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.allocated_inventory.entry(item_id).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Event-side half of a deallocation. Removes at most what is held and
    /// returns the amount actually removed; an entry that reaches zero is
    /// dropped.
    pub(crate) fn release_allocation(&mut self, item_id: u32, quantity: u32) -> u32 {
        let Some(held) = self.allocated_inventory.get_mut(&item_id) else {
            return 0;
        };
        let released = quantity.min(*held);
        *held -= released;
        if *held == 0 {
            self.allocated_inventory.remove(&item_id);
        }
        released
    }

    /// Apply a patch. Field validation is the caller's job.
    pub(crate) fn apply(&mut self, patch: EventPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}

impl Record for Event {
    const KIND: RecordKind = RecordKind::Event;

    fn id(&self) -> u32 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Event {
        Event::new(
            7,
            EventDraft {
                name: "Launch".into(),
                date: "2025-10-20".into(),
                time: "09:00".into(),
                location: "Hall".into(),
                description: "Kickoff".into(),
                category: "Conference".into(),
            },
        )
    }

    #[test]
    fn new_event_is_upcoming_and_empty() {
        let event = sample();
        assert_eq!(event.status, EventStatus::Upcoming);
        assert!(event.attendee_ids.is_empty());
        assert!(event.allocated_inventory.is_empty());
    }

    #[test]
    fn add_attendee_is_idempotent_and_keeps_order() {
        let mut event = sample();
        assert!(event.add_attendee(3));
        assert!(event.add_attendee(1));
        assert!(!event.add_attendee(3));
        assert_eq!(event.attendee_ids, vec![3, 1]);
        assert!(event.remove_attendee(3));
        assert!(!event.remove_attendee(3));
        assert_eq!(event.attendee_ids, vec![1]);
    }

    #[test]
    fn release_clamps_and_drops_empty_entries() {
        let mut event = sample();
        event.record_allocation(2, 3);
        assert_eq!(event.release_allocation(2, 10), 3);
        assert!(!event.allocated_inventory.contains_key(&2));
        assert_eq!(event.release_allocation(2, 1), 0);
    }

    #[test]
    fn record_allocation_accumulates() {
        let mut event = sample();
        event.record_allocation(5, 4);
        event.record_allocation(5, 6);
        event.record_allocation(5, 0);
        assert_eq!(event.allocated(5), 10);
        assert_eq!(event.allocated(6), 0);
    }

    #[test]
    fn status_ordinals_and_registration_gate() {
        for status in EventStatus::ALL {
            assert_eq!(
                EventStatus::from_ordinal(i64::from(status.ordinal())),
                Some(status)
            );
        }
        assert_eq!(EventStatus::from_ordinal(4), None);
        assert!(EventStatus::Ongoing.accepts_registrations());
        assert!(!EventStatus::Canceled.accepts_registrations());
        assert!(!EventStatus::Completed.accepts_registrations());
        assert_eq!("cancelled".parse::<EventStatus>(), Ok(EventStatus::Canceled));
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut event = sample();
        event.apply(EventPatch {
            location: Some("Annex".into()),
            ..EventPatch::default()
        });
        assert_eq!(event.location, "Annex");
        assert_eq!(event.name, "Launch");
    }
}
