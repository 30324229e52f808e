//! Registration engine: who is registered for what.
//!
//! An attendee record belongs to exactly one event (or to none, for a
//! generic profile with `event_id == 0`). Events hold attendee ids only.
//! Registrations are matched to a login by case-insensitive name.

use serde::Serialize;
use tracing::{debug, info};

use crate::allocation::deallocate;
use crate::error::{DeskError, DeskResult, Violation};
use crate::model::{Attendee, CheckIn, Event, GENERIC_EVENT_ID, RecordKind};
use crate::state::DeskState;

/// How a registration request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Registration {
    /// A new attendee record scoped to the event was created.
    Created { attendee_id: u32 },
    /// The user's generic profile was updated and listed on the event.
    ReusedProfile { attendee_id: u32 },
    /// The user already had a record for this event.
    AlreadyRegistered { attendee_id: u32 },
}

impl Registration {
    #[must_use]
    pub const fn attendee_id(self) -> u32 {
        match self {
            Self::Created { attendee_id }
            | Self::ReusedProfile { attendee_id }
            | Self::AlreadyRegistered { attendee_id } => attendee_id,
        }
    }
}

/// The attendee record a cancellation deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cancellation {
    pub attendee_id: u32,
}

/// Everything an event deletion took with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRemoval {
    pub event: Event,
    pub removed_attendees: Vec<Attendee>,
    /// `(item_id, quantity)` pairs returned to the pool.
    pub returned: Vec<(u32, u32)>,
}

/// Result of a contact-info update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactUpdate {
    /// Ids of existing attendee records whose contact changed.
    pub updated: Vec<u32>,
    /// Id of a generic profile created because none existed.
    pub created_profile: Option<u32>,
}

impl DeskState {
    /// Register `username` for an event.
    ///
    /// Looks first for the user's record on this event, then for their
    /// generic profile (whose contact is replaced), and only then creates a
    /// new record. In every case the event lists the attendee id once.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] for a missing event and
    /// [`Violation::RegistrationClosed`] for a completed or canceled one.
    pub fn register(
        &mut self,
        username: &str,
        event_id: u32,
        contact_info: &str,
    ) -> DeskResult<Registration> {
        let status = self.event(event_id)?.status;
        if !status.accepts_registrations() {
            return Err(Violation::RegistrationClosed { status }.into());
        }

        let scoped = self
            .attendees
            .find(|a| a.event_id == event_id && a.name_matches(username))
            .map(|a| a.id);
        let outcome = if let Some(attendee_id) = scoped {
            Registration::AlreadyRegistered { attendee_id }
        } else if let Some(profile) = self
            .attendees
            .find_mut(|a| a.is_generic() && a.name_matches(username))
        {
            profile.contact_info = contact_info.to_string();
            Registration::ReusedProfile {
                attendee_id: profile.id,
            }
        } else {
            let attendee_id = self.ids.attendees.allocate();
            self.attendees.push(Attendee {
                id: attendee_id,
                name: username.to_string(),
                contact_info: contact_info.to_string(),
                event_id,
                checked_in: false,
            });
            Registration::Created { attendee_id }
        };

        let event = self.event_mut(event_id)?;
        if !event.add_attendee(outcome.attendee_id()) {
            debug!(
                event_id,
                attendee_id = outcome.attendee_id(),
                "attendee already listed on event"
            );
        }
        info!(username, event_id, ?outcome, "registration");
        Ok(outcome)
    }

    /// Cancel `username`'s registration for an event by deleting their
    /// attendee record for that event and taking its id off the event.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] for a missing event and
    /// [`Violation::NotRegistered`] if the user has no record for the event.
    /// A generic profile listed on the event is not a registration for it.
    pub fn cancel(&mut self, username: &str, event_id: u32) -> DeskResult<Cancellation> {
        self.event(event_id)?;

        let Some(attendee_id) = self
            .attendees
            .find(|a| a.event_id == event_id && a.name_matches(username))
            .map(|a| a.id)
        else {
            return Err(Violation::NotRegistered {
                username: username.to_string(),
                event_id,
            }
            .into());
        };

        self.attendees.remove(attendee_id);
        self.event_mut(event_id)?.remove_attendee(attendee_id);
        info!(username, event_id, attendee_id, "registration canceled");
        Ok(Cancellation { attendee_id })
    }

    /// Check an attendee in for the event their record belongs to.
    ///
    /// Checking in twice is not an error: the second call reports
    /// [`CheckIn::AlreadyCheckedIn`].
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] for a missing event or attendee, and
    /// [`Violation::AttendeeNotForEvent`] if the record belongs elsewhere.
    pub fn check_in(&mut self, event_id: u32, attendee_id: u32) -> DeskResult<CheckIn> {
        self.event(event_id)?;
        let attendee = self.attendees.require_mut(attendee_id)?;
        if attendee.event_id != event_id {
            return Err(Violation::AttendeeNotForEvent {
                attendee_id,
                event_id,
            }
            .into());
        }
        let outcome = attendee.check_in();
        info!(event_id, attendee_id, ?outcome, "check-in");
        Ok(outcome)
    }

    /// Delete an event, returning its allocations to the pool and deleting
    /// every attendee record scoped to it.
    ///
    /// Allocations of items that no longer exist are dropped with the event.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no event has this id.
    pub fn delete_event(&mut self, event_id: u32) -> DeskResult<EventRemoval> {
        let mut event = self
            .events
            .remove(event_id)
            .ok_or_else(|| DeskError::not_found(RecordKind::Event, event_id))?;

        let held: Vec<(u32, u32)> = event
            .allocated_inventory
            .iter()
            .map(|(&item_id, &quantity)| (item_id, quantity))
            .collect();
        let mut returned = Vec::with_capacity(held.len());
        for (item_id, quantity) in held {
            if let Some(item) = self.inventory.get_mut(item_id) {
                let released = deallocate(item, &mut event, quantity)?;
                returned.push((item_id, released));
            }
        }

        let removed_attendees = self.attendees.remove_where(|a| a.event_id == event_id);

        info!(
            event_id,
            name = %event.name,
            attendees = removed_attendees.len(),
            items = returned.len(),
            "deleted event"
        );
        Ok(EventRemoval {
            event,
            removed_attendees,
            returned,
        })
    }

    /// Set the contact info on every attendee record named `username`.
    /// Creates a generic profile if the user has none.
    pub fn update_contact_info(&mut self, username: &str, contact_info: &str) -> ContactUpdate {
        let mut updated = Vec::new();
        let mut has_profile = false;
        for attendee in self.attendees.iter_mut().filter(|a| a.name_matches(username)) {
            attendee.contact_info = contact_info.to_string();
            has_profile |= attendee.is_generic();
            updated.push(attendee.id);
        }

        let created_profile = if has_profile {
            None
        } else {
            let id = self.ids.attendees.allocate();
            self.attendees.push(Attendee {
                id,
                name: username.to_string(),
                contact_info: contact_info.to_string(),
                event_id: GENERIC_EVENT_ID,
                checked_in: false,
            });
            Some(id)
        };

        info!(username, updated = updated.len(), ?created_profile, "contact info updated");
        ContactUpdate {
            updated,
            created_profile,
        }
    }

    /// Attendee records tied to `username`, generic profile included.
    #[must_use]
    pub fn registrations_for(&self, username: &str) -> Vec<&Attendee> {
        self.attendees
            .iter()
            .filter(|a| a.name_matches(username))
            .collect()
    }
}
