//! The single owning context for every table.
//!
//! [`DeskState`] holds the four stores and their id allocators. It is built
//! once by the repository and passed to every operation; nothing reaches
//! the tables any other way. Operations here cover accounts, the event
//! catalogue and the inventory catalogue. Allocation lives in
//! [`crate::allocation`] and registration in [`crate::registration`].

use tracing::{debug, info};

use crate::error::{DeskError, DeskResult, Violation};
use crate::ids::IdRegistry;
use crate::model::{
    Attendee, Event, EventDraft, EventPatch, EventStatus, InventoryItem, Record, RecordKind, Role,
    User,
};
use crate::repo::Table;
use crate::store::Store;
use crate::validate::{check_date, check_time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskState {
    pub(crate) users: Store<User>,
    pub(crate) events: Store<Event>,
    pub(crate) attendees: Store<Attendee>,
    pub(crate) inventory: Store<InventoryItem>,
    pub(crate) ids: IdRegistry,
    min_password_len: usize,
}

impl DeskState {
    /// An empty desk. Ids start at 1 in every table.
    #[must_use]
    pub fn new(min_password_len: usize) -> Self {
        Self {
            users: Store::new(),
            events: Store::new(),
            attendees: Store::new(),
            inventory: Store::new(),
            ids: IdRegistry::default(),
            min_password_len,
        }
    }

    /// Build from restored tables, seeding each allocator past the highest
    /// restored id.
    ///
    /// Stored allocated quantities are taken as-is; run
    /// [`reconcile_from_events`](Self::reconcile_from_events) afterwards.
    #[must_use]
    pub fn from_tables(
        users: Vec<User>,
        events: Vec<Event>,
        attendees: Vec<Attendee>,
        inventory: Vec<InventoryItem>,
        min_password_len: usize,
    ) -> Self {
        let mut state = Self {
            users: Store::from_records(users),
            events: Store::from_records(events),
            attendees: Store::from_records(attendees),
            inventory: Store::from_records(inventory),
            ids: IdRegistry::default(),
            min_password_len,
        };
        state.reseed_ids();
        state
    }

    fn reseed_ids(&mut self) {
        self.ids.users.observe_all(self.users.iter().map(Record::id));
        self.ids.events.observe_all(self.events.iter().map(Record::id));
        self.ids
            .attendees
            .observe_all(self.attendees.iter().map(Record::id));
        self.ids
            .inventory
            .observe_all(self.inventory.iter().map(Record::id));
    }

    #[must_use]
    pub const fn users(&self) -> &Store<User> {
        &self.users
    }

    #[must_use]
    pub const fn events(&self) -> &Store<Event> {
        &self.events
    }

    #[must_use]
    pub const fn attendees(&self) -> &Store<Attendee> {
        &self.attendees
    }

    #[must_use]
    pub const fn inventory(&self) -> &Store<InventoryItem> {
        &self.inventory
    }

    #[must_use]
    pub const fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no event has this id.
    pub fn event(&self, id: u32) -> DeskResult<&Event> {
        self.events.require(id)
    }

    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no item has this id.
    pub fn item(&self, id: u32) -> DeskResult<&InventoryItem> {
        self.inventory.require(id)
    }

    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no attendee has this id.
    pub fn attendee(&self, id: u32) -> DeskResult<&Attendee> {
        self.attendees.require(id)
    }

    pub(crate) fn event_mut(&mut self, id: u32) -> DeskResult<&mut Event> {
        self.events.require_mut(id)
    }

    pub(crate) fn item_mut(&mut self, id: u32) -> DeskResult<&mut InventoryItem> {
        self.inventory.require_mut(id)
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Exact, case-sensitive username lookup.
    #[must_use]
    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.find(|u| u.username == username)
    }

    /// Return the user whose username and password both match.
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        let user = self
            .users
            .find(|u| u.username == username && u.password == password);
        if user.is_none() {
            debug!(username, "authentication failed");
        }
        user
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// [`Violation::DuplicateUsername`] if the name is taken and
    /// [`Violation::PasswordTooShort`] if the password is under the
    /// configured minimum. Nothing is created in either case.
    pub fn create_user(&mut self, username: &str, password: &str, role: Role) -> DeskResult<&User> {
        if self.user_by_name(username).is_some() {
            return Err(Violation::DuplicateUsername(username.to_string()).into());
        }
        if password.chars().count() < self.min_password_len {
            return Err(Violation::PasswordTooShort {
                min: self.min_password_len,
            }
            .into());
        }

        let id = self.ids.users.allocate();
        info!(id, username, %role, "created user");
        Ok(self.users.push(User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            role,
        }))
    }

    /// Delete an account by username on behalf of `acting_username`.
    ///
    /// # Errors
    ///
    /// [`Violation::SelfDeletion`] when deleting the acting user, and
    /// [`DeskError::NotFound`] when no such username exists.
    pub fn delete_user(&mut self, username: &str, acting_username: &str) -> DeskResult<User> {
        if username == acting_username {
            return Err(Violation::SelfDeletion.into());
        }
        let id = self
            .user_by_name(username)
            .map(Record::id)
            .ok_or_else(|| DeskError::NotFound {
                kind: RecordKind::User,
                id: username.to_string(),
            })?;
        let removed = self
            .users
            .remove(id)
            .ok_or_else(|| DeskError::not_found(RecordKind::User, id))?;
        info!(id, username, "deleted user");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Event catalogue
    // -----------------------------------------------------------------------

    /// Create an upcoming event after checking its date and time.
    ///
    /// # Errors
    ///
    /// [`Violation::InvalidDate`] or [`Violation::InvalidTime`].
    pub fn create_event(&mut self, draft: EventDraft) -> DeskResult<&Event> {
        check_date(&draft.date)?;
        check_time(&draft.time)?;

        let id = self.ids.events.allocate();
        info!(id, name = %draft.name, "created event");
        Ok(self.events.push(Event::new(id, draft)))
    }

    /// Apply a partial edit. A new date or time is validated before any
    /// field changes.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`], [`Violation::InvalidDate`] or
    /// [`Violation::InvalidTime`].
    pub fn edit_event(&mut self, id: u32, patch: EventPatch) -> DeskResult<&Event> {
        if let Some(date) = &patch.date {
            check_date(date)?;
        }
        if let Some(time) = &patch.time {
            check_time(time)?;
        }
        let event = self.event_mut(id)?;
        event.apply(patch);
        debug!(id, "edited event");
        Ok(event)
    }

    /// Set any status from any status. Returns the previous one.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no event has this id.
    pub fn set_status(&mut self, id: u32, status: EventStatus) -> DeskResult<EventStatus> {
        let event = self.event_mut(id)?;
        let previous = std::mem::replace(&mut event.status, status);
        info!(id, from = %previous, to = %status, "event status changed");
        Ok(previous)
    }

    /// Events whose name contains `term` (ignoring case) or whose date
    /// contains it.
    #[must_use]
    pub fn search_events(&self, term: &str) -> Vec<&Event> {
        let needle = term.to_lowercase();
        self.events
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle) || e.date.contains(&needle))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Inventory catalogue
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// [`Violation::NonPositiveQuantity`] if `total_quantity` is zero.
    pub fn add_item(
        &mut self,
        name: &str,
        total_quantity: u32,
        description: &str,
    ) -> DeskResult<&InventoryItem> {
        if total_quantity == 0 {
            return Err(Violation::NonPositiveQuantity.into());
        }
        let id = self.ids.inventory.allocate();
        info!(id, name, total_quantity, "added inventory item");
        Ok(self.inventory.push(InventoryItem::new(
            id,
            name.to_string(),
            total_quantity,
            description.to_string(),
        )))
    }

    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no item has this id.
    pub fn rename_item(&mut self, id: u32, name: &str) -> DeskResult<&InventoryItem> {
        let item = self.item_mut(id)?;
        item.name = name.to_string();
        Ok(item)
    }

    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no item has this id.
    pub fn redescribe_item(&mut self, id: u32, description: &str) -> DeskResult<&InventoryItem> {
        let item = self.item_mut(id)?;
        item.description = description.to_string();
        Ok(item)
    }

    /// Case-insensitive exact name lookup.
    #[must_use]
    pub fn find_item_by_name(&self, name: &str) -> Option<&InventoryItem> {
        let wanted = name.to_lowercase();
        self.inventory.find(|i| i.name.to_lowercase() == wanted)
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    /// Fill empty tables with the demo accounts, events and items. Returns
    /// the tables that were seeded so the caller can save them.
    pub fn seed_if_empty(&mut self) -> Vec<Table> {
        let mut seeded = Vec::new();

        if self.users.is_empty() {
            for (username, password, role) in [
                ("admin", "adminpass", Role::Admin),
                ("user1", "user1pass", Role::RegularUser),
                ("user2", "user2pass", Role::RegularUser),
            ] {
                let id = self.ids.users.allocate();
                self.users.push(User {
                    id,
                    username: username.to_string(),
                    password: password.to_string(),
                    role,
                });
            }
            seeded.push(Table::Users);
        }

        if self.events.is_empty() {
            for draft in [
                EventDraft {
                    name: "Tech Conference 2025".to_string(),
                    date: "2025-10-20".to_string(),
                    time: "09:00".to_string(),
                    location: "Grand Hall".to_string(),
                    description: "Annual tech conference".to_string(),
                    category: "Conference".to_string(),
                },
                EventDraft {
                    name: "Summer Music Festival".to_string(),
                    date: "2025-07-15".to_string(),
                    time: "14:00".to_string(),
                    location: "City Park".to_string(),
                    description: "Outdoor music event".to_string(),
                    category: "Social".to_string(),
                },
            ] {
                let id = self.ids.events.allocate();
                self.events.push(Event::new(id, draft));
            }
            seeded.push(Table::Events);
        }

        if self.inventory.is_empty() {
            for (name, total, description) in [
                ("Projector", 5, "HD Projector"),
                ("Chairs", 100, "Standard chairs"),
            ] {
                let id = self.ids.inventory.allocate();
                self.inventory.push(InventoryItem::new(
                    id,
                    name.to_string(),
                    total,
                    description.to_string(),
                ));
            }
            seeded.push(Table::Inventory);
        }

        if !seeded.is_empty() {
            info!(?seeded, "seeded empty tables");
        }
        seeded
    }
}
