//! Repository facade: table files on disk to [`DeskState`] and back.
//!
//! # Load
//!
//! Each table file is read whole. A missing file is an empty table. Every
//! non-blank line goes through the line codec; lines that fail are skipped
//! and returned as [`Diagnostic`]s. After all four tables are read, id
//! allocators are seeded from the restored ids and allocated quantities are
//! rebuilt from the events table.
//!
//! # Save
//!
//! Saving a table truncates and rewrites its file. Every mutating method
//! on [`Repository`] saves the tables it touched before returning. There is
//! no multi-file commit: if the events save fails after the inventory save
//! succeeded, the next load's reconciliation repairs the inventory side.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::allocation::ReconcileReport;
use crate::codec::{Decoded, Diagnostic, LineCodec, decode_table, encode_table};
use crate::config::DeskConfig;
use crate::error::{DeskError, DeskResult};
use crate::model::{
    Attendee, CheckIn, Event, EventDraft, EventPatch, EventStatus, InventoryItem, ParseEnumError,
    Role, User,
};
use crate::registration::{Cancellation, ContactUpdate, EventRemoval, Registration};
use crate::state::DeskState;

/// One of the four persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Users,
    Events,
    Attendees,
    Inventory,
}

impl Table {
    pub const ALL: [Self; 4] = [Self::Users, Self::Events, Self::Attendees, Self::Inventory];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Events => "events",
            Self::Attendees => "attendees",
            Self::Inventory => "inventory",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "user" => Ok(Self::Users),
            "events" | "event" => Ok(Self::Events),
            "attendees" | "attendee" => Ok(Self::Attendees),
            "inventory" | "items" => Ok(Self::Inventory),
            _ => Err(ParseEnumError {
                expected: "table",
                got: s.to_string(),
            }),
        }
    }
}

/// What a load found besides the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Skipped lines, in table then line order.
    pub diagnostics: Vec<Diagnostic>,
    /// Tables whose file did not exist.
    pub missing: Vec<Table>,
    pub reconcile: ReconcileReport,
    /// Tables filled with demo data because they were empty.
    pub seeded: Vec<Table>,
}

/// The loaded desk plus the directory it persists to.
#[derive(Debug)]
pub struct Repository {
    dir: PathBuf,
    config: DeskConfig,
    state: DeskState,
}

impl Repository {
    /// Load every table from `dir`, then seed empty tables if the config
    /// allows it and save whatever was seeded.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created, a table file exists but
    /// cannot be read, or a seeded table cannot be written.
    pub fn open(dir: impl Into<PathBuf>, config: DeskConfig) -> Result<(Self, LoadReport)> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

        let (mut repo, mut report) = Self::load_all(dir, config)?;
        if repo.config.seed.enabled {
            report.seeded = repo.state.seed_if_empty();
            repo.save(&report.seeded)?;
        }
        Ok((repo, report))
    }

    /// Load every table from `dir` without seeding.
    ///
    /// # Errors
    ///
    /// Fails only if a table file exists but cannot be read.
    pub fn load_all(dir: impl Into<PathBuf>, config: DeskConfig) -> Result<(Self, LoadReport)> {
        let dir = dir.into();
        let mut report = LoadReport::default();

        let users: Vec<User> = load_table(&dir, &config, &mut report)?;
        let events: Vec<Event> = load_table(&dir, &config, &mut report)?;
        let attendees: Vec<Attendee> = load_table(&dir, &config, &mut report)?;
        let inventory: Vec<InventoryItem> = load_table(&dir, &config, &mut report)?;

        let mut state = DeskState::from_tables(
            users,
            events,
            attendees,
            inventory,
            config.accounts.min_password_len,
        );
        report.reconcile = state.reconcile_from_events();

        info!(
            dir = %dir.display(),
            users = state.users().len(),
            events = state.events().len(),
            attendees = state.attendees().len(),
            inventory = state.inventory().len(),
            skipped = report.diagnostics.len(),
            "loaded tables"
        );
        Ok((Self { dir, config, state }, report))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub const fn config(&self) -> &DeskConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &DeskState {
        &self.state
    }

    #[must_use]
    pub fn path_for(&self, table: Table) -> PathBuf {
        self.dir.join(self.config.files.file_name(table))
    }

    /// Rewrite every table file.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub fn save_all(&self) -> DeskResult<()> {
        self.save(&Table::ALL)
    }

    /// Rewrite the given table files. A failed table is logged and skipped;
    /// the rest are still written. The first failure is returned.
    ///
    /// # Errors
    ///
    /// [`DeskError::Persist`] naming the first table that failed.
    pub fn save(&self, tables: &[Table]) -> DeskResult<()> {
        let mut first_failure = None;
        for &table in tables {
            let path = self.path_for(table);
            let body = match table {
                Table::Users => encode_table(self.state.users()),
                Table::Events => encode_table(self.state.events()),
                Table::Attendees => encode_table(self.state.attendees()),
                Table::Inventory => encode_table(self.state.inventory()),
            };
            match std::fs::write(&path, body) {
                Ok(()) => debug!(%table, path = %path.display(), "saved table"),
                Err(source) => {
                    error!(%table, path = %path.display(), error = %source, "table save failed");
                    if first_failure.is_none() {
                        first_failure = Some(DeskError::Persist { table, source });
                    }
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    /// Run `op` against the state and save `tables` if it succeeded.
    fn commit<T>(
        &mut self,
        tables: &[Table],
        op: impl FnOnce(&mut DeskState) -> DeskResult<T>,
    ) -> DeskResult<T> {
        let out = op(&mut self.state)?;
        self.save(tables)?;
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Persisting wrappers around the engines
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`DeskState::create_user`], plus [`DeskError::Persist`].
    pub fn create_user(&mut self, username: &str, password: &str, role: Role) -> DeskResult<User> {
        self.commit(&[Table::Users], |s| {
            s.create_user(username, password, role).cloned()
        })
    }

    /// # Errors
    ///
    /// See [`DeskState::delete_user`], plus [`DeskError::Persist`].
    pub fn delete_user(&mut self, username: &str, acting_username: &str) -> DeskResult<User> {
        self.commit(&[Table::Users], |s| s.delete_user(username, acting_username))
    }

    /// # Errors
    ///
    /// See [`DeskState::create_event`], plus [`DeskError::Persist`].
    pub fn create_event(&mut self, draft: EventDraft) -> DeskResult<Event> {
        self.commit(&[Table::Events], |s| s.create_event(draft).cloned())
    }

    /// # Errors
    ///
    /// See [`DeskState::edit_event`], plus [`DeskError::Persist`].
    pub fn edit_event(&mut self, id: u32, patch: EventPatch) -> DeskResult<Event> {
        self.commit(&[Table::Events], |s| s.edit_event(id, patch).cloned())
    }

    /// # Errors
    ///
    /// See [`DeskState::set_status`], plus [`DeskError::Persist`].
    pub fn set_status(&mut self, id: u32, status: EventStatus) -> DeskResult<EventStatus> {
        self.commit(&[Table::Events], |s| s.set_status(id, status))
    }

    /// # Errors
    ///
    /// See [`DeskState::delete_event`], plus [`DeskError::Persist`].
    pub fn delete_event(&mut self, id: u32) -> DeskResult<EventRemoval> {
        self.commit(
            &[Table::Events, Table::Inventory, Table::Attendees],
            |s| s.delete_event(id),
        )
    }

    /// # Errors
    ///
    /// See [`DeskState::add_item`], plus [`DeskError::Persist`].
    pub fn add_item(
        &mut self,
        name: &str,
        total_quantity: u32,
        description: &str,
    ) -> DeskResult<InventoryItem> {
        self.commit(&[Table::Inventory], |s| {
            s.add_item(name, total_quantity, description).cloned()
        })
    }

    /// # Errors
    ///
    /// See [`DeskState::rename_item`], plus [`DeskError::Persist`].
    pub fn rename_item(&mut self, id: u32, name: &str) -> DeskResult<InventoryItem> {
        self.commit(&[Table::Inventory], |s| s.rename_item(id, name).cloned())
    }

    /// # Errors
    ///
    /// See [`DeskState::redescribe_item`], plus [`DeskError::Persist`].
    pub fn redescribe_item(&mut self, id: u32, description: &str) -> DeskResult<InventoryItem> {
        self.commit(&[Table::Inventory], |s| {
            s.redescribe_item(id, description).cloned()
        })
    }

    /// # Errors
    ///
    /// See [`DeskState::set_total_quantity`], plus [`DeskError::Persist`].
    pub fn set_total_quantity(&mut self, id: u32, new_total: u32) -> DeskResult<()> {
        self.commit(&[Table::Inventory], |s| s.set_total_quantity(id, new_total))
    }

    /// Inventory is saved before events, so a crash in between leaves the
    /// item side ahead; reconciliation on the next load corrects it.
    ///
    /// # Errors
    ///
    /// See [`DeskState::allocate`], plus [`DeskError::Persist`].
    pub fn allocate(&mut self, event_id: u32, item_id: u32, quantity: u32) -> DeskResult<()> {
        self.commit(&[Table::Inventory, Table::Events], |s| {
            s.allocate(event_id, item_id, quantity)
        })
    }

    /// # Errors
    ///
    /// See [`DeskState::deallocate`], plus [`DeskError::Persist`].
    pub fn deallocate(&mut self, event_id: u32, item_id: u32, quantity: u32) -> DeskResult<u32> {
        self.commit(&[Table::Inventory, Table::Events], |s| {
            s.deallocate(event_id, item_id, quantity)
        })
    }

    /// # Errors
    ///
    /// See [`DeskState::register`], plus [`DeskError::Persist`].
    pub fn register(
        &mut self,
        username: &str,
        event_id: u32,
        contact_info: &str,
    ) -> DeskResult<Registration> {
        self.commit(&[Table::Events, Table::Attendees], |s| {
            s.register(username, event_id, contact_info)
        })
    }

    /// # Errors
    ///
    /// See [`DeskState::cancel`], plus [`DeskError::Persist`].
    pub fn cancel(&mut self, username: &str, event_id: u32) -> DeskResult<Cancellation> {
        self.commit(&[Table::Events, Table::Attendees], |s| {
            s.cancel(username, event_id)
        })
    }

    /// # Errors
    ///
    /// See [`DeskState::check_in`], plus [`DeskError::Persist`].
    pub fn check_in(&mut self, event_id: u32, attendee_id: u32) -> DeskResult<CheckIn> {
        self.commit(&[Table::Attendees], |s| s.check_in(event_id, attendee_id))
    }

    /// # Errors
    ///
    /// [`DeskError::Persist`] if the attendees table cannot be written.
    pub fn update_contact_info(
        &mut self,
        username: &str,
        contact_info: &str,
    ) -> DeskResult<ContactUpdate> {
        self.commit(&[Table::Attendees], |s| {
            Ok(s.update_contact_info(username, contact_info))
        })
    }
}

fn load_table<T: LineCodec>(
    dir: &Path,
    config: &DeskConfig,
    report: &mut LoadReport,
) -> Result<Vec<T>> {
    let path = dir.join(config.files.file_name(T::TABLE));
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(table = %T::TABLE, path = %path.display(), "table file missing, starting empty");
            report.missing.push(T::TABLE);
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let Decoded {
        records,
        diagnostics,
    } = decode_table::<T>(&text);
    report.diagnostics.extend(diagnostics);
    Ok(records)
}
