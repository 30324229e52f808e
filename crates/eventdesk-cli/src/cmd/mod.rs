pub mod attendee;
pub mod completions;
pub mod event;
pub mod export;
pub mod init;
pub mod inventory;
pub mod signup;
pub mod user;
pub mod whoami;

use anyhow::Result;
use eventdesk_core::Repository;
use eventdesk_core::model::{Operation, User};

use crate::output::OutputMode;
use crate::session::Credentials;

/// Everything a command needs once the tables are loaded.
pub struct Ctx {
    pub repo: Repository,
    pub output: OutputMode,
    pub credentials: Credentials,
}

impl Ctx {
    /// Log in and check `operation` against the session's role.
    ///
    /// # Errors
    ///
    /// Fails on missing or wrong credentials, or a role that does not
    /// permit the operation.
    pub fn require(&self, operation: Operation) -> Result<User> {
        self.credentials.require(self.repo.state(), operation)
    }
}

/// Resolve an item given either its numeric id or its name.
///
/// # Errors
///
/// `NotFound` if neither an id nor a case-insensitive name matches.
pub fn resolve_item(ctx: &Ctx, raw: &str) -> Result<u32> {
    let state = ctx.repo.state();
    if let Ok(id) = raw.trim().parse::<u32>() {
        return Ok(state.item(id)?.id);
    }
    state
        .find_item_by_name(raw)
        .map(|item| item.id)
        .ok_or_else(|| {
            eventdesk_core::DeskError::NotFound {
                kind: eventdesk_core::model::RecordKind::InventoryItem,
                id: raw.to_string(),
            }
            .into()
        })
}
