use serde::Serialize;
use std::{fmt, str::FromStr};

use super::{ParseEnumError, Record, RecordKind, normalize};
use crate::error::Violation;

/// Account role. Determines which [`Operation`]s a user may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    RegularUser,
}

/// Every user-facing operation the desk exposes, for role gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ManageUsers,
    ManageEvents,
    ManageAttendees,
    ManageInventory,
    ExportData,
    ViewEvents,
    SearchEvents,
    RegisterForEvent,
    CancelRegistration,
    UpdateContactInfo,
    ViewProfile,
}

const ADMIN_OPERATIONS: &[Operation] = &[
    Operation::ManageUsers,
    Operation::ManageEvents,
    Operation::ManageAttendees,
    Operation::ManageInventory,
    Operation::ExportData,
    Operation::ViewEvents,
    Operation::SearchEvents,
    Operation::ViewProfile,
];

const REGULAR_OPERATIONS: &[Operation] = &[
    Operation::ViewEvents,
    Operation::SearchEvents,
    Operation::RegisterForEvent,
    Operation::CancelRegistration,
    Operation::UpdateContactInfo,
    Operation::ViewProfile,
];

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageUsers => "manage users",
            Self::ManageEvents => "manage events",
            Self::ManageAttendees => "manage attendees",
            Self::ManageInventory => "manage inventory",
            Self::ExportData => "export data",
            Self::ViewEvents => "view events",
            Self::SearchEvents => "search events",
            Self::RegisterForEvent => "register for event",
            Self::CancelRegistration => "cancel registration",
            Self::UpdateContactInfo => "update contact info",
            Self::ViewProfile => "view profile",
        }
    }
}

impl Role {
    /// On-disk ordinal (`0` = admin, `1` = regular user).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Admin => 0,
            Self::RegularUser => 1,
        }
    }

    /// Inverse of [`Role::ordinal`]. Ordinal `2` (no role) and anything
    /// else yields `None`.
    #[must_use]
    pub const fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Admin),
            1 => Some(Self::RegularUser),
            _ => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::RegularUser => "regular_user",
        }
    }

    /// Human label used in profile output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::RegularUser => "Regular User",
        }
    }

    /// The dispatch table for this role.
    #[must_use]
    pub const fn operations(self) -> &'static [Operation] {
        match self {
            Self::Admin => ADMIN_OPERATIONS,
            Self::RegularUser => REGULAR_OPERATIONS,
        }
    }

    #[must_use]
    pub fn permits(self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "admin" => Ok(Self::Admin),
            "regular_user" | "regular" | "user" => Ok(Self::RegularUser),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

/// A login account. Usernames are unique across the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Check `operation` against this user's role.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::RoleForbidden`] if the role's dispatch table
    /// does not list the operation.
    pub fn authorize(&self, operation: Operation) -> Result<(), Violation> {
        if self.role.permits(operation) {
            Ok(())
        } else {
            Err(Violation::RoleForbidden {
                operation: operation.as_str(),
            })
        }
    }
}

impl Record for User {
    const KIND: RecordKind = RecordKind::User;

    fn id(&self) -> u32 {
        self.id
    }
}
