use std::fmt;

use crate::model::{EventStatus, RecordKind};
use crate::repo::Table;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    RecordNotFound,
    MalformedRecord,
    QuantityInvariant,
    DuplicateUsername,
    WeakPassword,
    RegistrationClosed,
    MembershipMismatch,
    InvalidSchedule,
    PermissionDenied,
    TableWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::RecordNotFound => "E2001",
            Self::MalformedRecord => "E2002",
            Self::QuantityInvariant => "E3001",
            Self::DuplicateUsername => "E3002",
            Self::WeakPassword => "E3003",
            Self::RegistrationClosed => "E3004",
            Self::MembershipMismatch => "E3005",
            Self::InvalidSchedule => "E3006",
            Self::PermissionDenied => "E4001",
            Self::TableWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::RecordNotFound => "Record not found",
            Self::MalformedRecord => "Malformed table line",
            Self::QuantityInvariant => "Inventory quantity rule violated",
            Self::DuplicateUsername => "Username already exists",
            Self::WeakPassword => "Password too short",
            Self::RegistrationClosed => "Event is not open for registration",
            Self::MembershipMismatch => "Attendee is not registered for this event",
            Self::InvalidSchedule => "Invalid date or time",
            Self::PermissionDenied => "Operation not allowed for this role",
            Self::TableWriteFailed => "Table file write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in eventdesk.toml and retry."),
            Self::RecordNotFound => Some("List records first to find a valid id."),
            Self::MalformedRecord => {
                Some("Edit the table file by hand; values must not contain ',' ';' or ':'.")
            }
            Self::QuantityInvariant => {
                Some("Check available quantity with `evd inventory list` first.")
            }
            Self::DuplicateUsername => Some("Pick a different username."),
            Self::WeakPassword => Some("Use a longer password."),
            Self::RegistrationClosed => Some("Only upcoming or ongoing events accept registrations."),
            Self::MembershipMismatch => None,
            Self::InvalidSchedule => Some("Dates are YYYY-MM-DD and times are HH:MM (24h)."),
            Self::PermissionDenied => Some("Log in with an account that has the required role."),
            Self::TableWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The reason an operation was rejected without touching any record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("quantity must be positive")]
    NonPositiveQuantity,

    #[error("cannot allocate {requested}: only {available} available")]
    OverAllocation { requested: u32, available: u32 },

    #[error("new total {requested} is below the {allocated} already allocated")]
    TotalBelowAllocated { requested: u32, allocated: u32 },

    #[error("item {item_id} is not allocated to event {event_id}")]
    NotAllocated { item_id: u32, event_id: u32 },

    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("cannot register for a {status} event")]
    RegistrationClosed { status: EventStatus },

    #[error("'{username}' is not registered for event {event_id}")]
    NotRegistered { username: String, event_id: u32 },

    #[error("attendee {attendee_id} is not registered for event {event_id}")]
    AttendeeNotForEvent { attendee_id: u32, event_id: u32 },

    #[error("cannot delete the currently logged-in user")]
    SelfDeletion,

    #[error("operation '{operation}' is not permitted for this role")]
    RoleForbidden { operation: &'static str },

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid time '{0}' (expected HH:MM, 24-hour)")]
    InvalidTime(String),
}

impl Violation {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NonPositiveQuantity
            | Self::OverAllocation { .. }
            | Self::TotalBelowAllocated { .. }
            | Self::NotAllocated { .. } => ErrorCode::QuantityInvariant,
            Self::DuplicateUsername(_) => ErrorCode::DuplicateUsername,
            Self::PasswordTooShort { .. } => ErrorCode::WeakPassword,
            Self::RegistrationClosed { .. } => ErrorCode::RegistrationClosed,
            Self::NotRegistered { .. } | Self::AttendeeNotForEvent { .. } => {
                ErrorCode::MembershipMismatch
            }
            Self::SelfDeletion | Self::RoleForbidden { .. } => ErrorCode::PermissionDenied,
            Self::InvalidDate(_) | Self::InvalidTime(_) => ErrorCode::InvalidSchedule,
        }
    }
}

/// Error returned by every fallible desk operation.
///
/// A rejected operation never leaves a partial in-memory mutation behind.
/// [`DeskError::Persist`] is the exception: memory already holds the change,
/// only the named table failed to reach disk.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: String },

    #[error(transparent)]
    Invariant(#[from] Violation),

    #[error("failed to write {table} table: {source}")]
    Persist {
        table: Table,
        #[source]
        source: std::io::Error,
    },
}

impl DeskError {
    /// Shorthand for a missing record addressed by numeric id.
    #[must_use]
    pub fn not_found(kind: RecordKind, id: u32) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::RecordNotFound,
            Self::Invariant(v) => v.code(),
            Self::Persist { .. } => ErrorCode::TableWriteFailed,
        }
    }

    /// Remediation hint for the error, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
