//! Argument checks the core does not make.
//!
//! Table files are comma-separated, so a `,` or line break inside a free-text
//! value would split the record on the next load. The CLI refuses such
//! values up front.

use std::fmt;

use eventdesk_core::Table;
use eventdesk_core::model::{EventStatus, Role};

use crate::output::CliError;

pub const MAX_NAME_LEN: usize = 120;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: &'static str,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(self.to_string(), self.suggestion.clone(), self.code)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': {}", self.field, self.value, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Free text stored in a table column.
pub fn validate_text(field: &'static str, s: &str) -> Result<(), ValidationError> {
    if s.contains(',') {
        return Err(ValidationError::new(
            field,
            s,
            "must not contain ','",
            "use another separator such as ' - ' or '/'",
            "invalid_text",
        ));
    }
    if s.chars().any(char::is_control) {
        return Err(ValidationError::new(
            field,
            s,
            "must not contain line breaks or control characters",
            "put the value on a single line",
            "invalid_text",
        ));
    }
    Ok(())
}

/// A name or title: non-empty free text of bounded length.
pub fn validate_name(field: &'static str, s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::new(
            field,
            s,
            "must not be empty",
            format!("provide a non-empty {field}"),
            "invalid_name",
        ));
    }
    if s.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            field,
            s,
            format!("must be <= {MAX_NAME_LEN} characters"),
            format!("shorten the {field}"),
            "invalid_name",
        ));
    }
    validate_text(field, s)
}

/// Usernames double as attendee names, so whitespace at either end would
/// make registrations hard to match.
pub fn validate_username(s: &str) -> Result<(), ValidationError> {
    if s.trim() != s {
        return Err(ValidationError::new(
            "username",
            s,
            "must not start or end with whitespace",
            "trim the username",
            "invalid_username",
        ));
    }
    validate_name("username", s)
}

pub fn validate_password(s: &str) -> Result<(), ValidationError> {
    validate_text("password", s)
}

pub fn validate_role(s: &str) -> Result<Role, ValidationError> {
    s.parse().map_err(|_| {
        ValidationError::new(
            "role",
            s,
            "unknown role",
            "use one of: admin, regular",
            "invalid_role",
        )
    })
}

pub fn validate_status(s: &str) -> Result<EventStatus, ValidationError> {
    s.parse().map_err(|_| {
        ValidationError::new(
            "status",
            s,
            "unknown status",
            "use one of: upcoming, ongoing, completed, canceled",
            "invalid_status",
        )
    })
}

pub fn validate_table(s: &str) -> Result<Table, ValidationError> {
    s.parse().map_err(|_| {
        ValidationError::new(
            "table",
            s,
            "unknown table",
            "use one of: users, events, attendees, inventory",
            "invalid_table",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_and_newlines_are_rejected() {
        assert!(validate_text("description", "Hall A, level 2").is_err());
        assert!(validate_text("description", "two\nlines").is_err());
        assert!(validate_text("description", "Hall A / level 2").is_ok());
        assert!(validate_text("description", "").is_ok());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("name", "Gala").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("carol").is_ok());
        assert!(validate_username(" carol").is_err());
        assert_eq!(
            validate_username("a,b").expect_err("comma").code,
            "invalid_text"
        );
    }

    #[test]
    fn enums_parse_leniently() {
        assert_eq!(validate_role("Admin").expect("role"), Role::Admin);
        assert_eq!(validate_role("regular").expect("role"), Role::RegularUser);
        assert!(validate_role("root").is_err());
        assert_eq!(
            validate_status("cancelled").expect("status"),
            EventStatus::Canceled
        );
        assert_eq!(validate_table("items").expect("table"), Table::Inventory);
        assert!(validate_table("goals").is_err());
    }

    #[test]
    fn error_renders_field_and_reason() {
        let err = validate_status("paused").expect_err("bad");
        assert_eq!(err.to_string(), "invalid status 'paused': unknown status");
        let cli = err.to_cli_error();
        assert_eq!(cli.error_code.as_deref(), Some("invalid_status"));
    }
}
