//! Login resolution and the role gate for CLI commands.
//!
//! Credentials come from `--user`/`--password` or `EVENTDESK_USER`/
//! `EVENTDESK_PASSWORD` (clap reads the environment). Every command except
//! `init`, `signup` and `completions` logs in first, then checks the
//! operation against the user's role.

use eventdesk_core::DeskState;
use eventdesk_core::model::{Operation, User};

use crate::output::CliError;

/// Errors from login resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    /// Human-readable description.
    pub message: String,
    /// Machine error code.
    pub code: &'static str,
}

impl SessionError {
    fn new(message: impl Into<String>, code: &'static str) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        let suggestion = match self.code {
            "missing_credentials" => "Pass --user and --password, or set EVENTDESK_USER and EVENTDESK_PASSWORD",
            _ => "Check the username and password; `evd signup` creates an account",
        };
        CliError::with_details(&self.message, suggestion, self.code)
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SessionError {}

/// Login details as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: Option<&str>, password: Option<&str>) -> Self {
        Self {
            username: username.filter(|u| !u.is_empty()).map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    /// Look the user up and check the password.
    ///
    /// # Errors
    ///
    /// `missing_credentials` if either half is absent, `invalid_credentials`
    /// if no account matches both.
    pub fn login<'a>(&self, state: &'a DeskState) -> Result<&'a User, SessionError> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return Err(SessionError::new(
                "this command requires a login",
                "missing_credentials",
            ));
        };
        state.authenticate(username, password).ok_or_else(|| {
            SessionError::new(
                "Login failed. Invalid username or password.",
                "invalid_credentials",
            )
        })
    }

    /// Log in and check that the user's role permits `operation`.
    ///
    /// # Errors
    ///
    /// A [`SessionError`] if login fails, or the role-forbidden
    /// [`eventdesk_core::DeskError`] if the role does not permit it.
    pub fn require(&self, state: &DeskState, operation: Operation) -> anyhow::Result<User> {
        let user = self.login(state)?;
        user.authorize(operation)
            .map_err(eventdesk_core::DeskError::from)?;
        tracing::debug!(user = %user.username, operation = operation.as_str(), "authorized");
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventdesk_core::{DeskError, Violation};

    fn seeded() -> DeskState {
        let mut state = DeskState::new(6);
        state.seed_if_empty();
        state
    }

    #[test]
    fn missing_password_is_reported() {
        let creds = Credentials::new(Some("admin"), None);
        let err = creds.login(&seeded()).expect_err("no password");
        assert_eq!(err.code, "missing_credentials");
    }

    #[test]
    fn empty_username_counts_as_missing() {
        let creds = Credentials::new(Some(""), Some("adminpass"));
        assert_eq!(creds.login(&seeded()).expect_err("empty").code, "missing_credentials");
    }

    #[test]
    fn wrong_password_is_rejected() {
        let creds = Credentials::new(Some("admin"), Some("nope"));
        assert_eq!(creds.login(&seeded()).expect_err("bad").code, "invalid_credentials");
    }

    #[test]
    fn admin_may_manage_inventory_but_not_register() {
        let state = seeded();
        let creds = Credentials::new(Some("admin"), Some("adminpass"));
        let user = creds
            .require(&state, Operation::ManageInventory)
            .expect("admin");
        assert_eq!(user.username, "admin");

        let err = creds
            .require(&state, Operation::RegisterForEvent)
            .expect_err("admins do not register");
        assert!(matches!(
            err.downcast_ref::<DeskError>(),
            Some(DeskError::Invariant(Violation::RoleForbidden { .. }))
        ));
    }

    #[test]
    fn regular_user_is_kept_out_of_admin_operations() {
        let state = seeded();
        let creds = Credentials::new(Some("user1"), Some("user1pass"));
        assert!(creds.require(&state, Operation::RegisterForEvent).is_ok());
        assert!(creds.require(&state, Operation::ManageUsers).is_err());
    }
}
