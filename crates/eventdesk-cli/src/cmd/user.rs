//! `evd user`: account administration.

use anyhow::Result;
use clap::{Args, Subcommand};
use eventdesk_core::model::{Operation, User};
use std::io::{self, Write};

use crate::cmd::Ctx;
use crate::output::{Renderable, render, render_list};
use crate::validate;

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account with any role.
    Create {
        username: String,
        #[arg(value_name = "PASSWORD")]
        new_password: String,
        /// Account role: admin or regular.
        #[arg(long, default_value = "regular")]
        role: String,
    },
    /// Delete an account. The logged-in account cannot delete itself.
    Delete { username: String },
    /// List every account.
    List,
}

impl Renderable for User {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "User ID: {}, Username: {}, Role: {}",
            self.id,
            self.username,
            self.role.label()
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}  {}  {}", self.id, self.username, self.role)
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "USERNAME", "ROLE"]
    }
}

/// # Errors
///
/// Fails on a refused login or role, invalid input, or a rejected or
/// unpersisted account change.
pub fn run_user(args: &UserArgs, ctx: &mut Ctx) -> Result<()> {
    let acting = ctx.require(Operation::ManageUsers)?;
    match &args.command {
        UserCommand::Create {
            username,
            new_password,
            role,
        } => {
            validate::validate_username(username)?;
            validate::validate_password(new_password)?;
            let role = validate::validate_role(role)?;
            let user = ctx.repo.create_user(username, new_password, role)?;
            render(ctx.output, &user, |u, w| {
                writeln!(
                    w,
                    "✓ {} '{}' created (ID: {}).",
                    u.role.label(),
                    u.username,
                    u.id
                )
            })
        }
        UserCommand::Delete { username } => {
            let removed = ctx.repo.delete_user(username, &acting.username)?;
            render(ctx.output, &removed, |u, w| {
                writeln!(w, "✓ User '{}' deleted.", u.username)
            })
        }
        UserCommand::List => render_list(ctx.repo.state().users().as_slice(), ctx.output, "No users."),
    }
}
