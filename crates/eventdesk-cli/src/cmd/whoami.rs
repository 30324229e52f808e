//! `evd whoami`: the logged-in account and its registrations.

use anyhow::Result;
use clap::Args;
use eventdesk_core::model::{Attendee, Operation, Role, User};
use serde::Serialize;
use std::io::Write;

use crate::cmd::Ctx;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

#[derive(Debug, Serialize)]
struct Profile<'a> {
    #[serde(flatten)]
    user: User,
    registrations: Vec<&'a Attendee>,
}

/// # Errors
///
/// Fails if the credentials do not log in.
pub fn run_whoami(_args: &WhoamiArgs, ctx: &Ctx) -> Result<()> {
    let user = ctx.require(Operation::ViewProfile)?;
    let registrations = if user.role == Role::RegularUser {
        ctx.repo.state().registrations_for(&user.username)
    } else {
        Vec::new()
    };
    let profile = Profile {
        user,
        registrations,
    };

    render_mode(
        ctx.output,
        &profile,
        |p, w| {
            writeln!(
                w,
                "User ID: {}, Username: {}, Role: {}",
                p.user.id,
                p.user.username,
                p.user.role.label()
            )
        },
        |p, w| {
            pretty_section(w, &format!("{} ({})", p.user.username, p.user.role.label()))?;
            pretty_kv(w, "User ID", p.user.id.to_string())?;
            if p.user.role == Role::RegularUser {
                if p.registrations.is_empty() {
                    pretty_kv(w, "Registered", "no events")?;
                }
                for attendee in &p.registrations {
                    let scope = if attendee.is_generic() {
                        "profile".to_string()
                    } else {
                        format!("event {}", attendee.event_id)
                    };
                    pretty_kv(
                        w,
                        "Registered",
                        format!("{scope} as attendee {} ({})", attendee.id, attendee.contact_info),
                    )?;
                }
            }
            Ok(())
        },
    )
}
