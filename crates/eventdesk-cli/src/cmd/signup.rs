//! `evd signup`: create an account without logging in.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use crate::cmd::Ctx;
use crate::output::render;
use crate::validate;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Username for the new account. Also used as the attendee name.
    pub username: String,

    /// Password for the new account.
    #[arg(value_name = "PASSWORD")]
    pub new_password: String,

    /// Account role: admin or regular.
    #[arg(long, default_value = "regular")]
    pub role: String,
}

/// # Errors
///
/// Fails on invalid input, a taken username, a short password, or if the
/// users table cannot be written.
pub fn run_signup(args: &SignupArgs, ctx: &mut Ctx) -> Result<()> {
    validate::validate_username(&args.username)?;
    validate::validate_password(&args.new_password)?;
    let role = validate::validate_role(&args.role)?;

    let user = ctx.repo.create_user(&args.username, &args.new_password, role)?;
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
