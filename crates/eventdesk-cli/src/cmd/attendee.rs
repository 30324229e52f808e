//! `evd attendee`: registrations, check-in and attendance.
//!
//! `register`, `cancel` and `contact` act on the logged-in regular user. The
//! rest are admin operations on a whole event.

use anyhow::Result;
use clap::{Args, Subcommand};
use eventdesk_core::export::write_attendee_list;
use eventdesk_core::model::{CheckIn, Operation};
use eventdesk_core::registration::Registration;
use eventdesk_core::report::{AttendanceReport, AttendeeLine, EventView, UNKNOWN_ATTENDEE};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cmd::Ctx;
use crate::output::{Renderable, render, render_list};
use crate::validate;

#[derive(Args, Debug)]
pub struct AttendeeArgs {
    #[command(subcommand)]
    pub command: AttendeeCommand,
}

#[derive(Subcommand, Debug)]
pub enum AttendeeCommand {
    /// Register yourself for an event.
    Register {
        event_id: u32,
        /// Contact info stored on the attendee record.
        #[arg(long)]
        contact: String,
    },
    /// Cancel your registration for an event.
    Cancel { event_id: u32 },
    /// Update the contact info on all of your attendee records.
    Contact { contact: String },
    /// List the attendees of an event.
    List { event_id: u32 },
    /// Check an attendee in.
    Checkin { event_id: u32, attendee_id: u32 },
    /// Attendance report for an event.
    Report { event_id: u32 },
    /// Write `attendees_event_<id>.txt`.
    Export {
        event_id: u32,
        /// Directory to write into. Defaults to the data directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

impl Renderable for AttendeeLine {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        if self.known {
            writeln!(
                w,
                "  - {} (ID: {}, Contact: {}, {})",
                self.name,
                self.id,
                self.contact_info,
                if self.checked_in {
                    "Checked In"
                } else {
                    "Not Checked In"
                }
            )
        } else {
            writeln!(w, "  - {UNKNOWN_ATTENDEE} (ID: {})", self.id)
        }
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}",
            self.id, self.checked_in, self.name, self.contact_info
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "CHECKED_IN", "NAME", "CONTACT"]
    }
}

#[derive(Debug, Serialize)]
struct CheckInResult {
    event_id: u32,
    attendee_id: u32,
    outcome: CheckIn,
}

#[derive(Debug, Serialize)]
struct Exported {
    path: PathBuf,
}

fn describe_registration(outcome: Registration, event_id: u32) -> String {
    match outcome {
        Registration::Created { attendee_id } => {
            format!("Registered for event {event_id} (attendee ID: {attendee_id}).")
        }
        Registration::ReusedProfile { attendee_id } => format!(
            "Registered for event {event_id} using your existing profile (attendee ID: {attendee_id})."
        ),
        Registration::AlreadyRegistered { attendee_id } => format!(
            "You are already registered for event {event_id} (attendee ID: {attendee_id})."
        ),
    }
}

/// # Errors
///
/// Fails on a refused login or role, invalid input, a missing event or
/// attendee, a rejected registration change, or an unwritable file.
pub fn run_attendee(args: &AttendeeArgs, ctx: &mut Ctx) -> Result<()> {
    match &args.command {
        AttendeeCommand::Register { event_id, contact } => {
            let user = ctx.require(Operation::RegisterForEvent)?;
            validate::validate_text("contact", contact)?;
            let outcome = ctx.repo.register(&user.username, *event_id, contact)?;
            let event_id = *event_id;
            render(ctx.output, &outcome, |o, w| {
                writeln!(w, "✓ {}", describe_registration(*o, event_id))
            })
        }
        AttendeeCommand::Cancel { event_id } => {
            let user = ctx.require(Operation::CancelRegistration)?;
            let cancellation = ctx.repo.cancel(&user.username, *event_id)?;
            let event_id = *event_id;
            render(ctx.output, &cancellation, |c, w| {
                writeln!(
                    w,
                    "✓ Registration for event {event_id} canceled (attendee ID: {}).",
                    c.attendee_id
                )
            })
        }
        AttendeeCommand::Contact { contact } => {
            let user = ctx.require(Operation::UpdateContactInfo)?;
            validate::validate_text("contact", contact)?;
            let update = ctx.repo.update_contact_info(&user.username, contact)?;
            render(ctx.output, &update, |u, w| {
                let mut touched = u.updated.len();
                if u.created_profile.is_some() {
                    touched += 1;
                }
                writeln!(w, "✓ Contact info updated on {touched} attendee record(s).")
            })
        }
        AttendeeCommand::List { event_id } => {
            ctx.require(Operation::ManageAttendees)?;
            let state = ctx.repo.state();
            let view = EventView::build(state, state.event(*event_id)?);
            render_list(
                &view.attendees,
                ctx.output,
                "No attendees registered for this event.",
            )
        }
        AttendeeCommand::Checkin {
            event_id,
            attendee_id,
        } => {
            ctx.require(Operation::ManageAttendees)?;
            let outcome = ctx.repo.check_in(*event_id, *attendee_id)?;
            let result = CheckInResult {
                event_id: *event_id,
                attendee_id: *attendee_id,
                outcome,
            };
            render(ctx.output, &result, |r, w| match r.outcome {
                CheckIn::CheckedIn => writeln!(w, "✓ Attendee {} checked in.", r.attendee_id),
                CheckIn::AlreadyCheckedIn => {
                    writeln!(w, "Attendee {} is already checked in.", r.attendee_id)
                }
            })
        }
        AttendeeCommand::Report { event_id } => {
            ctx.require(Operation::ManageAttendees)?;
            let report = AttendanceReport::build(ctx.repo.state(), *event_id)?;
            render(ctx.output, &report, |r, w| write!(w, "{}", r.render_text()))
        }
        AttendeeCommand::Export { event_id, out_dir } => {
            ctx.require(Operation::ManageAttendees)?;
            let dir = out_dir
                .clone()
                .unwrap_or_else(|| ctx.repo.dir().to_path_buf());
            let path = write_attendee_list(&dir, ctx.repo.state(), *event_id)?;
            render(ctx.output, &Exported { path }, |e, w| {
                writeln!(w, "✓ Attendee list written to {}", e.path.display())
            })
        }
    }
}
