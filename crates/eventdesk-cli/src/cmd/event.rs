//! `evd event`: the event catalogue.

use anyhow::Result;
use clap::{Args, Subcommand};
use eventdesk_core::model::{Event, EventDraft, EventPatch, Operation};
use eventdesk_core::report::EventView;
use serde::Serialize;
use std::io::{self, Write};

use crate::cmd::Ctx;
use crate::output::{Renderable, pretty_kv, render, render_list, render_mode};
use crate::validate::{self, ValidationError};

#[derive(Args, Debug)]
pub struct EventArgs {
    #[command(subcommand)]
    pub command: EventCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Create an upcoming event.
    Create(CreateArgs),
    /// List events, optionally by status.
    List {
        /// Only events with this status.
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one event with its attendees and allocations.
    Show { id: u32 },
    /// Find events by name (ignoring case) or date.
    Search { term: String },
    /// Change an event's descriptive fields.
    Edit(EditArgs),
    /// Set an event's status.
    Status { id: u32, status: String },
    /// Delete an event, its attendee records and its allocations.
    Delete { id: u32 },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,
    /// Date as YYYY-MM-DD.
    #[arg(long)]
    pub date: String,
    /// Time as HH:MM (24-hour).
    #[arg(long)]
    pub time: String,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub category: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: u32,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
}

impl Renderable for Event {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "ID: {}, Name: {}, Date: {}, Time: {}, Location: {}, Status: {}",
            self.id, self.name, self.date, self.time, self.location, self.status
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}",
            self.id, self.date, self.time, self.status, self.attendee_ids.len(), self.name
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "DATE", "TIME", "STATUS", "ATTENDEES", "NAME"]
    }
}

#[derive(Debug, Serialize)]
struct StatusChange {
    id: u32,
    from: eventdesk_core::model::EventStatus,
    to: eventdesk_core::model::EventStatus,
}

fn check_draft(args: &CreateArgs) -> Result<EventDraft, ValidationError> {
    validate::validate_name("name", &args.name)?;
    validate::validate_text("location", &args.location)?;
    validate::validate_text("description", &args.description)?;
    validate::validate_text("category", &args.category)?;
    Ok(EventDraft {
        name: args.name.clone(),
        date: args.date.clone(),
        time: args.time.clone(),
        location: args.location.clone(),
        description: args.description.clone(),
        category: args.category.clone(),
    })
}

fn check_patch(args: &EditArgs) -> Result<EventPatch, ValidationError> {
    if let Some(name) = &args.name {
        validate::validate_name("name", name)?;
    }
    for (field, value) in [
        ("location", &args.location),
        ("description", &args.description),
        ("category", &args.category),
    ] {
        if let Some(value) = value {
            validate::validate_text(field, value)?;
        }
    }
    let patch = EventPatch {
        name: args.name.clone(),
        date: args.date.clone(),
        time: args.time.clone(),
        location: args.location.clone(),
        description: args.description.clone(),
        category: args.category.clone(),
    };
    if patch.is_empty() {
        return Err(ValidationError::new(
            "edit",
            args.id.to_string(),
            "no fields to change",
            "pass at least one of --name --date --time --location --description --category",
            "empty_edit",
        ));
    }
    Ok(patch)
}

/// # Errors
///
/// Fails on a refused login or role, invalid input, a missing event, or a
/// table that cannot be written.
pub fn run_event(args: &EventArgs, ctx: &mut Ctx) -> Result<()> {
    match &args.command {
        EventCommand::Create(create) => {
            ctx.require(Operation::ManageEvents)?;
            let draft = check_draft(create)?;
            let event = ctx.repo.create_event(draft)?;
            render(ctx.output, &event, |e, w| {
                writeln!(w, "✓ Event '{}' created (ID: {}).", e.name, e.id)
            })
        }
        EventCommand::List { status } => {
            ctx.require(Operation::ViewEvents)?;
            let status = status.as_deref().map(validate::validate_status).transpose()?;
            let events: Vec<Event> = ctx
                .repo
                .state()
                .events()
                .iter()
                .filter(|e| status.is_none_or(|s| e.status == s))
                .cloned()
                .collect();
            render_list(&events, ctx.output, "No events.")
        }
        EventCommand::Show { id } => {
            ctx.require(Operation::ViewEvents)?;
            let state = ctx.repo.state();
            let view = EventView::build(state, state.event(*id)?);
            render(ctx.output, &view, |v, w| write!(w, "{}", v.render_text()))
        }
        EventCommand::Search { term } => {
            ctx.require(Operation::SearchEvents)?;
            let found: Vec<Event> = ctx
                .repo
                .state()
                .search_events(term)
                .into_iter()
                .cloned()
                .collect();
            render_list(&found, ctx.output, "No events found matching your criteria.")
        }
        EventCommand::Edit(edit) => {
            ctx.require(Operation::ManageEvents)?;
            let patch = check_patch(edit)?;
            let event = ctx.repo.edit_event(edit.id, patch)?;
            render(ctx.output, &event, |e, w| {
                writeln!(w, "✓ Event {} updated.", e.id)
            })
        }
        EventCommand::Status { id, status } => {
            ctx.require(Operation::ManageEvents)?;
            let to = validate::validate_status(status)?;
            let from = ctx.repo.set_status(*id, to)?;
            let change = StatusChange { id: *id, from, to };
            render(ctx.output, &change, |c, w| {
                writeln!(w, "✓ Event {} status: {} -> {}", c.id, c.from, c.to)
            })
        }
        EventCommand::Delete { id } => {
            ctx.require(Operation::ManageEvents)?;
            let removal = ctx.repo.delete_event(*id)?;
            render_mode(
                ctx.output,
                &removal,
                |r, w| writeln!(w, "✓ Event {} deleted.", r.event.id),
                |r, w| {
                    writeln!(w, "✓ Event '{}' (ID: {}) deleted.", r.event.name, r.event.id)?;
                    pretty_kv(
                        w,
                        "Attendees",
                        format!("{} records removed", r.removed_attendees.len()),
                    )?;
                    for (item_id, quantity) in &r.returned {
                        pretty_kv(w, "Returned", format!("{quantity} of item {item_id}"))?;
                    }
                    Ok(())
                },
            )
        }
    }
}
