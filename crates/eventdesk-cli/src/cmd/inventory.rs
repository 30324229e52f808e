//! `evd inventory`: items and their allocation to events.
//!
//! Items may be addressed by id or by name (case-insensitive).

use anyhow::Result;
use clap::{Args, Subcommand};
use eventdesk_core::export::write_inventory_report;
use eventdesk_core::model::Operation;
use eventdesk_core::report::{InventoryReport, InventoryRow};
use serde::Serialize;
use std::io::{self, Write};

use crate::cmd::{Ctx, resolve_item};
use crate::output::{Renderable, render, render_list};
use crate::validate::{self, ValidationError};

#[derive(Args, Debug)]
pub struct InventoryArgs {
    #[command(subcommand)]
    pub command: InventoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum InventoryCommand {
    /// Add an item with a positive total quantity.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        total: u32,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename, redescribe or resize an item.
    Update {
        /// Item id or name.
        item: String,
        #[arg(long)]
        name: Option<String>,
        /// New total. Must not drop below what is already allocated.
        #[arg(long)]
        total: Option<u32>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List every item with its availability.
    List,
    /// Full inventory report, optionally written to `inventory_report.txt`.
    Report {
        /// Also write the report into the data directory.
        #[arg(long)]
        write: bool,
    },
    /// Allocate a quantity of an item to an event.
    Allocate {
        event_id: u32,
        /// Item id or name.
        item: String,
        quantity: u32,
    },
    /// Return a quantity of an item from an event. Asking for more than the
    /// event holds returns everything it holds.
    Deallocate {
        event_id: u32,
        /// Item id or name.
        item: String,
        quantity: u32,
    },
}

impl Renderable for InventoryRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "ID: {}, Name: {}, Total: {}, Allocated: {}, Available: {}, Desc: {}",
            self.id, self.name, self.total, self.allocated, self.available, self.description
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}  {}",
            self.id, self.total, self.allocated, self.available, self.name
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "TOTAL", "ALLOCATED", "AVAILABLE", "NAME"]
    }
}

#[derive(Debug, Serialize)]
struct AllocationChange {
    event_id: u32,
    item: InventoryRow,
    quantity: u32,
    held_by_event: u32,
}

#[derive(Debug, Serialize)]
struct ReportOutput {
    #[serde(flatten)]
    report: InventoryReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<std::path::PathBuf>,
}

fn allocation_change(
    ctx: &Ctx,
    event_id: u32,
    item_id: u32,
    quantity: u32,
) -> Result<AllocationChange> {
    let state = ctx.repo.state();
    Ok(AllocationChange {
        event_id,
        item: InventoryRow::from(state.item(item_id)?),
        quantity,
        held_by_event: state.event(event_id)?.allocated(item_id),
    })
}

fn run_update(
    ctx: &mut Ctx,
    item: &str,
    name: Option<&str>,
    total: Option<u32>,
    description: Option<&str>,
) -> Result<()> {
    if name.is_none() && total.is_none() && description.is_none() {
        return Err(ValidationError::new(
            "update",
            item,
            "no fields to change",
            "pass at least one of --name --total --description",
            "empty_edit",
        )
        .into());
    }
    if let Some(name) = name {
        validate::validate_name("name", name)?;
    }
    if let Some(description) = description {
        validate::validate_text("description", description)?;
    }
    let id = resolve_item(ctx, item)?;
    // The total is the only change that can be refused, so it goes first.
    if let Some(total) = total {
        ctx.repo.set_total_quantity(id, total)?;
    }
    if let Some(name) = name {
        ctx.repo.rename_item(id, name)?;
    }
    if let Some(description) = description {
        ctx.repo.redescribe_item(id, description)?;
    }
    let row = InventoryRow::from(ctx.repo.state().item(id)?);
    render(ctx.output, &row, |r, w| writeln!(w, "✓ Item {} updated.", r.id))
}

fn run_report(ctx: &Ctx, write: bool) -> Result<()> {
    let report = InventoryReport::build(ctx.repo.state());
    let written_to = if write {
        Some(write_inventory_report(ctx.repo.dir(), ctx.repo.state())?)
    } else {
        None
    };
    let out = ReportOutput { report, written_to };
    render(ctx.output, &out, |o, w| {
        write!(w, "{}", o.report.render_text())?;
        if let Some(path) = &o.written_to {
            writeln!(w, "✓ Report written to {}", path.display())?;
        }
        Ok(())
    })
}

/// # Errors
///
/// Fails on a refused login or role, invalid input, a missing event or
/// item, a quantity rule violation, or an unwritable table.
pub fn run_inventory(args: &InventoryArgs, ctx: &mut Ctx) -> Result<()> {
    ctx.require(Operation::ManageInventory)?;
    match &args.command {
        InventoryCommand::Add {
            name,
            total,
            description,
        } => {
            validate::validate_name("name", name)?;
            validate::validate_text("description", description)?;
            let item = ctx.repo.add_item(name, *total, description)?;
            render(ctx.output, &InventoryRow::from(&item), |r, w| {
                writeln!(w, "✓ Item '{}' added (ID: {}).", r.name, r.id)
            })
        }
        InventoryCommand::Update {
            item,
            name,
            total,
            description,
        } => run_update(ctx, item, name.as_deref(), *total, description.as_deref()),
        InventoryCommand::List => {
            let rows: Vec<InventoryRow> = ctx
                .repo
                .state()
                .inventory()
                .iter()
                .map(InventoryRow::from)
                .collect();
            render_list(&rows, ctx.output, "No inventory items.")
        }
        InventoryCommand::Report { write } => run_report(ctx, *write),
        InventoryCommand::Allocate {
            event_id,
            item,
            quantity,
        } => {
            let item_id = resolve_item(ctx, item)?;
            ctx.repo.allocate(*event_id, item_id, *quantity)?;
            let change = allocation_change(ctx, *event_id, item_id, *quantity)?;
            render(ctx.output, &change, |c, w| {
                writeln!(
                    w,
                    "✓ Allocated {} of '{}' to event {} ({} available).",
                    c.quantity, c.item.name, c.event_id, c.item.available
                )
            })
        }
        InventoryCommand::Deallocate {
            event_id,
            item,
            quantity,
        } => {
            let item_id = resolve_item(ctx, item)?;
            let released = ctx.repo.deallocate(*event_id, item_id, *quantity)?;
            let change = allocation_change(ctx, *event_id, item_id, released)?;
            render(ctx.output, &change, |c, w| {
                writeln!(
                    w,
                    "✓ Returned {} of '{}' from event {} ({} available).",
                    c.quantity, c.item.name, c.event_id, c.item.available
                )
            })
        }
    }
}
