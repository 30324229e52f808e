//! `evd export`: copy tables out in table-file format.

use anyhow::Result;
use clap::Args;
use eventdesk_core::Table;
use eventdesk_core::export::export_table;
use eventdesk_core::model::Operation;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::cmd::Ctx;
use crate::output::render;
use crate::validate;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Tables to export: users, events, attendees, inventory, or all.
    #[arg(required = true, value_name = "TABLE")]
    pub tables: Vec<String>,

    /// Directory to write into. Defaults to the data directory.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportedTable {
    table: Table,
    path: PathBuf,
}

fn parse_tables(raw: &[String]) -> Result<Vec<Table>, validate::ValidationError> {
    let mut tables = Vec::new();
    for name in raw {
        let wanted: Vec<Table> = if name.eq_ignore_ascii_case("all") {
            Table::ALL.to_vec()
        } else {
            vec![validate::validate_table(name)?]
        };
        for table in wanted {
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
    }
    Ok(tables)
}

/// # Errors
///
/// Fails on a refused login or role, an unknown table name, or a file that
/// cannot be written.
pub fn run_export(args: &ExportArgs, ctx: &Ctx) -> Result<()> {
    ctx.require(Operation::ExportData)?;
    let tables = parse_tables(&args.tables)?;
    let dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| ctx.repo.dir().to_path_buf());

    let mut exported = Vec::with_capacity(tables.len());
    for table in tables {
        let path = export_table(&dir, ctx.repo.state(), table)?;
        exported.push(ExportedTable { table, path });
    }

    render(ctx.output, &exported, |list, w| {
        for e in list {
            writeln!(w, "✓ Exported {} to {}", e.table, e.path.display())?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn all_expands_and_duplicates_collapse() {
        let tables = parse_tables(&names(&["inventory", "all", "users"])).expect("tables");
        assert_eq!(
            tables,
            vec![Table::Inventory, Table::Users, Table::Events, Table::Attendees]
        );
    }

    #[test]
    fn unknown_table_is_refused() {
        assert!(parse_tables(&names(&["goals"])).is_err());
    }
}
