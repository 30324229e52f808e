use anyhow::{Context as _, Result};
use clap::Args;
use eventdesk_core::config::{DESK_CONFIG_FILE, load_desk_config};
use eventdesk_core::{Repository, Table};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing `eventdesk.toml`.
    #[arg(long)]
    pub force: bool,

    /// Start with empty tables instead of the demo users, events and items.
    #[arg(long)]
    pub no_seed: bool,
}

fn config_toml(seed: bool) -> String {
    format!(
        "[files]\n\
         users = \"users.txt\"\n\
         events = \"events.txt\"\n\
         attendees = \"attendees.txt\"\n\
         inventory = \"inventory.txt\"\n\
         \n\
         [accounts]\n\
         min_password_len = 6\n\
         \n\
         [seed]\n\
         enabled = {seed}\n"
    )
}

#[derive(Debug, Serialize)]
struct InitReport {
    data_dir: PathBuf,
    config: PathBuf,
    seeded: Vec<Table>,
    skipped_lines: usize,
}

/// Execute `evd init`. Writes the desk config and the four table files:
///
/// ```text
/// <data_dir>/
///   eventdesk.toml
///   users.txt  events.txt  attendees.txt  inventory.txt
/// ```
///
/// # Errors
///
/// Returns an error if `eventdesk.toml` already exists and `--force` is not
/// set, or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, data_dir: &Path, output: OutputMode) -> Result<()> {
    let config_path = data_dir.join(DESK_CONFIG_FILE);
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use `evd init --force` to reinitialize.",
            config_path.display()
        );
    }

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    std::fs::write(&config_path, config_toml(!args.no_seed))
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let config = load_desk_config(data_dir)?;
    let (repo, load) = Repository::open(data_dir, config)?;
    // Tables that were neither loaded nor seeded still get an empty file.
    let untouched: Vec<Table> = load
        .missing
        .iter()
        .copied()
        .filter(|t| !load.seeded.contains(t))
        .collect();
    repo.save(&untouched)?;

    let report = InitReport {
        data_dir: data_dir.to_path_buf(),
        config: config_path,
        seeded: load.seeded,
        skipped_lines: load.diagnostics.len(),
    };

    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "initialized {}", r.data_dir.display()),
        |r, w| {
            pretty_section(w, "✓ Initialized eventdesk data directory")?;
            pretty_kv(w, "Directory", r.data_dir.display().to_string())?;
            pretty_kv(w, "Config", r.config.display().to_string())?;
            if !r.seeded.is_empty() {
                let names: Vec<&str> = r.seeded.iter().map(|t| Table::as_str(*t)).collect();
                pretty_kv(w, "Seeded", names.join(", "))?;
            }
            if r.skipped_lines > 0 {
                pretty_kv(w, "Skipped", format!("{} malformed lines", r.skipped_lines))?;
            }
            writeln!(w)?;
            writeln!(w, "Next steps:")?;
            writeln!(w, "  export EVENTDESK_USER=admin EVENTDESK_PASSWORD=adminpass")?;
            writeln!(w, "  evd event list")
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventdesk_core::config::DeskConfig;

    #[test]
    fn template_parses_back_to_defaults() {
        let parsed: DeskConfig = toml_roundtrip(&config_toml(true));
        assert_eq!(parsed, DeskConfig::default());
        let unseeded: DeskConfig = toml_roundtrip(&config_toml(false));
        assert!(!unseeded.seed.enabled);
    }

    fn toml_roundtrip(body: &str) -> DeskConfig {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(DESK_CONFIG_FILE), body).expect("write");
        load_desk_config(dir.path()).expect("parse")
    }

    #[test]
    fn init_refuses_to_clobber_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = InitArgs {
            force: false,
            no_seed: true,
        };
        run_init(&args, dir.path(), OutputMode::Json).expect("first init");
        assert!(dir.path().join("users.txt").exists());
        assert!(run_init(&args, dir.path(), OutputMode::Json).is_err());

        let forced = InitArgs {
            force: true,
            no_seed: true,
        };
        run_init(&forced, dir.path(), OutputMode::Json).expect("forced init");
    }
}
