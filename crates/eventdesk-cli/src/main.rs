#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use eventdesk_core::Repository;
use eventdesk_core::config::resolve_config;
use output::{CliError, OutputMode, render_error};
use session::Credentials;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "evd: event, attendee and inventory desk",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the table files.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Username to log in as.
    #[arg(long, global = true, env = "EVENTDESK_USER")]
    user: Option<String>,

    /// Password for `--user`.
    #[arg(long, global = true, env = "EVENTDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a data directory",
        long_about = "Write eventdesk.toml and the four table files, seeding demo data unless --no-seed.",
        after_help = "EXAMPLES:\n    # Initialize the current directory\n    evd init\n\n    # Start empty\n    evd init --no-seed --data-dir ./desk"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Accounts",
        about = "Create an account",
        long_about = "Create a new account. No login is required.",
        after_help = "EXAMPLES:\n    # Create a regular account\n    evd signup carol s3cret!"
    )]
    Signup(cmd::signup::SignupArgs),

    #[command(
        next_help_heading = "Accounts",
        about = "Show the logged-in account",
        after_help = "EXAMPLES:\n    evd --user user1 --password user1pass whoami"
    )]
    Whoami(cmd::whoami::WhoamiArgs),

    #[command(
        next_help_heading = "Accounts",
        about = "Manage accounts (admin)",
        after_help = "EXAMPLES:\n    # List accounts\n    evd user list\n\n    # Delete an account\n    evd user delete carol"
    )]
    User(cmd::user::UserArgs),

    #[command(
        next_help_heading = "Events",
        about = "Create, browse and manage events",
        after_help = "EXAMPLES:\n    # Create an event\n    evd event create --name Gala --date 2025-12-01 --time 19:30\n\n    # Search by name or date\n    evd event search 2025-12"
    )]
    Event(cmd::event::EventArgs),

    #[command(
        next_help_heading = "Events",
        about = "Registrations, check-in and attendance",
        after_help = "EXAMPLES:\n    # Register the logged-in user\n    evd attendee register 1 --contact me@example.com\n\n    # Check attendee 3 in to event 1\n    evd attendee checkin 1 3"
    )]
    Attendee(cmd::attendee::AttendeeArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "Items and allocations (admin)",
        after_help = "EXAMPLES:\n    # Allocate 30 chairs to event 1\n    evd inventory allocate 1 Chairs 30\n\n    # Report with totals\n    evd inventory report"
    )]
    Inventory(cmd::inventory::InventoryArgs),

    #[command(
        next_help_heading = "Data",
        about = "Export tables (admin)",
        after_help = "EXAMPLES:\n    # Export everything\n    evd export all\n\n    # Export users into another directory\n    evd export users --out-dir /tmp"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Data",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    evd completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("EVENTDESK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "eventdesk=debug,evd=debug,info"
        } else {
            "eventdesk=info,warn"
        })
    });

    let format = env::var("EVENTDESK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: &mut OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let config = resolve_config(cli.data_dir.as_deref(), cli.json)?;
    *output = OutputMode::from_resolved(&config.resolved_output);
    debug!(data_dir = %config.data_dir.display(), output = %config.resolved_output, "resolved config");

    if let Commands::Init(args) = &cli.command {
        return cmd::init::run_init(args, &config.data_dir, *output);
    }

    let (repo, load) = Repository::open(&config.data_dir, config.desk)?;
    if !load.diagnostics.is_empty() {
        warn!(skipped = load.diagnostics.len(), "malformed table lines were skipped");
    }
    if !load.seeded.is_empty() {
        info!(tables = ?load.seeded, "seeded empty tables");
    }

    let mut ctx = cmd::Ctx {
        repo,
        output: *output,
        credentials: Credentials::new(cli.user.as_deref(), cli.password.as_deref()),
    };

    match &cli.command {
        Commands::Signup(args) => cmd::signup::run_signup(args, &mut ctx),
        Commands::Whoami(args) => cmd::whoami::run_whoami(args, &ctx),
        Commands::User(args) => cmd::user::run_user(args, &mut ctx),
        Commands::Event(args) => cmd::event::run_event(args, &mut ctx),
        Commands::Attendee(args) => cmd::attendee::run_attendee(args, &mut ctx),
        Commands::Inventory(args) => cmd::inventory::run_inventory(args, &mut ctx),
        Commands::Export(args) => cmd::export::run_export(args, &ctx),
        Commands::Init(_) | Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let mut output = OutputMode::fallback(cli.json);
    match run(&cli, &mut output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            if render_error(output, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["evd", "event", "list", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Event(_)));
    }

    #[test]
    fn credentials_are_global() {
        let cli = Cli::parse_from([
            "evd",
            "inventory",
            "list",
            "--user",
            "admin",
            "--password",
            "adminpass",
        ]);
        assert_eq!(cli.user.as_deref(), Some("admin"));
        assert_eq!(cli.password.as_deref(), Some("adminpass"));
    }

    #[test]
    fn data_dir_flag_parsed() {
        let cli = Cli::parse_from(["evd", "--data-dir", "/tmp/desk", "init"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/desk")));
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["evd", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["evd", "init", "--no-seed"],
            vec!["evd", "signup", "carol", "secret"],
            vec!["evd", "whoami"],
            vec!["evd", "user", "create", "dave", "secret", "--role", "admin"],
            vec!["evd", "user", "delete", "dave"],
            vec!["evd", "user", "list"],
            vec!["evd", "event", "create", "--name", "G", "--date", "2025-01-01", "--time", "10:00"],
            vec!["evd", "event", "list", "--status", "upcoming"],
            vec!["evd", "event", "show", "1"],
            vec!["evd", "event", "search", "tech"],
            vec!["evd", "event", "edit", "1", "--location", "Hall"],
            vec!["evd", "event", "status", "1", "ongoing"],
            vec!["evd", "event", "delete", "1"],
            vec!["evd", "attendee", "register", "1", "--contact", "x@y"],
            vec!["evd", "attendee", "cancel", "1"],
            vec!["evd", "attendee", "contact", "x@y"],
            vec!["evd", "attendee", "list", "1"],
            vec!["evd", "attendee", "checkin", "1", "2"],
            vec!["evd", "attendee", "report", "1"],
            vec!["evd", "attendee", "export", "1"],
            vec!["evd", "inventory", "add", "--name", "Tables", "--total", "10"],
            vec!["evd", "inventory", "update", "Tables", "--total", "12"],
            vec!["evd", "inventory", "list"],
            vec!["evd", "inventory", "report", "--write"],
            vec!["evd", "inventory", "allocate", "1", "2", "30"],
            vec!["evd", "inventory", "deallocate", "1", "Chairs", "10"],
            vec!["evd", "export", "users", "events"],
            vec!["evd", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?}: {:?}",
                args,
                result.err()
            );
        }
    }

    #[test]
    fn negative_quantities_are_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["evd", "inventory", "allocate", "1", "2", "-5"]).is_err());
    }
}
