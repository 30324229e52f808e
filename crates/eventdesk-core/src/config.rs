use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::repo::Table;

/// Name of the per-directory config file.
pub const DESK_CONFIG_FILE: &str = "eventdesk.toml";

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "EVENTDESK_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Table file names, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_users_file")]
    pub users: String,
    #[serde(default = "default_events_file")]
    pub events: String,
    #[serde(default = "default_attendees_file")]
    pub attendees: String,
    #[serde(default = "default_inventory_file")]
    pub inventory: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            users: default_users_file(),
            events: default_events_file(),
            attendees: default_attendees_file(),
            inventory: default_inventory_file(),
        }
    }
}

impl FilesConfig {
    #[must_use]
    pub fn file_name(&self, table: Table) -> &str {
        match table {
            Table::Users => &self.users,
            Table::Events => &self.events,
            Table::Attendees => &self.attendees,
            Table::Inventory => &self.inventory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            min_password_len: default_min_password_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Seed demo users, events and items into empty tables on load.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub desk: DeskConfig,
    pub user: UserConfig,
    pub data_dir: PathBuf,
    pub resolved_output: String,
}

/// Load `<data_dir>/eventdesk.toml`, or defaults if it does not exist.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_desk_config(data_dir: &Path) -> Result<DeskConfig> {
    let path = data_dir.join(DESK_CONFIG_FILE);
    if !path.exists() {
        return Ok(DeskConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<DeskConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/eventdesk/config.toml`, or defaults if absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("eventdesk/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the data directory, output mode and both config files.
///
/// # Errors
///
/// Fails if either config file exists but is unreadable or invalid.
pub fn resolve_config(cli_data_dir: Option<&Path>, cli_json: bool) -> Result<EffectiveConfig> {
    let user = load_user_config()?;

    let env_dir = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    let data_dir = resolve_data_dir(cli_data_dir, env_dir, user.data_dir.clone());
    let desk = load_desk_config(&data_dir)?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);

    Ok(EffectiveConfig {
        desk,
        user,
        data_dir,
        resolved_output,
    })
}

fn resolve_data_dir(
    cli_dir: Option<&Path>,
    env_dir: Option<PathBuf>,
    user_dir: Option<PathBuf>,
) -> PathBuf {
    cli_dir
        .map(Path::to_path_buf)
        .or_else(|| env_dir.filter(|p| !p.as_os_str().is_empty()))
        .or(user_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}

const fn default_min_password_len() -> usize {
    6
}

fn default_users_file() -> String {
    "users.txt".to_string()
}

fn default_events_file() -> String {
    "events.txt".to_string()
}

fn default_attendees_file() -> String {
    "attendees.txt".to_string()
}

fn default_inventory_file() -> String {
    "inventory.txt".to_string()
}
