//! `fieldorder`: reorder the schematic editor's default fields.
//!
//! Edits the `(templatefields ...)` list stored in the editor's
//! `eeschema.json`.  Every mutating command loads the file, applies the
//! change, writes `eeschema.json.bak`, and atomically replaces the original.
//!
//! # Usage
//!
//! ```text
//! fieldorder [--config PATH] [--dry-run] <COMMAND>
//!
//! Commands:
//!   list                         Show the current order
//!   up     <ENTRY>               Move a field one place up
//!   down   <ENTRY>               Move a field one place down
//!   move   <ENTRY> <INDEX>       Move a field to a zero-based position
//!   add    <NAME>                Append a new field (visible, no url)
//!   remove <ENTRY>               Delete a field
//!   flags  <ENTRY> [--visible B] [--url B]
//!   export [PATH]                Write { "fields": [...] }
//!   import <PATH>                Reorder from an exported name list
//!   locate                       Print the eeschema.json that would be used
//!   config                       Print the tool settings
//! ```
//!
//! `<ENTRY>` is a field name or a zero-based index.
//!
//! # Environment variables
//!
//! | Variable             | Description                                   |
//! |----------------------|-----------------------------------------------|
//! | `FIELDORDER_EESCHEMA`| Same as `--config`                            |
//! | `KICAD_CONFIG_HOME`  | Directory searched for `eeschema.json`        |
//! | `RUST_LOG`           | Log filter; overrides `general.log_level`     |

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fieldorder_cli::application::edit_session::EditSession;
use fieldorder_cli::infrastructure::storage::config::{self, ConfigError, ToolConfig};
use fieldorder_cli::infrastructure::storage::fs::{FileStore, LocalFileStore};
use fieldorder_cli::infrastructure::storage::gateway::PersistenceGateway;
use fieldorder_cli::infrastructure::storage::locate::{locate_eeschema, HostEnv};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Reorder, import and export the schematic editor's default fields.
#[derive(Debug, Parser)]
#[command(name = "fieldorder", version)]
struct Cli {
    /// Path to eeschema.json.  Searched for when omitted.
    #[arg(long, global = true, env = "FIELDORDER_EESCHEMA")]
    config: Option<PathBuf>,

    /// Print the resulting order without saving.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the current order.
    List,
    /// Move a field one place up.
    Up { entry: String },
    /// Move a field one place down.
    Down { entry: String },
    /// Move a field to a zero-based position.
    Move { entry: String, index: usize },
    /// Append a new field (visible, no url).
    Add { name: String },
    /// Delete a field.
    Remove { entry: String },
    /// Change the flags of a field.  Omitted flags keep their value.
    Flags {
        entry: String,
        #[arg(long, action = clap::ArgAction::Set)]
        visible: Option<bool>,
        #[arg(long, action = clap::ArgAction::Set)]
        url: Option<bool>,
    },
    /// Write the field names to PATH (default: next to eeschema.json).
    Export { path: Option<PathBuf> },
    /// Reorder from an exported name list and save.
    Import { path: PathBuf },
    /// Print the eeschema.json that would be used.
    Locate,
    /// Print the tool settings.
    Config,
}

impl Command {
    fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Up { .. }
                | Command::Down { .. }
                | Command::Move { .. }
                | Command::Add { .. }
                | Command::Remove { .. }
                | Command::Flags { .. }
                | Command::Import { .. }
        )
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Settings are read before logging starts because they carry the
    // fallback log level; errors are reported once the subscriber exists.
    let settings = config::load_config();
    let log_level = settings
        .as_ref()
        .map(|c| c.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match settings {
        Ok(settings) => settings,
        Err(ConfigError::NoPlatformConfigDir) => {
            warn!("no platform config directory; using default settings");
            ToolConfig::default()
        }
        Err(e) => return Err(e).context("failed to load fieldorder settings"),
    };

    if let Command::Config = cli.command {
        print_settings(&settings);
        return Ok(());
    }

    let explicit = cli.config.as_deref().or(settings.host.eeschema_path.as_deref());
    let path = locate_eeschema(
        explicit,
        &HostEnv::from_env(),
        &settings.host.kicad_version,
        |p| p.is_file(),
    )?;

    if let Command::Locate = cli.command {
        println!("{}", path.display());
        return Ok(());
    }

    let mut session = EditSession::open(PersistenceGateway::new(LocalFileStore), &path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    info!(path = %path.display(), "editing default fields");

    run(&mut session, &cli.command)?;

    if !cli.command.is_mutating() {
        return Ok(());
    }
    print_order(&session);
    if cli.dry_run {
        println!("dry run: {} not modified", path.display());
        return Ok(());
    }

    let report = session.save().context("failed to save default field order")?;
    if !report.saved {
        println!("no changes");
        return Ok(());
    }
    if let Some(backup) = &report.backup_path {
        println!("saved; previous file kept at {}", backup.display());
    }
    if report.restart_required {
        println!("Restart the schematic editor to apply the new field order.");
    }
    Ok(())
}

fn run(session: &mut EditSession, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::List => print_order(session),
        Command::Up { entry } => {
            let index = session.resolve(entry)?;
            if !session.order_mut().move_up(index)? {
                println!("{entry} is already first");
            }
        }
        Command::Down { entry } => {
            let index = session.resolve(entry)?;
            if !session.order_mut().move_down(index)? {
                println!("{entry} is already last");
            }
        }
        Command::Move { entry, index } => {
            let from = session.resolve(entry)?;
            session.order_mut().move_to(from, *index)?;
        }
        Command::Add { name } => {
            session.order_mut().add(name)?;
        }
        Command::Remove { entry } => {
            let index = session.resolve(entry)?;
            session.order_mut().remove(index)?;
        }
        Command::Flags {
            entry,
            visible,
            url,
        } => {
            let index = session.resolve(entry)?;
            session.update_flags(index, *visible, *url)?;
        }
        Command::Export { path } => {
            let path = path.clone().unwrap_or_else(|| session.default_export_path());
            session
                .export_to(&path)
                .with_context(|| format!("failed to export to {}", path.display()))?;
            println!("exported {} fields to {}", session.entries().len(), path.display());
        }
        Command::Import { path } => {
            session
                .import_from(path)
                .with_context(|| format!("failed to import {}", path.display()))?;
        }
        Command::Locate | Command::Config => {}
    }
    Ok(())
}

fn print_order<S: FileStore>(session: &EditSession<S>) {
    for (index, entry) in session.entries().iter().enumerate() {
        println!("{index:>3}  {:<32} {}", entry.name, entry.flags);
    }
}

fn print_settings(settings: &ToolConfig) {
    match config::config_file_path() {
        Ok(path) => println!("settings file:        {}", path.display()),
        Err(e) => println!("settings file:        ({e})"),
    }
    println!("log_level:            {}", settings.general.log_level);
    println!("kicad_version:        {}", settings.host.kicad_version);
    match &settings.host.eeschema_path {
        Some(path) => println!("eeschema_path:        {}", path.display()),
        None => println!("eeschema_path:        (search)"),
    }
    println!("show_toolbar_button:  {}", settings.host.show_toolbar_button);
}
