// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatcred - credential storage for an IRC-style chat client.
//!
//! This is the binary entry point: `chatcred credential <command>`.

mod list;
mod settings;
mod status;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chatcred_config::ChatcredConfig;
use chatcred_core::{CredentialError, StorageMode};
use chatcred_vault::{
    CredentialEvent, CredentialManager, CredentialSettings, FileConfigHost, Notice, NoticeLevel,
};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

/// Chatcred - credential storage for an IRC-style chat client.
#[derive(Parser, Debug)]
#[command(name = "chatcred", version, about, long_about = None)]
struct Cli {
    /// Settings file to load instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage stored credentials.
    Credential {
        #[command(subcommand)]
        action: CredentialCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CredentialCommand {
    /// Set the master password and unlock stored credentials.
    Passwd,
    /// List stored credentials. Only SASL usernames are shown in clear.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show storage mode, encryption and lock state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Move credentials to another storage mode (config or external).
    Migrate { target: StorageMode },
    /// Turn configuration encryption on and encrypt every credential.
    Encrypt,
    /// Turn configuration encryption off and decrypt every credential.
    Decrypt,
    /// Re-read credentials from storage.
    Reload,
    /// Write a decrypted copy of the main config, readable by the owner only.
    Export {
        /// Destination file. Defaults to `<main config>.decrypted.toml`.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl CredentialCommand {
    /// Whether the command cannot run without the master password.
    fn needs_master_password(&self, config_encrypt: bool) -> bool {
        match self {
            Self::Passwd | Self::Encrypt | Self::Decrypt | Self::Export { .. } => true,
            Self::List { .. } => config_encrypt,
            Self::Status { .. } | Self::Migrate { .. } | Self::Reload => false,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            chatcred_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.client.log_level);

    let use_color = !cli.plain && std::io::stdout().is_terminal();
    let Commands::Credential { action } = cli.command;

    if let Err(e) = run(action, &config, cli.config.as_deref(), use_color) {
        error!(error = %e, "credential command failed");
        eprintln!("chatcred: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&Path>,
) -> Result<ChatcredConfig, Vec<chatcred_config::ConfigError>> {
    match path {
        Some(path) => chatcred_config::load_and_validate_path(path),
        None => chatcred_config::load_and_validate(),
    }
}

/// Open the main document, start the manager, run one command, and print
/// what the manager queued.
fn run(
    action: CredentialCommand,
    config: &ChatcredConfig,
    settings_file: Option<&Path>,
    use_color: bool,
) -> Result<(), CredentialError> {
    let settings = CredentialSettings::from_config(config);
    let mut host = FileConfigHost::open(config.client.main_config_path())?;
    let mut manager = CredentialManager::init(&settings)?;

    if action.needs_master_password(manager.config_encrypt()) {
        let password = match action {
            CredentialCommand::Passwd => chatcred_vault::get_master_password_with_confirm()?,
            _ => chatcred_vault::get_master_password()?,
        };
        manager.set_master_password(password);
        // The startup lock notice no longer applies.
        manager.drain_events();
    }
    manager.load_main(&mut host)?;

    let result = dispatch(action, &mut manager, &mut host, settings_file, use_color);
    print_events(&mut manager, use_color);
    manager.shutdown();
    result
}

fn dispatch(
    action: CredentialCommand,
    manager: &mut CredentialManager,
    host: &mut FileConfigHost,
    settings_file: Option<&Path>,
    use_color: bool,
) -> Result<(), CredentialError> {
    match action {
        CredentialCommand::Passwd => {
            manager.unlock(host)?;
            status::run_status(manager, host.path(), false, use_color);
        }
        CredentialCommand::List { json } => {
            let listing = manager.list_credentials(&*host)?;
            list::print_listing(&listing, json, use_color);
        }
        CredentialCommand::Status { json } => {
            status::run_status(manager, host.path(), json, use_color);
        }
        CredentialCommand::Migrate { target } => {
            let previous = manager.storage_mode();
            let migrated = manager.request_migration(target, host);
            // A failed migration still leaves the new mode in effect.
            if manager.storage_mode() != previous {
                settings::persist(settings_file, manager)?;
            }
            migrated?;
        }
        CredentialCommand::Encrypt => {
            manager.request_encrypt()?;
            finish_toggle(manager, host, settings_file)?;
        }
        CredentialCommand::Decrypt => {
            manager.request_decrypt()?;
            finish_toggle(manager, host, settings_file)?;
        }
        CredentialCommand::Reload => match manager.storage_mode() {
            StorageMode::External => {
                manager.external_reload()?;
                info!(count = manager.list().len(), "external credentials reloaded");
                println!(
                    "  Reloaded {} credential(s) from {}",
                    manager.list().len(),
                    manager.external_file().display()
                );
            }
            StorageMode::Config => {
                manager.load_main(host)?;
                println!("  Reloaded {}", host.path().display());
            }
        },
        CredentialCommand::Export { output } => {
            let path = output.unwrap_or_else(|| default_export_path(host.path()));
            manager.export_decrypted(&*host, &path)?;
        }
    }
    Ok(())
}

/// Write the main config through the hooks in config mode and record the
/// new encryption flag in the settings file.
fn finish_toggle(
    manager: &mut CredentialManager,
    host: &mut FileConfigHost,
    settings_file: Option<&Path>,
) -> Result<(), CredentialError> {
    if manager.storage_mode() == StorageMode::Config {
        manager.save_main(host)?;
    }
    settings::persist(settings_file, manager)
}

fn default_export_path(main_config: &Path) -> PathBuf {
    main_config.with_extension("decrypted.toml")
}

fn print_events(manager: &mut CredentialManager, use_color: bool) {
    for event in manager.drain_events() {
        match event {
            CredentialEvent::Notice(notice) => print_notice(&notice, use_color),
            CredentialEvent::SetupReread => debug!("setup reread requested"),
        }
    }
}

fn print_notice(notice: &Notice, use_color: bool) {
    if use_color {
        use colored::Colorize;
        let tag = match notice.level {
            NoticeLevel::Info => "•".cyan(),
            NoticeLevel::Warning => "!".yellow(),
            NoticeLevel::Error => "✗".red(),
        };
        println!("  {tag} {notice}");
    } else {
        let tag = match notice.level {
            NoticeLevel::Info => "[INFO]",
            NoticeLevel::Warning => "[WARN]",
            NoticeLevel::Error => "[FAIL]",
        };
        println!("  {tag} {notice}");
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chatcred={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
