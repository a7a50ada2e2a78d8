use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pomocord_core::SettingsStore;
use tracing_subscriber::EnvFilter;

mod commands;
mod discord;

#[derive(Parser)]
#[command(name = "pomocord", version, about = "Pomodoro timer bot for Discord voice channels")]
pub(crate) struct Cli {
    /// Settings file (.json or .toml). Defaults to ~/.config/pomocord/settings.json
    #[arg(long, global = true, env = "POMOCORD_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve chat commands
    Run {
        /// Chat command prefix
        #[arg(long, default_value = "!")]
        prefix: String,
        /// Bot token, overriding the one in the settings file
        #[arg(long, env = "POMOCORD_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut std::io::stdout());
            Ok(())
        }
        Commands::Run { prefix, token } => {
            open_store(cli.settings).and_then(|store| commands::run::run(store, prefix, token))
        }
        Commands::Config { action } => {
            open_store(cli.settings).and_then(|store| commands::config::run(&store, action))
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn open_store(path: Option<PathBuf>) -> Result<SettingsStore, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(SettingsStore::new(path)),
        None => Ok(SettingsStore::at_default_location()?),
    }
}
