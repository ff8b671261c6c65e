// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchyard - task routing and context budget orchestrator.
//!
//! Command-line front end for inspecting classification, routing decisions,
//! budget levels, and the effective configuration.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use switchyard_config::model::{LoggingConfig, SwitchyardConfig};
use switchyard_core::SwitchyardError;

/// Switchyard - task routing and context budget orchestrator.
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify text and print the classification as JSON.
    Classify {
        text: String,
        /// Context flag, `name` or `name=true|false`. Repeatable.
        #[arg(long = "flag")]
        flags: Vec<String>,
    },
    /// Route one request and print the routing summary as JSON.
    Route {
        #[arg(long)]
        session: String,
        #[arg(long)]
        request: String,
        text: String,
        #[arg(long = "flag")]
        flags: Vec<String>,
        /// Input token hint used for the projected budget status.
        #[arg(long)]
        input_tokens: Option<u64>,
        /// Estimate the input token hint from the text.
        #[arg(long, conflicts_with = "input_tokens")]
        estimate: bool,
    },
    /// Record token usage against a session and print its budget status.
    Simulate {
        #[arg(long)]
        session: String,
        #[arg(long, allow_negative_numbers = true)]
        input: i64,
        #[arg(long, allow_negative_numbers = true)]
        output: i64,
        /// Record the same usage this many times.
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate configuration and report any errors.
    Check,
    /// Print the effective configuration as TOML.
    Show,
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => switchyard_config::load_and_validate_path(path),
        None => switchyard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            switchyard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);
    tracing::debug!(
        max_hops = config.guard.max_hops,
        profiles = config.profiles.len(),
        "configuration loaded"
    );

    if let Err(e) = run(cli.command, &config) {
        eprintln!("switchyard: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &SwitchyardConfig) -> Result<(), SwitchyardError> {
    let value = match command {
        Commands::Classify { text, flags } => commands::classify(config, &text, &flags)?,
        Commands::Route {
            session,
            request,
            text,
            flags,
            input_tokens,
            estimate,
        } => commands::route(
            config,
            commands::RouteArgs {
                session: &session,
                request: &request,
                text: &text,
                flags: &flags,
                input_tokens,
                estimate,
            },
        )?,
        Commands::Simulate {
            session,
            input,
            output,
            repeat,
        } => commands::simulate(config, &session, input, output, repeat)?,
        Commands::Config { action } => {
            match action {
                ConfigCommands::Check => println!("switchyard: config OK"),
                ConfigCommands::Show => print!("{}", commands::show_config(config)?),
            }
            return Ok(());
        }
    };

    let rendered = serde_json::to_string_pretty(&value)
        .map_err(|e| SwitchyardError::Internal(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("switchyard={},warn", logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.init();
    }
}
