// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier - a terminal client for a hosted chat service.
//!
//! This is the binary entry point. All business logic (auth, message
//! persistence, bot replies) lives behind the remote API; this process is
//! the session, the conversation state machine, and the shell around them.

mod shell;

use clap::{Parser, Subcommand};
use colored::Colorize;

use shell::AuthMode;

/// Courier - a terminal client for a hosted chat service.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the chat shell, resuming the session if one is active.
    Chat,
    /// Log in with an existing account, then open the chat shell.
    Login,
    /// Create an account, then open the chat shell.
    Signup,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match courier_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            courier_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    let mode = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => AuthMode::Resume,
        Commands::Login => AuthMode::Login,
        Commands::Signup => AuthMode::Signup,
    };

    if let Err(e) = shell::run(config, mode).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Logs go to stderr so they never interleave with the conversation.
/// `COURIER_LOG` overrides the configured level with a full filter spec.
fn init_tracing(config: &courier_config::CourierConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("COURIER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.shell.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
