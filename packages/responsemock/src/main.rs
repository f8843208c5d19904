// packages/responsemock/src/main.rs
//! responsemock command line
//!
//! `check` parses rule files and prints the resulting directives as JSON.
//! `serve` runs the rules as a standalone mock proxy until Ctrl-C.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use responsemock::observability::{init_tracing_with, LogFormat};
use responsemock::rules::load_rule_files;
use responsemock::{response_mock, SessionConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "responsemock", version, about = "Stub HTTP responses from rule files")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse rule files and print the directives
    Check {
        /// Rule files, rules separated by `---` lines
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Serve rule files as a mock proxy
    Serve {
        /// Rule files, rules separated by `---` lines
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Proxy listen address
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Session config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing_with(format)?;

    match cli.command {
        Command::Check { files } => {
            let rules = load_rule_files(&files).context("reading rule files")?;
            let directives = rules.directives()?;
            println!("{}", serde_json::to_string_pretty(&directives)?);
        }
        Command::Serve {
            files,
            listen,
            config,
        } => {
            let rules = load_rule_files(&files).context("reading rule files")?;

            let mut session_config = SessionConfig::load_from(config.as_deref())?;
            if let Some(addr) = listen {
                session_config = session_config.listen_addr(addr);
            }

            info!("Starting responsemock v{}", responsemock::VERSION);
            let guard = response_mock(rules, session_config)?;
            if let Some(proxy_url) = guard.proxy_url() {
                info!("Proxy ready at {}", proxy_url);
            }

            tokio::signal::ctrl_c()
                .await
                .context("installing Ctrl-C handler")?;
            info!("Received shutdown signal, cleaning up...");

            if let Some(session) = guard.session() {
                println!("{}", serde_json::to_string_pretty(&session.calls())?);
            }
            guard.close()?;
        }
    }

    Ok(())
}
