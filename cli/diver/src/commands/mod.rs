//! CLI commands.

mod access;
mod auth;
mod service;
mod store;
mod ucp;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::Session;
use crate::config::{Config, Credentials};
use crate::output::OutputFormat;

/// diver - Inspect Docker UCP clusters and Docker Store subscriptions.
#[derive(Debug, Parser)]
#[command(name = "diver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    /// Log level filter (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, env = "DIVER_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interact with Docker Universal Control Plane.
    Ucp(ucp::UcpCommand),

    /// Interact with the Docker Store.
    Store(store::StoreCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Log filter requested on the command line.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let format = match self.format.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        };

        let config = Config::load()?;
        let credentials = Credentials::load()?;

        let ctx = CommandContext {
            config,
            credentials,
            format,
        };

        match self.command {
            Commands::Ucp(cmd) => cmd.run(ctx).await,
            Commands::Store(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("diver {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context, built once per invocation.
pub struct CommandContext {
    pub config: Config,
    pub credentials: Option<Credentials>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Get an authenticated UCP session.
    pub fn session(&self) -> Result<Session> {
        Ok(Session::from_credentials(
            &self.config,
            self.credentials.as_ref(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_service_list_flags() {
        let cli = Cli::try_parse_from([
            "diver", "ucp", "service", "list", "--name", "web", "--node", "--resolve",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), "warn");
        assert!(matches!(cli.command, Commands::Ucp(_)));
    }
}
