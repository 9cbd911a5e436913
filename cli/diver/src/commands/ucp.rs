//! UCP command group.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::access::{GrantsArgs, TeamsArgs};
use super::auth::LoginArgs;
use super::service::ServiceCommand;
use super::{access, auth, CommandContext};

/// UCP commands.
#[derive(Debug, Args)]
pub struct UcpCommand {
    #[command(subcommand)]
    command: UcpSubcommand,
}

#[derive(Debug, Subcommand)]
enum UcpSubcommand {
    /// Log in to UCP and store the session token.
    Login(LoginArgs),

    /// Remove the stored UCP token.
    Logout,

    /// Show current authentication status.
    Status,

    /// Show the account the stored token belongs to.
    Whoami,

    /// Interact with services.
    Service(ServiceCommand),

    /// List user and organization accounts.
    Accounts,

    /// List the teams of an organization.
    Teams(TeamsArgs),

    /// List roles.
    Roles,

    /// List collections.
    Collections,

    /// List grants.
    Grants(GrantsArgs),
}

impl UcpCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            UcpSubcommand::Login(args) => auth::login(ctx, args).await,
            UcpSubcommand::Logout => auth::logout(ctx).await,
            UcpSubcommand::Status => auth::status(ctx).await,
            UcpSubcommand::Whoami => auth::whoami(ctx).await,
            UcpSubcommand::Service(cmd) => cmd.run(ctx).await,
            UcpSubcommand::Accounts => access::accounts(ctx).await,
            UcpSubcommand::Teams(args) => access::teams(ctx, args).await,
            UcpSubcommand::Roles => access::roles(ctx).await,
            UcpSubcommand::Collections => access::collections(ctx).await,
            UcpSubcommand::Grants(args) => access::grants(ctx, args).await,
        }
    }
}
