//! Docker Store commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::client::Session;
use crate::config::StoreCredentials;
use crate::error::CliError;
use crate::models::Subscription;
use crate::output::{print_output, print_single, print_success, OutputFormat};
use crate::resolve::{first_active_subscription, get_all_subscriptions};

use super::CommandContext;

/// Docker Store commands.
#[derive(Debug, Args)]
pub struct StoreCommand {
    #[command(subcommand)]
    command: StoreSubcommand,
}

#[derive(Debug, Subcommand)]
enum StoreSubcommand {
    /// Store a Docker Store token and Docker ID.
    Login(StoreLoginArgs),

    /// List all subscriptions.
    Subscriptions(SubscriptionArgs),

    /// Print the ID of the first active subscription.
    Active(SubscriptionArgs),
}

#[derive(Debug, Args)]
struct StoreLoginArgs {
    /// Store JWT.
    #[arg(long, env = "DIVER_STORE_TOKEN")]
    token: String,

    /// Docker ID owning the subscriptions.
    #[arg(long)]
    id: String,
}

#[derive(Debug, Args)]
struct SubscriptionArgs {
    /// Docker ID to query (defaults to the stored ID).
    #[arg(long)]
    id: Option<String>,
}

impl StoreCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            StoreSubcommand::Login(args) => login(args),
            StoreSubcommand::Subscriptions(args) => subscriptions(ctx, args).await,
            StoreSubcommand::Active(args) => active(ctx, args).await,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct SubscriptionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Subscription")]
    subscription_id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Period End", display = "display_option")]
    current_period_end: Option<String>,
}

fn display_option(opt: &Option<String>) -> String {
    opt.as_deref().unwrap_or("-").to_string()
}

impl From<&Subscription> for SubscriptionRow {
    fn from(sub: &Subscription) -> Self {
        Self {
            name: sub.name.clone(),
            subscription_id: sub.subscription_id.clone(),
            state: sub.state.clone(),
            current_period_end: sub
                .current_period_end
                .map(|end| end.format("%Y-%m-%d").to_string()),
        }
    }
}

fn login(args: StoreLoginArgs) -> Result<()> {
    StoreCredentials {
        token: args.token,
        docker_id: args.id,
    }
    .save()?;
    print_success("Store credentials saved.");
    Ok(())
}

/// Build a Store session and pick the Docker ID to query.
fn store_session(ctx: &CommandContext, id: Option<String>) -> Result<(Session, String)> {
    let creds = StoreCredentials::load()?.ok_or_else(|| {
        anyhow::anyhow!("No Docker Store credentials. Run `diver store login` first.")
    })?;
    let session = Session::connect(&ctx.config, &ctx.config.store_url, Some(creds.token.as_str()))?
        .with_identity(creds.docker_id.clone());
    let docker_id = id.filter(|id| !id.is_empty()).unwrap_or(creds.docker_id);
    Ok((session, docker_id))
}

async fn subscriptions(ctx: CommandContext, args: SubscriptionArgs) -> Result<()> {
    let (session, docker_id) = store_session(&ctx, args.id)?;
    let subs = get_all_subscriptions(&session, &docker_id).await?;

    match ctx.format {
        OutputFormat::Table => {
            let rows: Vec<SubscriptionRow> = subs.iter().map(SubscriptionRow::from).collect();
            print_output(&rows, ctx.format);
        }
        OutputFormat::Json => print_single(&subs),
    }
    Ok(())
}

async fn active(ctx: CommandContext, args: SubscriptionArgs) -> Result<()> {
    let (session, docker_id) = store_session(&ctx, args.id)?;
    let subs = get_all_subscriptions(&session, &docker_id).await?;

    let sub = first_active_subscription(&subs)
        .ok_or_else(|| CliError::NotFound("No active subscriptions found".to_string()))?;

    match ctx.format {
        OutputFormat::Table => println!("{}", sub.subscription_id),
        OutputFormat::Json => print_single(sub),
    }
    Ok(())
}
