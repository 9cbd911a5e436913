//! Authentication commands.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::Session;
use crate::config::Credentials;
use crate::models::Account;
use crate::output::{print_info, print_single, print_success, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// UCP URL, saved as the default for later commands.
    #[arg(long, env = "DIVER_UCP_URL")]
    url: Option<String>,

    /// Existing bearer token (skips username/password login).
    #[arg(long, env = "DIVER_TOKEN", conflicts_with_all = ["username", "password"])]
    token: Option<String>,

    /// Account name.
    #[arg(long, requires = "password")]
    username: Option<String>,

    /// Account password.
    #[arg(long, env = "DIVER_PASSWORD", requires = "username")]
    password: Option<String>,

    /// Accept self-signed UCP certificates.
    #[arg(long)]
    insecure: bool,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth_token: String,
}

/// Log in and persist the token.
pub async fn login(mut ctx: CommandContext, args: LoginArgs) -> Result<()> {
    if let Some(url) = args.url {
        ctx.config.ucp_url = url;
    }
    if args.insecure {
        ctx.config.insecure = true;
    }

    let token = match (args.token, args.username.as_deref(), args.password.as_deref()) {
        (Some(token), _, _) => token,
        (None, Some(username), Some(password)) => {
            let anonymous = Session::connect(&ctx.config, &ctx.config.ucp_url, None)?;
            let response: LoginResponse = anonymous
                .post("/auth/login", &LoginRequest { username, password })
                .await?;
            response.auth_token
        }
        _ => {
            print_info("Use --token, or --username with --password.");
            return Ok(());
        }
    };

    let mut creds = Credentials::new(token);

    // Validate token and fetch identity.
    let session = Session::from_credentials(&ctx.config, Some(&creds))?;
    let account: Account = session.get("/id/").await?;
    info!(account = %account.name, "Authenticated against UCP");
    creds.username = Some(account.name);

    ctx.config.save()?;
    creds.save()?;

    print_success("Logged in successfully.");
    Ok(())
}

/// Remove stored credentials.
pub async fn logout(_ctx: CommandContext) -> Result<()> {
    Credentials::delete()?;
    print_success("Logged out successfully.");
    Ok(())
}

/// Show authentication status.
pub async fn status(ctx: CommandContext) -> Result<()> {
    match ctx.credentials {
        Some(creds) => {
            println!("{} Authenticated", "Status:".green().bold());
            println!("  UCP: {}", ctx.config.ucp_url);

            if let Some(username) = &creds.username {
                println!("  Account: {}", username);
            }
        }
        None => {
            println!("{} Not authenticated", "Status:".red().bold());
            println!("\nRun {} to log in.", "diver ucp login".cyan());
        }
    }

    Ok(())
}

/// Show who the stored token belongs to.
pub async fn whoami(ctx: CommandContext) -> Result<()> {
    let session = ctx.session()?;
    let account: Account = session.get("/id/").await?;

    match ctx.format {
        OutputFormat::Json => print_single(&account),
        OutputFormat::Table => {
            if account.full_name.is_empty() {
                println!("{}", account.name);
            } else {
                println!("{} ({})", account.full_name, account.name);
            }
        }
    }

    Ok(())
}
