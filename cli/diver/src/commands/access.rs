//! Account and access control commands.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::models::{Account, Collection, GrantObjectKind, Role, Team};
use crate::output::{print_output, print_single, OutputFormat};
use crate::resolve::{list_accounts, list_collections, list_roles, list_teams, query_grants};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct TeamsArgs {
    /// Organization name.
    org: String,
}

#[derive(Debug, Args)]
pub struct GrantsArgs {
    /// Resolve subject, role and collection IDs to names.
    #[arg(long)]
    resolve: bool,

    /// Only show grants targeting this kind of object.
    #[arg(long, value_enum)]
    kind: Option<GrantObjectKind>,
}

#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Full Name")]
    full_name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Active")]
    active: bool,
    #[tabled(rename = "Admin")]
    admin: bool,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            full_name: account.full_name.clone(),
            kind: if account.is_org { "org" } else { "user" },
            active: account.is_active,
            admin: account.is_admin,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct TeamRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Members")]
    members: u32,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id.clone(),
            name: team.name.clone(),
            members: team.members_count,
            description: team.description.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "System")]
    system: bool,
}

impl From<&Role> for RoleRow {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.clone(),
            name: role.name.clone(),
            system: role.system_role,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct CollectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&Collection> for CollectionRow {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            path: collection.path.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Object")]
    object: String,
    #[tabled(rename = "Kind")]
    kind: GrantObjectKind,
}

/// Print rows as a table, or the raw records as JSON.
fn print_rows<'a, T, R>(items: &'a [T], format: OutputFormat)
where
    T: Serialize,
    R: Serialize + Tabled + From<&'a T>,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(R::from).collect();
            print_output(&rows, format);
        }
        OutputFormat::Json => print_single(&items),
    }
}

pub async fn accounts(ctx: CommandContext) -> Result<()> {
    let session = ctx.session()?;
    let accounts = list_accounts(&session).await?;
    print_rows::<_, AccountRow>(&accounts, ctx.format);
    Ok(())
}

pub async fn teams(ctx: CommandContext, args: TeamsArgs) -> Result<()> {
    let session = ctx.session()?;
    let teams = list_teams(&session, &args.org).await?;
    print_rows::<_, TeamRow>(&teams, ctx.format);
    Ok(())
}

pub async fn roles(ctx: CommandContext) -> Result<()> {
    let session = ctx.session()?;
    let roles = list_roles(&session).await?;
    print_rows::<_, RoleRow>(&roles, ctx.format);
    Ok(())
}

pub async fn collections(ctx: CommandContext) -> Result<()> {
    let session = ctx.session()?;
    let collections = list_collections(&session).await?;
    print_rows::<_, CollectionRow>(&collections, ctx.format);
    Ok(())
}

pub async fn grants(ctx: CommandContext, args: GrantsArgs) -> Result<()> {
    let session = ctx.session()?;
    let mut grants = query_grants(&session, args.resolve).await?;
    if let Some(kind) = args.kind {
        grants.retain(|view| view.kind == kind);
    }

    match ctx.format {
        OutputFormat::Table => {
            let rows: Vec<GrantRow> = grants
                .into_iter()
                .map(|view| GrantRow {
                    subject: view.subject,
                    role: view.role,
                    object: view.object,
                    kind: view.kind,
                })
                .collect();
            print_output(&rows, ctx.format);
        }
        OutputFormat::Json => print_single(&grants),
    }
    Ok(())
}
