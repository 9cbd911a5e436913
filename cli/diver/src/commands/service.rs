//! Service commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::error::CliError;
use crate::models::{ModeKind, Service, SpecSelector};
use crate::output::{print_output, print_single, render_service_spec, render_task_table, OutputFormat};
use crate::resolve::{get_all_services, get_service, query_service_containers, ServiceQuery};

use super::CommandContext;

/// Service commands.
#[derive(Debug, Args)]
pub struct ServiceCommand {
    #[command(subcommand)]
    command: ServiceSubcommand,
}

#[derive(Debug, Subcommand)]
enum ServiceSubcommand {
    /// List services, or the tasks of one service with --name.
    List(ListServicesArgs),

    /// Show the "design" (spec) of a service.
    Architecture(ArchitectureArgs),
}

#[derive(Debug, Args)]
struct ListServicesArgs {
    /// Examine a service by name.
    #[arg(long)]
    name: Option<String>,

    /// Display task ID.
    #[arg(long)]
    id: bool,

    /// Display task network connections.
    #[arg(long)]
    networks: bool,

    /// Display task state.
    #[arg(long)]
    state: bool,

    /// Display the node running each task.
    #[arg(long)]
    node: bool,

    /// Resolve IDs to human readable names.
    #[arg(long)]
    resolve: bool,
}

impl ListServicesArgs {
    fn query(&self, service_name: &str) -> ServiceQuery {
        ServiceQuery {
            service_name: service_name.to_string(),
            show_id: self.id,
            show_networks: self.networks,
            show_state: self.state,
            show_node: self.node,
            resolve_names: self.resolve,
        }
    }
}

#[derive(Debug, Args)]
struct ArchitectureArgs {
    /// Service name or ID.
    service: String,

    /// Display the previous service specification.
    #[arg(long, alias = "previousSpec")]
    previous_spec: bool,
}

impl ServiceCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ServiceSubcommand::List(args) => list(ctx, args).await,
            ServiceSubcommand::Architecture(args) => architecture(ctx, args).await,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Mode")]
    mode: String,

    #[tabled(rename = "Image")]
    image: String,

    #[tabled(rename = "Update", display = "display_option")]
    update_state: Option<String>,
}

fn display_option(opt: &Option<String>) -> String {
    opt.as_deref().unwrap_or("-").to_string()
}

impl From<&Service> for ServiceRow {
    fn from(service: &Service) -> Self {
        let mode = match service.spec.mode.kind() {
            Some(ModeKind::Replicated {
                replicas: Some(replicas),
            }) => format!("replicated ({})", replicas),
            Some(ModeKind::Replicated { replicas: None }) => "replicated".to_string(),
            Some(ModeKind::Global) => "global".to_string(),
            None => "-".to_string(),
        };

        Self {
            id: service.id.clone(),
            name: service.spec.name.clone(),
            mode,
            image: service
                .spec
                .task_template
                .container_spec
                .as_ref()
                .map(|c| c.image.clone())
                .unwrap_or_default(),
            update_state: service
                .update_status
                .as_ref()
                .and_then(|status| status.state.clone()),
        }
    }
}

async fn list(ctx: CommandContext, args: ListServicesArgs) -> Result<()> {
    let session = ctx.session()?;

    let Some(name) = args.name.as_deref() else {
        let services = get_all_services(&session).await?;
        match ctx.format {
            OutputFormat::Table => {
                let rows: Vec<ServiceRow> = services.iter().map(ServiceRow::from).collect();
                print_output(&rows, ctx.format);
            }
            OutputFormat::Json => print_single(&services),
        }
        return Ok(());
    };

    let query = args.query(name);
    info!(service = %query.service_name, "Looking for service tasks");
    let views = query_service_containers(&session, &query).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&views),
        OutputFormat::Table if views.is_empty() => {
            println!("{}", format!("No tasks found for service '{}'.", name).dimmed());
        }
        OutputFormat::Table => println!("{}", render_task_table(&views, &query)),
    }
    Ok(())
}

async fn architecture(ctx: CommandContext, args: ArchitectureArgs) -> Result<()> {
    let session = ctx.session()?;

    info!(service = %args.service, "Inspecting service");
    let service = get_service(&session, &args.service).await?;

    let selector = SpecSelector::from_previous_flag(args.previous_spec);
    let spec = selector.select(&service).ok_or_else(|| {
        CliError::NotFound(format!(
            "Service '{}' has no previous specification",
            args.service
        ))
    })?;

    match ctx.format {
        OutputFormat::Json => print_single(spec),
        OutputFormat::Table => println!("{}", render_service_spec(&service, spec)),
    }
    Ok(())
}
