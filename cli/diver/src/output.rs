//! Output formatting for CLI commands.

use colored::Colorize;
use serde::Serialize;
use tabled::settings::{Padding, Style};
use tabled::{builder::Builder, Table, Tabled};

use crate::models::{ModeKind, Resources, Service, ServiceSpec};
use crate::resolve::{ResolvedTaskView, ServiceQuery};

const CLI_SCHEMA_VERSION: &str = "diver.cli.v1";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// Print data in the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No items found.".dimmed());
            } else {
                let table = Table::new(data).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = format_json(data, "[]");
            println!("{}", json);
        }
    }
}

/// Print a single item as JSON.
pub fn print_single<T: Serialize>(data: &T) {
    println!("{}", format_json(data, "{}"));
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

/// Render one spec snapshot of a service as aligned `key value` lines.
///
/// Resource lines appear only for values present in the spec, and the mode
/// line is either a replica count or a global marker.
pub fn render_service_spec(service: &Service, spec: &ServiceSpec) -> String {
    let mut builder = Builder::default();
    let mut row = |key: &str, value: String, extra: String| {
        builder.push_record([key.to_string(), value, extra]);
    };

    row("ID:", service.id.clone(), String::new());
    row("Version:", service.version.index.to_string(), String::new());
    row("Name:", spec.name.clone(), String::new());

    let container = spec.task_template.container_spec.clone().unwrap_or_default();
    row("Image:", container.image, String::new());
    row("Cmd:", container.command.join(" "), String::new());
    row("Args:", container.args.join(" "), String::new());

    row("Labels:", String::new(), String::new());
    for (key, value) in &container.labels {
        row("", key.clone(), value.clone());
    }

    if let Some(placement) = spec
        .task_template
        .placement
        .as_ref()
        .filter(|p| !p.constraints.is_empty())
    {
        row("Constraints:", String::new(), String::new());
        for constraint in &placement.constraints {
            row("", constraint.clone(), String::new());
        }
    }

    if let Some(resources) = &spec.task_template.resources {
        for (kind, amounts) in [
            ("Reservation", resources.reservations),
            ("Limits", resources.limits),
        ] {
            let Some(Resources {
                memory_bytes,
                nano_cpus,
            }) = amounts
            else {
                continue;
            };
            if let Some(bytes) = memory_bytes {
                row(&format!("Memory {}:", kind), bytes.to_string(), String::new());
            }
            if let Some(cpus) = nano_cpus {
                row(&format!("CPU {}:", kind), cpus.to_string(), String::new());
            }
        }
    }

    match spec.mode.kind() {
        Some(ModeKind::Replicated { replicas }) => row(
            "Replicas:",
            replicas.map_or_else(|| "-".to_string(), |n| n.to_string()),
            String::new(),
        ),
        Some(ModeKind::Global) => row("Global:", "true".to_string(), String::new()),
        None => {}
    }

    if let Some(status) = &service.update_status {
        if let Some(state) = &status.state {
            row("Update State:", state.clone(), String::new());
        }
        if let Some(message) = &status.message {
            row("Update Message:", message.clone(), String::new());
        }
    }

    let mut table = builder.build();
    table.with(Style::blank()).with(Padding::new(0, 1, 0, 0));
    table
        .to_string()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render resolved tasks with the columns selected by the query flags.
pub fn render_task_table(views: &[ResolvedTaskView], query: &ServiceQuery) -> String {
    let mut header = vec!["Task".to_string()];
    for (enabled, title) in [
        (query.show_id, "ID"),
        (query.show_node, "Node"),
        (query.show_state, "State"),
        (query.show_networks, "Networks"),
    ] {
        if enabled {
            header.push(title.to_string());
        }
    }

    let mut builder = Builder::default();
    builder.push_record(header);

    for view in views {
        let mut record = vec![view.display_name()];
        if query.show_id {
            record.push(view.task.id.clone());
        }
        if query.show_node {
            record.push(view.node.to_string());
        }
        if query.show_state {
            record.push(task_state(view));
        }
        if query.show_networks {
            record.push(
                view.task
                    .network_attachments
                    .iter()
                    .map(|attachment| attachment.describe())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        builder.push_record(record);
    }

    builder.build().to_string()
}

fn task_state(view: &ResolvedTaskView) -> String {
    let status = &view.task.status;
    match view.task.desired_state.as_deref() {
        Some(desired) if desired != status.state => format!("{} (desired: {})", status.state, desired),
        _ => status.state.clone(),
    }
}

fn format_json<T: Serialize + ?Sized>(data: &T, fallback: &str) -> String {
    let value = serde_json::to_value(data).unwrap_or_else(|_| serde_json::json!({}));
    let wrapped = wrap_with_schema(value);
    let sorted = sort_json_value(wrapped);
    serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| fallback.to_string())
}

fn wrap_with_schema(value: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "schemaVersion": CLI_SCHEMA_VERSION,
        "data": value
    })
}

fn sort_json_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(values) => {
            serde_json::Value::Array(values.into_iter().map(sort_json_value).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut pairs: Vec<_> = entries.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let mut mapped = serde_json::Map::new();
            for (key, value) in pairs {
                mapped.insert(key, sort_json_value(value));
            }
            serde_json::Value::Object(mapped)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;
    use crate::models::{
        ContainerSpec, GlobalMode, ReplicatedMode, ResourceRequirements, ServiceMode,
        TaskTemplate,
    };

    /// Collapse column padding so assertions don't depend on widths.
    fn lines(rendered: &str) -> Vec<String> {
        rendered
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect()
    }

    fn spec_with(mode: ServiceMode, resources: Option<ResourceRequirements>) -> ServiceSpec {
        ServiceSpec {
            name: "web".to_string(),
            labels: BTreeMap::new(),
            task_template: TaskTemplate {
                container_spec: Some(ContainerSpec {
                    image: "nginx:1.15".to_string(),
                    labels: BTreeMap::from([
                        ("tier".to_string(), "frontend".to_string()),
                        ("owner".to_string(), "ops".to_string()),
                    ]),
                    command: vec![],
                    args: vec!["-g".to_string(), "daemon off;".to_string()],
                }),
                resources,
                placement: None,
            },
            mode,
        }
    }

    #[test]
    fn empty_command_renders_nothing_after_key() {
        let service = Service::default();
        let out = lines(&render_service_spec(&service, &spec_with(ServiceMode::default(), None)));
        assert!(out.contains(&"Cmd:".to_string()));
        assert!(out.contains(&"Args: -g daemon off;".to_string()));
    }

    #[test]
    fn report_lines_have_no_edge_padding() {
        let service = Service {
            id: "svc1".to_string(),
            ..Service::default()
        };
        let rendered = render_service_spec(&service, &spec_with(ServiceMode::default(), None));
        let raw: Vec<&str> = rendered.lines().collect();

        assert!(raw[0].starts_with("ID:"));
        assert!(raw.contains(&"Cmd:"));
        assert!(raw.iter().all(|line| !line.ends_with(' ')));
    }

    #[test]
    fn labels_render_sorted() {
        let service = Service::default();
        let out = lines(&render_service_spec(&service, &spec_with(ServiceMode::default(), None)));
        let owner = out.iter().position(|l| l == "owner ops").unwrap();
        let tier = out.iter().position(|l| l == "tier frontend").unwrap();
        assert!(owner < tier);
    }

    #[test]
    fn missing_resources_omit_resource_lines() {
        let service = Service::default();
        let out = render_service_spec(&service, &spec_with(ServiceMode::default(), None));
        assert!(!out.contains("Memory"));
        assert!(!out.contains("CPU"));
    }

    #[test]
    fn cpu_values_render_when_present() {
        let resources = ResourceRequirements {
            limits: Some(Resources {
                memory_bytes: None,
                nano_cpus: Some(500_000_000),
            }),
            reservations: None,
        };
        let out = lines(&render_service_spec(
            &Service::default(),
            &spec_with(ServiceMode::default(), Some(resources)),
        ));
        assert!(out.contains(&"CPU Limits: 500000000".to_string()));
        assert!(!out.iter().any(|l| l.starts_with("Memory")));
    }

    proptest! {
        #[test]
        fn mode_lines_are_exclusive(replicas in proptest::option::of(0u64..10_000), global in any::<bool>()) {
            let mode = if global {
                ServiceMode { replicated: None, global: Some(GlobalMode {}) }
            } else {
                ServiceMode { replicated: Some(ReplicatedMode { replicas }), global: None }
            };
            let out = lines(&render_service_spec(&Service::default(), &spec_with(mode, None)));
            let has_replicas = out.iter().any(|l| l.starts_with("Replicas:"));
            let has_global = out.contains(&"Global: true".to_string());
            prop_assert!(has_replicas != has_global);
            prop_assert_eq!(has_global, global);
        }
    }

    #[test]
    fn json_output_is_wrapped_and_sorted() {
        let value = serde_json::json!({ "b": 1, "a": { "d": 2, "c": 3 } });
        let out = format_json(&value, "{}");
        let expected = serde_json::json!({
            "data": { "a": { "c": 3, "d": 2 }, "b": 1 },
            "schemaVersion": "diver.cli.v1"
        });
        assert_eq!(
            out,
            serde_json::to_string_pretty(&expected).unwrap()
        );
    }
}
