//! Swarm service records as returned by `/services`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(default)]
    pub version: ObjectVersion,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub spec: ServiceSpec,

    #[serde(default)]
    pub previous_spec: Option<ServiceSpec>,

    #[serde(default)]
    pub update_status: Option<UpdateStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersion {
    #[serde(default)]
    pub index: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub task_template: TaskTemplate,

    #[serde(default)]
    pub mode: ServiceMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskTemplate {
    #[serde(default)]
    pub container_spec: Option<ContainerSpec>,

    #[serde(default)]
    pub resources: Option<ResourceRequirements>,

    #[serde(default)]
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRequirements {
    #[serde(default)]
    pub limits: Option<Resources>,

    #[serde(default)]
    pub reservations: Option<Resources>,
}

/// Memory and CPU amounts; either may be absent on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(rename = "MemoryBytes", default)]
    pub memory_bytes: Option<i64>,

    #[serde(rename = "NanoCPUs", default)]
    pub nano_cpus: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// Scheduling mode as sent by the engine. At most one field is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceMode {
    #[serde(default)]
    pub replicated: Option<ReplicatedMode>,

    #[serde(default)]
    pub global: Option<GlobalMode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicatedMode {
    #[serde(default)]
    pub replicas: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMode {}

/// The scheduling mode a spec actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Replicated { replicas: Option<u64> },
    Global,
}

impl ServiceMode {
    /// Collapse the wire representation into a single mode.
    ///
    /// Replicated takes precedence if a payload ever carries both.
    pub fn kind(&self) -> Option<ModeKind> {
        match (&self.replicated, &self.global) {
            (Some(replicated), _) => Some(ModeKind::Replicated {
                replicas: replicated.replicas,
            }),
            (None, Some(_)) => Some(ModeKind::Global),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateStatus {
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Which spec snapshot of a service to look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpecSelector {
    #[default]
    Current,
    Previous,
}

impl SpecSelector {
    pub fn from_previous_flag(previous: bool) -> Self {
        if previous {
            Self::Previous
        } else {
            Self::Current
        }
    }

    /// Pick the snapshot from a service. `Previous` is absent until the
    /// service has been updated at least once.
    pub fn select<'a>(&self, service: &'a Service) -> Option<&'a ServiceSpec> {
        match self {
            Self::Current => Some(&service.spec),
            Self::Previous => service.previous_spec.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_mode_decodes_from_empty_object() {
        let mode: ServiceMode = serde_json::from_str(r#"{"Global":{}}"#).unwrap();
        assert_eq!(mode.kind(), Some(ModeKind::Global));
    }

    #[test]
    fn absent_fields_stay_absent() {
        let service: Service = serde_json::from_str(r#"{"ID":"abc"}"#).unwrap();
        assert_eq!(service.version.index, 0);
        assert!(service.previous_spec.is_none());
        assert!(service.spec.task_template.resources.is_none());
        assert_eq!(service.spec.mode.kind(), None);
    }

    #[test]
    fn empty_reservations_have_no_values() {
        let resources: ResourceRequirements =
            serde_json::from_str(r#"{"Limits":{"MemoryBytes":102410241},"Reservations":{}}"#)
                .unwrap();
        assert_eq!(resources.reservations, Some(Resources::default()));
        assert_eq!(
            resources.limits.and_then(|l| l.memory_bytes),
            Some(102410241)
        );
    }

    #[test]
    fn previous_selector_is_none_without_history() {
        let service = Service::default();
        assert!(SpecSelector::Current.select(&service).is_some());
        assert!(SpecSelector::Previous.select(&service).is_none());
        assert_eq!(SpecSelector::from_previous_flag(true), SpecSelector::Previous);
    }
}
