//! Tasks and the nodes they are scheduled on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "ServiceID", default)]
    pub service_id: String,

    /// Empty until the scheduler has placed the task.
    #[serde(rename = "NodeID", default)]
    pub node_id: Option<String>,

    /// Only set for replicated services.
    #[serde(default)]
    pub slot: Option<u64>,

    #[serde(default)]
    pub desired_state: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(rename = "NetworksAttachments", alias = "NetworkAttachments", default)]
    pub network_attachments: Vec<NetworkAttachment>,
}

impl Task {
    /// Node ID, treating an empty string the same as no placement.
    pub fn assigned_node(&self) -> Option<&str> {
        self.node_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskStatus {
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub err: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkAttachment {
    #[serde(default)]
    pub network: AttachedNetwork,

    #[serde(default)]
    pub addresses: Vec<String>,
}

impl NetworkAttachment {
    /// `name(addr, ...)`, falling back to the network ID when unnamed.
    pub fn describe(&self) -> String {
        let name = if self.network.spec.name.is_empty() {
            self.network.id.as_str()
        } else {
            self.network.spec.name.as_str()
        };

        if self.addresses.is_empty() {
            name.to_string()
        } else {
            format!("{}({})", name, self.addresses.join(", "))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttachedNetwork {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(default)]
    pub spec: NetworkSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSpec {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(default)]
    pub description: NodeDescription,

    #[serde(default)]
    pub status: NodeStatus,

    #[serde(default)]
    pub spec: NodeSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeDescription {
    #[serde(default)]
    pub hostname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeStatus {
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub addr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeSpec {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub availability: String,
}
