//! Accounts, teams and access control records from the UCP auth API.

use std::collections::HashSet;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A user or organization account. The password field is never read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_org: bool,
}

/// One page of `/accounts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPage {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub next_page_start: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members_count: u32,
    #[serde(rename = "orgID", default)]
    pub org_id: String,
}

/// One page of `/accounts/{org}/teams`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPage {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub next_page_start: String,
    #[serde(default)]
    pub resource_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub system_role: bool,
    /// Operation tree, kept opaque.
    #[serde(default)]
    pub operations: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// "Subject has role on object."
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(rename = "roleID")]
    pub role_id: String,
    #[serde(rename = "subjectID")]
    pub subject_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GrantList {
    #[serde(default)]
    pub grants: Vec<Grant>,
}

/// Object ID UCP uses for a grant across every Kubernetes namespace.
pub const ALL_NAMESPACES_OBJECT: &str = "kubernetesnamespaces";

/// What a grant targets. Exactly one kind applies to a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GrantObjectKind {
    /// A swarm collection (the default target).
    Collection,
    /// A single Kubernetes namespace.
    Namespace,
    /// The all-namespaces grant object.
    Object,
}

impl GrantObjectKind {
    /// Classify a grant's object ID.
    ///
    /// Without a collection listing every non-special object is assumed to
    /// be a collection.
    pub fn classify(object_id: &str, collections: Option<&HashSet<String>>) -> Self {
        if object_id == ALL_NAMESPACES_OBJECT {
            return Self::Object;
        }
        match collections {
            Some(known) if !known.contains(object_id) => Self::Namespace,
            _ => Self::Collection,
        }
    }
}

impl fmt::Display for GrantObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collection => "collection",
            Self::Namespace => "namespace",
            Self::Object => "object",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_grant_objects() {
        let known: HashSet<String> = ["swarm".to_string(), "shared".to_string()].into();

        assert_eq!(
            GrantObjectKind::classify(ALL_NAMESPACES_OBJECT, Some(&known)),
            GrantObjectKind::Object
        );
        assert_eq!(
            GrantObjectKind::classify("swarm", Some(&known)),
            GrantObjectKind::Collection
        );
        assert_eq!(
            GrantObjectKind::classify("default", Some(&known)),
            GrantObjectKind::Namespace
        );
        assert_eq!(
            GrantObjectKind::classify("default", None),
            GrantObjectKind::Collection
        );
    }

    #[test]
    fn account_ignores_password() {
        let account: Account = serde_json::from_str(
            r#"{"id":"u1","name":"alice","fullName":"Alice","isActive":true,"isAdmin":false,"isOrg":false,"password":"hunter2","searchLDAP":false}"#,
        )
        .unwrap();
        assert_eq!(account.full_name, "Alice");
        assert!(!serde_json::to_string(&account).unwrap().contains("hunter2"));
    }
}
