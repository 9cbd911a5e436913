//! Resource resolution against the control plane.
//!
//! The API is ID-addressed and spread over independent endpoints. For UX,
//! the CLI accepts names and shows names back, so this module fetches the
//! canonical objects, fetches the lookup tables they reference (once), and
//! stitches the results together.
//!
//! Lookups used only for display degrade to raw IDs when they fail; the
//! primary object of a query always propagates its error.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::Session;
use crate::error::CliError;
use crate::models::{
    Account, AccountPage, Collection, Grant, GrantList, GrantObjectKind, Node, Role, Service,
    Subscription, Task, Team, TeamPage,
};

/// Page size used for paginated auth listings.
const PAGE_LIMIT: &str = "100";

/// A task query, built once from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceQuery {
    pub service_name: String,
    pub show_id: bool,
    pub show_networks: bool,
    pub show_state: bool,
    pub show_node: bool,
    pub resolve_names: bool,
}

/// Where a task runs, as far as it could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeRef {
    /// Not yet scheduled.
    Unassigned,
    /// Name resolution was not requested, or the lookup failed.
    Id { id: String },
    Named { id: String, name: String },
    /// The node was not in the lookup (removed since the task was placed).
    Missing { id: String },
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => f.write_str("-"),
            Self::Id { id } => f.write_str(id),
            Self::Named { name, .. } => f.write_str(name),
            Self::Missing { id } => write!(f, "{} (node not found)", id),
        }
    }
}

/// Result of a node lookup, fetched at most once per query.
#[derive(Debug, Clone, Default)]
pub enum NodeLookup {
    /// Names were not requested.
    #[default]
    Disabled,
    /// The lookup call failed; IDs are shown as-is.
    Unavailable,
    Loaded(HashMap<String, String>),
}

impl NodeLookup {
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self::Loaded(
            nodes
                .into_iter()
                .map(|node| (node.id, node.description.hostname))
                .collect(),
        )
    }

    pub fn node_ref(&self, node_id: Option<&str>) -> NodeRef {
        let Some(id) = node_id else {
            return NodeRef::Unassigned;
        };
        match self {
            Self::Disabled | Self::Unavailable => NodeRef::Id { id: id.to_string() },
            Self::Loaded(names) => match names.get(id) {
                Some(name) => NodeRef::Named {
                    id: id.to_string(),
                    name: name.clone(),
                },
                None => NodeRef::Missing { id: id.to_string() },
            },
        }
    }
}

/// A task annotated for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTaskView {
    pub task: Task,
    /// Owning service name, set only when names were resolved.
    pub service_name: Option<String>,
    pub node: NodeRef,
}

impl ResolvedTaskView {
    pub fn new(task: Task, service_name: Option<&str>, nodes: &NodeLookup) -> Self {
        let node = nodes.node_ref(task.assigned_node());
        Self {
            task,
            service_name: service_name.map(str::to_string),
            node,
        }
    }

    /// Engine-style task name: `<service>.<slot>` for replicated tasks,
    /// `<service>.<node>` for global ones.
    pub fn display_name(&self) -> String {
        let service = self
            .service_name
            .as_deref()
            .unwrap_or(&self.task.service_id);
        match (self.task.slot, self.task.assigned_node()) {
            (Some(slot), _) => format!("{}.{}", service, slot),
            (None, Some(node)) => format!("{}.{}", service, node),
            (None, None) => format!("{}.{}", service, self.task.id),
        }
    }
}

/// Fetch every service, in the order the control plane returns them.
pub async fn get_all_services(session: &Session) -> Result<Vec<Service>, CliError> {
    debug!("Retrieving all services");
    let services: Vec<Service> = session.get("/services").await?;
    info!(count = services.len(), "Retrieved services");
    Ok(services)
}

/// Fetch one service by name or ID.
pub async fn get_service(session: &Session, name: &str) -> Result<Service, CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow::anyhow!("Service name cannot be empty").into());
    }

    debug!(service = name, "Retrieving service");
    session
        .get(&format!("/services/{}", name))
        .await
        .map_err(|e| e.or_not_found(|| format!("Service '{}' not found", name)))
}

/// Resolve a service and its tasks, optionally naming the hosting nodes.
///
/// The node listing is fetched at most once regardless of task count.
pub async fn query_service_containers(
    session: &Session,
    query: &ServiceQuery,
) -> Result<Vec<ResolvedTaskView>, CliError> {
    let service = get_service(session, &query.service_name).await?;

    let filters = serde_json::json!({ "service": [&service.id] }).to_string();
    let mut tasks: Vec<Task> = session
        .get_with_query("/tasks", &[("filters", filters.as_str())])
        .await?;
    // The engine's service filter also matches on name prefixes.
    tasks.retain(|task| task.service_id == service.id);
    info!(service = %service.spec.name, tasks = tasks.len(), "Retrieved tasks");

    let nodes = if query.resolve_names && !tasks.is_empty() {
        node_lookup(session).await
    } else {
        NodeLookup::Disabled
    };
    let service_name = query.resolve_names.then_some(service.spec.name.as_str());

    Ok(tasks
        .into_iter()
        .map(|task| ResolvedTaskView::new(task, service_name, &nodes))
        .collect())
}

async fn node_lookup(session: &Session) -> NodeLookup {
    match session.get::<Vec<Node>>("/nodes").await {
        Ok(nodes) => {
            debug!(count = nodes.len(), "Retrieved nodes for name resolution");
            NodeLookup::from_nodes(nodes)
        }
        Err(e) => {
            warn!(error = %e, "Failed to resolve node names, showing node IDs");
            NodeLookup::Unavailable
        }
    }
}

/// List every account, following pagination.
pub async fn list_accounts(session: &Session) -> Result<Vec<Account>, CliError> {
    let mut cursor = PageCursor::default();
    let mut accounts = Vec::new();

    loop {
        let page: AccountPage = {
            let mut query = vec![("filter", "all"), ("limit", PAGE_LIMIT)];
            if let Some(start) = cursor.start() {
                query.push(("start", start));
            }
            session.get_with_query("/accounts", &query).await?
        };
        accounts.extend(page.accounts);

        if !cursor.advance("/accounts", page.next_page_start) {
            break;
        }
    }

    info!(count = accounts.len(), "Retrieved accounts");
    Ok(accounts)
}

/// List the teams of an organization, following pagination.
pub async fn list_teams(session: &Session, org: &str) -> Result<Vec<Team>, CliError> {
    let org = org.trim();
    if org.is_empty() {
        return Err(anyhow::anyhow!("Organization cannot be empty").into());
    }

    let path = format!("/accounts/{}/teams", org);
    let mut cursor = PageCursor::default();
    let mut teams = Vec::new();

    loop {
        let result: Result<TeamPage, CliError> = {
            let mut query = vec![("limit", PAGE_LIMIT)];
            if let Some(start) = cursor.start() {
                query.push(("start", start));
            }
            session.get_with_query(&path, &query).await
        };
        // Only a 404 on the first page means the organization is unknown.
        let page = match result {
            Err(e) if cursor.start().is_none() => {
                return Err(e.or_not_found(|| format!("Organization '{}' not found", org)))
            }
            other => other?,
        };
        debug!(
            org,
            page = page.teams.len(),
            total = page.resource_count,
            "Retrieved team page"
        );
        teams.extend(page.teams);

        if !cursor.advance(&path, page.next_page_start) {
            break;
        }
    }

    Ok(teams)
}

/// `nextPageStart` tracking for the auth listings.
///
/// Stops on an empty cursor, or on one the server has already handed out.
#[derive(Debug, Default)]
struct PageCursor {
    start: Option<String>,
    seen: HashSet<String>,
}

impl PageCursor {
    fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Move to the next page. Returns false when there is none to fetch.
    fn advance(&mut self, path: &str, next: String) -> bool {
        if next.is_empty() {
            return false;
        }
        if !self.seen.insert(next.clone()) {
            warn!(path, cursor = %next, "Server repeated a page cursor, stopping pagination");
            return false;
        }
        self.start = Some(next);
        true
    }
}

pub async fn list_roles(session: &Session) -> Result<Vec<Role>, CliError> {
    session.get("/roles").await
}

pub async fn list_collections(session: &Session) -> Result<Vec<Collection>, CliError> {
    session.get("/collections").await
}

/// A grant with its IDs resolved to names where possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantView {
    pub grant: Grant,
    pub kind: GrantObjectKind,
    pub subject: String,
    pub role: String,
    pub object: String,
}

/// ID → name tables used to annotate grants. Any of them may be missing.
#[derive(Debug, Clone, Default)]
pub struct GrantLookups {
    pub subjects: Option<HashMap<String, String>>,
    pub roles: Option<HashMap<String, String>>,
    pub collections: Option<HashMap<String, String>>,
}

impl GrantLookups {
    /// Annotate every grant, building the set of known collections once.
    pub fn views(&self, grants: Vec<Grant>) -> Vec<GrantView> {
        let known_collections: Option<HashSet<String>> = self
            .collections
            .as_ref()
            .map(|collections| collections.keys().cloned().collect());

        grants
            .into_iter()
            .map(|grant| self.view(grant, known_collections.as_ref()))
            .collect()
    }

    fn view(&self, grant: Grant, known_collections: Option<&HashSet<String>>) -> GrantView {
        let kind = GrantObjectKind::classify(&grant.object_id, known_collections);

        GrantView {
            kind,
            subject: lookup_name(self.subjects.as_ref(), &grant.subject_id),
            role: lookup_name(self.roles.as_ref(), &grant.role_id),
            object: lookup_name(self.collections.as_ref(), &grant.object_id),
            grant,
        }
    }
}

fn lookup_name(table: Option<&HashMap<String, String>>, id: &str) -> String {
    table
        .and_then(|names| names.get(id))
        .cloned()
        .unwrap_or_else(|| id.to_string())
}

/// Fetch all grants, optionally resolving subjects, roles and collections.
///
/// Each lookup table is fetched at most once.
pub async fn query_grants(
    session: &Session,
    resolve_names: bool,
) -> Result<Vec<GrantView>, CliError> {
    let list: GrantList = session.get("/collectionGrants").await?;
    info!(count = list.grants.len(), "Retrieved grants");

    let lookups = if resolve_names && !list.grants.is_empty() {
        GrantLookups {
            subjects: degrade(
                "accounts",
                list_accounts(session)
                    .await
                    .map(|accounts| accounts.into_iter().map(|a| (a.id, a.name)).collect()),
            ),
            roles: degrade(
                "roles",
                list_roles(session)
                    .await
                    .map(|roles| roles.into_iter().map(|r| (r.id, r.name)).collect()),
            ),
            collections: degrade(
                "collections",
                list_collections(session)
                    .await
                    .map(|cols| cols.into_iter().map(|c| (c.id, c.path)).collect()),
            ),
        }
    } else {
        GrantLookups::default()
    };

    Ok(lookups.views(list.grants))
}

fn degrade<T>(what: &str, result: Result<T, CliError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(lookup = what, error = %e, "Name lookup failed, showing IDs");
            None
        }
    }
}

/// Fetch all subscriptions owned by a Docker ID from the Store.
pub async fn get_all_subscriptions(
    store: &Session,
    docker_id: &str,
) -> Result<Vec<Subscription>, CliError> {
    debug!(docker_id, account = store.identity(), "Retrieving all subscriptions");
    let subscriptions: Vec<Subscription> = store
        .get_with_query("/", &[("docker_id", docker_id)])
        .await?;
    info!(count = subscriptions.len(), "Retrieved subscriptions");
    Ok(subscriptions)
}

/// First active subscription, in the order the Store returned them.
pub fn first_active_subscription(subscriptions: &[Subscription]) -> Option<&Subscription> {
    subscriptions.iter().find(|sub| sub.is_active())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, node: Option<&str>, slot: Option<u64>) -> Task {
        Task {
            id: id.to_string(),
            service_id: "svc1".to_string(),
            node_id: node.map(str::to_string),
            slot,
            ..Task::default()
        }
    }

    #[test]
    fn node_lookup_variants() {
        let lookup = NodeLookup::Loaded(HashMap::from([("n1".to_string(), "worker-1".to_string())]));

        assert_eq!(lookup.node_ref(None), NodeRef::Unassigned);
        assert_eq!(lookup.node_ref(Some("n1")).to_string(), "worker-1");
        assert_eq!(
            lookup.node_ref(Some("n2")).to_string(),
            "n2 (node not found)"
        );
        assert_eq!(NodeLookup::Unavailable.node_ref(Some("n1")).to_string(), "n1");
    }

    #[test]
    fn display_name_follows_engine_convention() {
        let named = ResolvedTaskView::new(
            task("t1", Some("n1"), Some(4)),
            Some("web"),
            &NodeLookup::Disabled,
        );
        assert_eq!(named.display_name(), "web.4");

        let global = ResolvedTaskView::new(task("t2", Some("n1"), None), None, &NodeLookup::Disabled);
        assert_eq!(global.display_name(), "svc1.n1");
    }

    fn grant(object: &str, role: &str, subject: &str) -> Grant {
        Grant {
            object_id: object.to_string(),
            role_id: role.to_string(),
            subject_id: subject.to_string(),
        }
    }

    #[test]
    fn grant_views_fall_back_to_ids() {
        let lookups = GrantLookups {
            subjects: Some(HashMap::from([("u1".to_string(), "alice".to_string())])),
            roles: None,
            collections: Some(HashMap::from([("swarm".to_string(), "/Swarm".to_string())])),
        };
        let views = lookups.views(vec![
            grant("swarm", "fullcontrol", "u1"),
            grant("default", "viewonly", "u2"),
            grant("swarm", "viewonly", "u2"),
        ]);

        assert_eq!(views[0].subject, "alice");
        assert_eq!(views[0].role, "fullcontrol");
        assert_eq!(views[0].object, "/Swarm");
        assert_eq!(views[0].kind, GrantObjectKind::Collection);

        assert_eq!(views[1].kind, GrantObjectKind::Namespace);
        assert_eq!(views[1].object, "default");
        assert_eq!(views[2].kind, GrantObjectKind::Collection);
        assert_eq!(views[2].subject, "u2");
    }

    #[test]
    fn page_cursor_stops_on_empty_or_repeated_cursor() {
        let mut cursor = PageCursor::default();
        assert_eq!(cursor.start(), None);

        assert!(cursor.advance("/accounts", "bob".to_string()));
        assert_eq!(cursor.start(), Some("bob"));
        assert!(cursor.advance("/accounts", "carol".to_string()));
        assert!(!cursor.advance("/accounts", "bob".to_string()));
        assert!(!cursor.advance("/accounts", String::new()));
    }

    #[test]
    fn first_active_is_in_server_order() {
        let subs = vec![
            Subscription {
                subscription_id: "a".to_string(),
                state: "cancelled".to_string(),
                ..Subscription::default()
            },
            Subscription {
                subscription_id: "b".to_string(),
                state: "active".to_string(),
                ..Subscription::default()
            },
            Subscription {
                subscription_id: "c".to_string(),
                state: "active".to_string(),
                ..Subscription::default()
            },
        ];
        assert_eq!(
            first_active_subscription(&subs).map(|s| s.subscription_id.as_str()),
            Some("b")
        );
        assert!(first_active_subscription(&subs[..1]).is_none());
    }
}
