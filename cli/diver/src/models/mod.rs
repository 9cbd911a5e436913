//! Wire types for the UCP, engine and Store APIs.
//!
//! Absent fields decode to `None` or an empty value, never a synthesized default.

mod access;
mod service;
mod subscription;
mod task;

pub use access::{
    Account, AccountPage, Collection, Grant, GrantList, GrantObjectKind, Role, Team, TeamPage,
    ALL_NAMESPACES_OBJECT,
};
pub use service::{
    ContainerSpec, GlobalMode, ModeKind, ObjectVersion, Placement, ReplicatedMode,
    ResourceRequirements, Resources, Service, ServiceMode, ServiceSpec, SpecSelector,
    TaskTemplate, UpdateStatus,
};
pub use subscription::{Eusa, PricingComponent, Subscription};
pub use task::{
    AttachedNetwork, NetworkAttachment, NetworkSpec, Node, NodeDescription, NodeSpec,
    NodeStatus, Task, TaskStatus,
};
