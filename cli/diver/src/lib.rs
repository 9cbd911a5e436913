//! diver - operator CLI for Docker UCP.
//!
//! Queries services, tasks, nodes and access control records from a UCP
//! control plane (and subscriptions from the Docker Store) and renders them
//! as reports. Every command is one read-only request/response cycle.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod resolve;
pub mod ucp_error;
