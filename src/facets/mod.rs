//! Namespaced groups of API methods sharing one dispatcher.

pub mod team;

pub use team::{AccessLogsOptions, BillableInfoOptions, IntegrationLogsOptions, TeamFacet};
