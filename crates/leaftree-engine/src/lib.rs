//! LeafTree Engine - Orchestration layer
//!
//! `TreeService` owns the canonical tree behind one read/write lock and
//! sequences every operation as: check preconditions in memory, apply the
//! filesystem effect through the node store, update the tree, persist.
//! `commands` exposes the same operations as data for boundary layers.

pub mod commands;
pub mod config;
pub mod service;

pub use config::TreeServiceConfig;
pub use service::{EnsurePathResult, Page, RebuildReport, TreeService};
