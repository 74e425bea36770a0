//! Async hosting for concurrent combats.
//!
//! This crate wraps the synchronous `combat-core` engine in worker tasks so
//! that many combats can run side by side while the commands of any single
//! combat are applied strictly one at a time.
//!
//! Modules are organized by responsibility:
//! - [`manager`] hosts the [`SessionManager`] entry point
//! - [`events`] provides the topic-based event bus
//! - [`repository`] stores snapshots for restoring combats
//! - [`config`] reads session tuning from the environment
//! - `workers` keeps background tasks internal to the crate
pub mod config;
pub mod error;
pub mod events;
mod id;
pub mod manager;
pub mod repository;

mod workers;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use events::{Event, EventBus, Topic};
pub use id::CombatId;
pub use manager::SessionManager;
pub use repository::{
    FileSnapshotRepository, InMemorySnapshotRepository, RepositoryError, Snapshot,
    SnapshotRepository,
};

/// Delta returned for each applied command.
pub type CombatStateDelta = combat_core::StateDelta;
