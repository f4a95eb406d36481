//! Port contracts for learning-cycle task management.
//!
//! Ports define infrastructure-agnostic interfaces used by the services.

pub mod directory;
pub mod store;

pub use directory::{
    StudentDirectory, StudentDirectoryError, StudentDirectoryResult, StudentSummary,
};
pub use store::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult};

#[cfg(test)]
pub use store::MockTaskStore;
