//! Learning-cycle task management.
//!
//! A bulk workload is split into day-paced subtasks (cycle 1). Mistakes
//! recorded on completion turn into a paced review queue (cycle 2), and a
//! workload whose subtasks are all done receives a single mastery check
//! (cycle 3). Template workloads can be distributed to a whole grade. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
