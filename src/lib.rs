//! Studycycle: learning-cycle task generation and distribution.
//!
//! This crate turns study workloads into paced daily tasks, regenerates
//! review work from recorded mistakes, finalizes completed workloads with a
//! mastery check and replicates template workloads to groups of learners.
//!
//! # Architecture
//!
//! Studycycle follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and rosters
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`task`]: Workload planning, review cycles and distribution

pub mod task;
