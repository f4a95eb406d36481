//! Adapter implementations of the learning-cycle ports.

pub mod memory;
pub mod postgres;
