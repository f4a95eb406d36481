//! Step definitions for learning-cycle scenarios.

mod given;
mod then;
mod when;
pub mod world;
