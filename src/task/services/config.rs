//! Tunable pacing and fan-out settings for the learning-cycle services.

use crate::task::domain::FinalizationRules;
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU32, NonZeroUsize};

/// Configuration shared by the learning-cycle services.
///
/// Missing fields fall back to [`CycleConfig::default`] when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Review tasks scheduled per day.
    pub review_units_per_day: NonZeroU32,
    /// Days between a workload's due date and its mastery check.
    pub finalization_offset_days: u32,
    /// Mastery check effort as a percentage of the workload estimate.
    pub finalization_time_percent: u32,
    /// Maximum assignees cloned concurrently during distribution.
    pub distribution_parallelism: NonZeroUsize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            review_units_per_day: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            finalization_offset_days: 2,
            finalization_time_percent: 50,
            distribution_parallelism: NonZeroUsize::new(8).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl CycleConfig {
    /// Creates a configuration that clones one assignee at a time.
    ///
    /// Useful when the store cannot take concurrent writers.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            distribution_parallelism: NonZeroUsize::MIN,
            ..Self::default()
        }
    }

    /// Sets the daily review capacity.
    #[must_use]
    pub const fn with_review_units_per_day(mut self, units: NonZeroU32) -> Self {
        self.review_units_per_day = units;
        self
    }

    /// Returns the mastery-check scheduling rules.
    #[must_use]
    pub const fn finalization_rules(&self) -> FinalizationRules {
        FinalizationRules {
            offset_days: self.finalization_offset_days,
            time_percent: self.finalization_time_percent,
        }
    }
}
