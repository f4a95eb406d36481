//! Daily pacing plan for splitting a bulk workload into subtasks.
//!
//! The plan is computed without touching persistence so that invalid
//! pacing or date inputs are rejected before anything is written.

use super::{PlanError, UnitRange};
use chrono::{Days, NaiveDate};

/// How the daily pace of a split workload is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// A fixed number of units per day.
    Daily(u32),
    /// Derive the pace that covers the workload, repeated `cycle_repeats`
    /// times, within the start/end window.
    Auto,
}

/// Inputs for computing a split plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlanInput {
    /// Units in the workload.
    pub total_units: u32,
    /// Pace selection.
    pub pacing: Pacing,
    /// First day of the plan.
    pub start_date: NaiveDate,
    /// Last day of the window, inclusive.
    pub end_date: Option<NaiveDate>,
    /// How many times the workload should fit into the window.
    pub cycle_repeats: u32,
    /// Numbered content covered by the workload.
    pub unit_range: Option<UnitRange>,
    /// Effort estimate for the whole workload, in minutes.
    pub estimated_minutes: Option<u32>,
}

/// One day of a split plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySlice {
    /// Zero-based day offset from the start date.
    pub day_index: u32,
    /// Units assigned to this day.
    pub units: u32,
    /// Day the slice is due.
    pub due_date: NaiveDate,
    /// Numbered sub-range of this slice, when the workload is numbered.
    pub unit_range: Option<UnitRange>,
    /// Proportional share of the workload estimate.
    pub estimated_minutes: Option<u32>,
}

/// Ordered daily slices covering a workload exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    daily_units: u32,
    slices: Vec<DailySlice>,
}

impl SplitPlan {
    /// Computes the daily slices for a workload.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the workload or pace is zero, the window
    /// is empty, automatic pacing has no end date, or the unit range does
    /// not match the workload.
    pub fn compute(input: &SplitPlanInput) -> Result<Self, PlanError> {
        if input.total_units == 0 {
            return Err(PlanError::ZeroTotalUnits);
        }
        if input.cycle_repeats == 0 {
            return Err(PlanError::ZeroCycleRepeats);
        }
        if let Some(range) = input.unit_range {
            if range.len() != u64::from(input.total_units) {
                return Err(PlanError::UnitRangeMismatch {
                    total_units: input.total_units,
                    range_len: range.len(),
                });
            }
        }
        let window = input
            .end_date
            .map(|end| window_days(input.start_date, end))
            .transpose()?;

        let daily_units = match input.pacing {
            Pacing::Daily(units) => units,
            Pacing::Auto => {
                let days = window.ok_or(PlanError::MissingEndDate)?;
                auto_daily_units(input.total_units, input.cycle_repeats, days)?
            }
        };
        if daily_units == 0 {
            return Err(PlanError::ZeroDailyUnits);
        }

        let day_count = input.total_units.div_ceil(daily_units);
        let mut slices = Vec::with_capacity(usize::try_from(day_count).unwrap_or_default());
        let mut remaining = input.total_units;
        for day_index in 0..day_count {
            let units = daily_units.min(remaining);
            let offset = input.total_units - remaining;
            let due_date = input
                .start_date
                .checked_add_days(Days::new(u64::from(day_index)))
                .ok_or(PlanError::DateOutOfRange { day: day_index })?;
            slices.push(DailySlice {
                day_index,
                units,
                due_date,
                unit_range: input.unit_range.map(|range| chunk_range(range, offset, units)),
                estimated_minutes: input
                    .estimated_minutes
                    .map(|minutes| proportional_minutes(minutes, units, input.total_units)),
            });
            remaining -= units;
        }

        Ok(Self {
            daily_units,
            slices,
        })
    }

    /// Returns the resolved daily pace.
    #[must_use]
    pub const fn daily_units(&self) -> u32 {
        self.daily_units
    }

    /// Returns the slices in day order.
    #[must_use]
    pub fn slices(&self) -> &[DailySlice] {
        &self.slices
    }

    /// Returns the number of planned days.
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.slices.len()
    }

    /// Returns the sum of all slice sizes.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.slices.iter().map(|slice| u64::from(slice.units)).sum()
    }

    /// Returns the due date of the final slice.
    #[must_use]
    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.slices.last().map(|slice| slice.due_date)
    }
}

/// Number of days in an inclusive window.
fn window_days(start: NaiveDate, end: NaiveDate) -> Result<u64, PlanError> {
    let days = (end - start).num_days() + 1;
    u64::try_from(days)
        .ok()
        .filter(|count| *count > 0)
        .ok_or(PlanError::EmptyWindow { start, end })
}

fn auto_daily_units(total_units: u32, cycle_repeats: u32, window: u64) -> Result<u32, PlanError> {
    let demand = u64::from(total_units) * u64::from(cycle_repeats);
    u32::try_from(demand.div_ceil(window.max(1))).map_err(|_| PlanError::PaceOverflow)
}

fn chunk_range(range: UnitRange, offset: u32, units: u32) -> UnitRange {
    let start = range.start() + offset;
    UnitRange::new(start, start + units - 1).unwrap_or_else(|_| UnitRange::single(start))
}

/// Share of `minutes` proportional to `units / total`, rounded up.
pub(crate) fn proportional_minutes(minutes: u32, units: u32, total: u32) -> u32 {
    let share = (u64::from(minutes) * u64::from(units)).div_ceil(u64::from(total.max(1)));
    u32::try_from(share).unwrap_or(minutes)
}
