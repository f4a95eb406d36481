//! When steps for learning-cycle BDD scenarios.

use super::world::{LearningCycleWorld, parse_units, run_async};
use chrono::NaiveDate;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use studycycle::task::{
    domain::{CycleNumber, Pacing, UnitType},
    services::{MistakeReport, SplitWorkloadRequest},
};

/// Plans a page workload starting on 2024-05-01 for the scenario learner.
pub fn plan_workload(
    world: &mut LearningCycleWorld,
    title: String,
    total: u32,
    daily: u32,
) -> Result<(), eyre::Report> {
    let learner = world
        .learner
        .ok_or_else(|| eyre::eyre!("missing learner in scenario world"))?;
    let start = NaiveDate::from_ymd_opt(2024, 5, 1)
        .ok_or_else(|| eyre::eyre!("invalid start date"))?;
    let request = SplitWorkloadRequest::new(
        title,
        total,
        UnitType::Pages,
        Pacing::Daily(daily),
        start,
        learner,
    );
    let planned = run_async(world.engine.plan_split_workload(request))
        .wrap_err("plan workload for scenario")?;
    world.planned = Some(planned);
    Ok(())
}

#[when(r#"the learner plans "{title}" with {total:u32} pages at {daily:u32} per day"#)]
fn learner_plans(
    world: &mut LearningCycleWorld,
    title: String,
    total: u32,
    daily: u32,
) -> Result<(), eyre::Report> {
    plan_workload(world, title, total, daily)
}

#[when("every daily subtask is completed")]
fn every_subtask_completed(world: &mut LearningCycleWorld) -> Result<(), eyre::Report> {
    let ids: Vec<_> = world.planned()?.subtasks.iter().map(|task| task.id()).collect();
    for task_id in ids {
        run_async(world.engine.complete_task(task_id, None)).wrap_err("complete subtask")?;
    }
    Ok(())
}

#[when("every daily subtask but the last is completed")]
fn all_but_last_completed(world: &mut LearningCycleWorld) -> Result<(), eyre::Report> {
    let planned = world.planned()?;
    let (_, earlier) = planned
        .subtasks
        .split_last()
        .ok_or_else(|| eyre::eyre!("workload has no subtasks"))?;
    let ids: Vec<_> = earlier.iter().map(|task| task.id()).collect();
    for task_id in ids {
        run_async(world.engine.complete_task(task_id, None)).wrap_err("complete subtask")?;
    }
    Ok(())
}

#[when(r#"the last subtask is completed with mistakes on pages "{pages}""#)]
fn last_completed_with_mistakes(
    world: &mut LearningCycleWorld,
    pages: String,
) -> Result<(), eyre::Report> {
    let last = world
        .planned()?
        .subtasks
        .last()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("workload has no subtasks"))?;
    let report = MistakeReport {
        units: parse_units(&pages)?,
        cycle_number: CycleNumber::INITIAL,
        test_period_id: None,
    };
    let result = run_async(world.engine.complete_task_with_mistakes(last, None, report))
        .wrap_err("complete subtask with mistakes")?;
    world.reviews = result.reviews;
    Ok(())
}
