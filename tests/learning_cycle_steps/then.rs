//! Then steps for learning-cycle BDD scenarios.

use super::world::{LearningCycleWorld, parse_units, run_async};
use chrono::Days;
use rstest_bdd_macros::then;
use studycycle::task::{
    domain::{CycleNumber, LearningStage, Task},
    ports::{TaskFilter, TaskStore},
};

fn mastery_checks(world: &LearningCycleWorld) -> Result<Vec<Task>, eyre::Report> {
    let parent_id = world.planned()?.parent.id();
    let checks = run_async(
        world.store.list_tasks(
            &TaskFilter::new()
                .with_parent(parent_id)
                .with_cycle(CycleNumber::FINAL)
                .with_learning_stage(LearningStage::Perfect),
        ),
    )?;
    Ok(checks)
}

#[then("{count:usize} daily subtasks are created")]
fn daily_subtasks_created(world: &LearningCycleWorld, count: usize) -> Result<(), eyre::Report> {
    let found = world.planned()?.subtasks.len();
    if found != count {
        return Err(eyre::eyre!("expected {count} subtasks, found {found}"));
    }
    Ok(())
}

#[then(r#"the subtask workloads are "{workloads}""#)]
fn subtask_workloads(world: &LearningCycleWorld, workloads: String) -> Result<(), eyre::Report> {
    let expected = parse_units(&workloads)?;
    let actual: Vec<u32> = world
        .planned()?
        .subtasks
        .iter()
        .map(Task::total_units)
        .collect();
    if actual != expected {
        return Err(eyre::eyre!("expected workloads {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("exactly one mastery check exists")]
fn one_mastery_check(world: &LearningCycleWorld) -> Result<(), eyre::Report> {
    let checks = mastery_checks(world)?;
    if checks.len() != 1 {
        return Err(eyre::eyre!("expected one mastery check, found {}", checks.len()));
    }
    Ok(())
}

#[then("the mastery check is due {days:u64} days after the workload")]
fn mastery_check_due(world: &LearningCycleWorld, days: u64) -> Result<(), eyre::Report> {
    let expected = world
        .planned()?
        .parent
        .due_date()
        .checked_add_days(Days::new(days))
        .ok_or_else(|| eyre::eyre!("due date out of range"))?;
    let checks = mastery_checks(world)?;
    let check = checks
        .first()
        .ok_or_else(|| eyre::eyre!("missing mastery check"))?;
    if check.due_date() != expected {
        return Err(eyre::eyre!(
            "expected mastery check on {expected}, found {}",
            check.due_date()
        ));
    }
    Ok(())
}

#[then("{count:usize} review tasks are queued")]
fn review_tasks_queued(world: &LearningCycleWorld, count: usize) -> Result<(), eyre::Report> {
    let parent_id = world.planned()?.parent.id();
    let stored = run_async(
        world.store.list_tasks(
            &TaskFilter::new()
                .with_parent(parent_id)
                .with_cycle(CycleNumber::REVIEW),
        ),
    )?;
    if world.reviews.len() != count || stored.len() != count {
        return Err(eyre::eyre!(
            "expected {count} reviews, returned {} and stored {}",
            world.reviews.len(),
            stored.len()
        ));
    }
    Ok(())
}

#[then("no mastery check exists")]
fn no_mastery_check(world: &LearningCycleWorld) -> Result<(), eyre::Report> {
    let checks = mastery_checks(world)?;
    if !checks.is_empty() {
        return Err(eyre::eyre!("expected no mastery check, found {}", checks.len()));
    }
    Ok(())
}
