//! In-memory integration tests for the full learning cycle.

use super::helpers::{Harness, date, harness};
use eyre::ensure;
use rstest::rstest;
use std::collections::BTreeMap;
use studycycle::task::{
    domain::{CycleNumber, LearningStage, Pacing, TaskStatus, UnitType, UserId},
    ports::{TaskFilter, TaskStore},
    services::{FinalizationOutcome, MistakeReport, PlannedWorkload, SplitWorkloadRequest},
};

async fn plan(
    harness: &Harness,
    title: &str,
    total_units: u32,
    owner: UserId,
) -> eyre::Result<PlannedWorkload> {
    let request = SplitWorkloadRequest::new(
        title,
        total_units,
        UnitType::Pages,
        Pacing::Daily(4),
        date(2024, 5, 1),
        owner,
    )
    .with_estimated_minutes(90);
    Ok(harness.engine.plan_split_workload(request).await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_every_subtask_finalizes_exactly_once(harness: Harness) -> eyre::Result<()> {
    let owner = UserId::new();
    let planned = plan(&harness, "Geometry", 30, owner).await?;
    ensure!(planned.subtasks.len() == 8, "expected eight daily subtasks");

    let mut outcomes = Vec::new();
    for subtask in &planned.subtasks {
        let completed = harness.engine.complete_task(subtask.id(), None).await?;
        outcomes.push(completed.finalization);
    }

    let created: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Some(FinalizationOutcome::Finalized(task)) => Some(task),
            _ => None,
        })
        .collect();
    let [check] = created.as_slice() else {
        eyre::bail!("expected one finalization, got {}", created.len());
    };
    ensure!(
        check.due_date() == date(2024, 5, 10),
        "finalization due {}",
        check.due_date()
    );
    ensure!(check.cycle_number() == CycleNumber::FINAL, "cycle 3 expected");
    ensure!(check.learning_stage() == LearningStage::Perfect, "perfect stage expected");
    ensure!(check.estimated_minutes() == Some(45), "half of the estimate expected");

    let stored = harness
        .store
        .list_tasks(
            &TaskFilter::new()
                .with_parent(planned.parent.id())
                .with_cycle(CycleNumber::FINAL),
        )
        .await?;
    ensure!(stored.len() == 1, "exactly one finalization task stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mistakes_generate_reviews_before_finalization(harness: Harness) -> eyre::Result<()> {
    let owner = UserId::new();
    let planned = plan(&harness, "Physics", 12, owner).await?;
    let (last, earlier) = planned
        .subtasks
        .split_last()
        .ok_or_else(|| eyre::eyre!("planner produced no subtasks"))?;
    ensure!(earlier.len() == 2, "expected three daily subtasks");
    for subtask in earlier {
        harness.engine.complete_task(subtask.id(), None).await?;
    }

    let result = harness
        .engine
        .complete_task_with_mistakes(
            last.id(),
            Some(40),
            MistakeReport {
                units: vec![9, 11],
                cycle_number: CycleNumber::INITIAL,
                test_period_id: None,
            },
        )
        .await?;

    ensure!(result.reviews.len() == 2, "two review tasks expected");
    ensure!(
        result.completed.finalization == Some(FinalizationOutcome::Incomplete { open_subtasks: 2 }),
        "workload must wait for reviews: {:?}",
        result.completed.finalization
    );

    let mut final_outcome = None;
    for review in &result.reviews {
        final_outcome = harness
            .engine
            .complete_task(review.id(), None)
            .await?
            .finalization;
    }
    ensure!(
        matches!(final_outcome, Some(FinalizationOutcome::Finalized(_))),
        "last review should finalize the workload: {final_outcome:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_queue_never_exceeds_daily_capacity(harness: Harness) -> eyre::Result<()> {
    let owner = UserId::new();
    let first = plan(&harness, "History", 8, owner).await?;
    let second = plan(&harness, "Literature", 8, owner).await?;
    let batches = [
        (first.subtasks.first(), vec![1, 2, 3, 4]),
        (second.subtasks.first(), vec![2, 3, 4]),
    ];
    for (first_day, units) in batches {
        let subtask = first_day.ok_or_else(|| eyre::eyre!("missing subtask"))?;
        harness
            .engine
            .record_mistakes_and_regenerate(
                subtask.id(),
                &units,
                CycleNumber::INITIAL,
                owner,
                None,
            )
            .await?;
    }

    let queue = harness
        .store
        .list_tasks(
            &TaskFilter::new()
                .with_assignee(owner)
                .with_cycle(CycleNumber::REVIEW)
                .with_statuses([TaskStatus::NotStarted]),
        )
        .await?;
    ensure!(queue.len() == 7, "seven reviews expected, got {}", queue.len());

    let mut per_day = BTreeMap::new();
    for review in &queue {
        *per_day.entry(review.due_date()).or_insert(0_u32) += 1;
    }
    let expected = BTreeMap::from([
        (date(2024, 5, 2), 3),
        (date(2024, 5, 3), 3),
        (date(2024, 5, 4), 1),
    ]);
    ensure!(per_day == expected, "unexpected daily load: {per_day:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn progress_reaching_total_completes_through_engine(harness: Harness) -> eyre::Result<()> {
    let planned = plan(&harness, "Statistics", 4, UserId::new()).await?;
    let only = planned
        .subtasks
        .first()
        .ok_or_else(|| eyre::eyre!("missing subtask"))?;

    let partial = harness.engine.record_progress(only.id(), 2).await?;
    let full = harness.engine.record_progress(only.id(), 4).await?;

    ensure!(partial.task.status() == TaskStatus::InProgress, "in progress expected");
    ensure!(full.task.status() == TaskStatus::Completed, "completed expected");
    ensure!(
        matches!(full.finalization, Some(FinalizationOutcome::Finalized(_))),
        "single-day workload should finalize"
    );
    Ok(())
}
