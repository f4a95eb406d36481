//! In-memory integration tests for grade-wide distribution.

use super::helpers::{Harness, date, harness};
use eyre::ensure;
use rstest::rstest;
use studycycle::task::{
    domain::{GradeId, Pacing, TaskKind, TaskStatus, UnitType, UserId},
    ports::{StudentSummary, TaskFilter, TaskStore},
    services::{DistributeTaskRequest, SplitWorkloadRequest},
};

fn enroll(harness: &Harness, grade: GradeId, names: &[&str]) -> eyre::Result<Vec<StudentSummary>> {
    let mut students = Vec::with_capacity(names.len());
    for name in names {
        let student = StudentSummary::new(UserId::new(), *name);
        harness.directory.enroll(grade, student.clone())?;
        students.push(student);
    }
    Ok(students)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn distributed_copies_progress_independently(harness: Harness) -> eyre::Result<()> {
    let grade = GradeId::new();
    let students = enroll(&harness, grade, &["Ada", "Grace"])?;
    let planned = harness
        .engine
        .plan_split_workload(SplitWorkloadRequest::new(
            "Shared reading",
            8,
            UnitType::Pages,
            Pacing::Daily(4),
            date(2024, 5, 1),
            UserId::new(),
        ))
        .await?;

    let report = harness
        .engine
        .distribute_task(DistributeTaskRequest::for_grade(planned.parent.id(), grade))
        .await?;
    ensure!(report.success_count == 2 && report.error_count == 0, "{report:?}");

    let mut copies = Vec::new();
    for student in &students {
        let owned = harness
            .store
            .list_tasks(&TaskFilter::new().with_assignee(student.id))
            .await?;
        let parent = owned
            .into_iter()
            .find(|task| task.kind() == TaskKind::Parent)
            .ok_or_else(|| eyre::eyre!("no copy for {}", student.display_name))?;
        copies.push(parent);
    }
    let [ada, grace] = copies.as_slice() else {
        eyre::bail!("expected two copies");
    };

    let ada_days = harness
        .store
        .list_tasks(&TaskFilter::new().with_parent(ada.id()))
        .await?;
    for day in &ada_days {
        harness.engine.complete_task(day.id(), None).await?;
    }

    let grace_open = harness
        .store
        .list_tasks(
            &TaskFilter::new()
                .with_parent(grace.id())
                .with_statuses(TaskStatus::OPEN),
        )
        .await?;
    let due: Vec<_> = grace_open.iter().map(|task| task.due_date()).collect();
    ensure!(
        due == vec![date(2024, 5, 1), date(2024, 5, 2)],
        "Grace's copy must be untouched: {due:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_grade_produces_empty_report(harness: Harness) -> eyre::Result<()> {
    let planned = harness
        .engine
        .plan_split_workload(SplitWorkloadRequest::new(
            "Unassigned",
            2,
            UnitType::Hours,
            Pacing::Daily(1),
            date(2024, 5, 1),
            UserId::new(),
        ))
        .await?;

    let report = harness
        .engine
        .distribute_task(DistributeTaskRequest::for_grade(
            planned.parent.id(),
            GradeId::new(),
        ))
        .await?;

    ensure!(report.success_count == 0 && report.error_count == 0, "{report:?}");
    ensure!(report.errors.is_empty(), "no errors expected");
    Ok(())
}
