//! Domain-focused tests for task invariants and cycle construction.

use super::support::{FixedClock, date, task};
use crate::task::{
    domain::{
        CycleNumber, FinalizationRules, LearningStage, NewTask, ReviewTarget, Task,
        TaskDomainError, TaskKind, TaskStatus, UnitRange, UnitType, UserId, WorkloadProgress,
        build_finalization_task, build_review_task, review_due_offset, schedule_review_queue,
    },
    ports::TaskFilter,
};
use rstest::{fixture, rstest};
use std::num::NonZeroU32;

#[fixture]
fn clock() -> FixedClock {
    FixedClock::on(2024, 5, 1)
}

#[fixture]
fn owner() -> UserId {
    UserId::new()
}

fn new_task(owner: UserId) -> NewTask {
    NewTask {
        title: "  Biology chapter 3  ".to_owned(),
        description: Some("Cells".to_owned()),
        kind: TaskKind::Single,
        cycle_number: CycleNumber::INITIAL,
        learning_stage: LearningStage::Overview,
        unit_type: UnitType::Sections,
        total_units: 5,
        unit_range: Some(UnitRange::new(1, 5).expect("valid range")),
        estimated_minutes: None,
        start_date: None,
        due_date: date(2024, 5, 3),
        assigned_to: owner,
        created_by: owner,
        test_period_id: None,
        is_shared: false,
    }
}

#[rstest]
fn new_task_trims_title_and_starts_unopened(clock: FixedClock, owner: UserId) {
    let created = Task::new(new_task(owner), &clock).expect("valid task");

    assert_eq!(created.title(), "Biology chapter 3");
    assert_eq!(created.status(), TaskStatus::NotStarted);
    assert_eq!(created.completed_units(), 0);
    assert_eq!(created.created_at(), clock.0);
    assert!(!created.is_finalization());
}

#[rstest]
#[case::blank_title(NewTask { title: "   ".to_owned(), ..new_task(UserId::new()) }, TaskDomainError::EmptyTitle)]
#[case::zero_units(NewTask { total_units: 0, unit_range: None, ..new_task(UserId::new()) }, TaskDomainError::ZeroTotalUnits)]
#[case::range_mismatch(
    NewTask { total_units: 4, ..new_task(UserId::new()) },
    TaskDomainError::UnitRangeMismatch { total_units: 4, range_len: 5 }
)]
#[case::perfect_outside_subtask(
    NewTask { learning_stage: LearningStage::Perfect, ..new_task(UserId::new()) },
    TaskDomainError::PerfectStageRequiresSubtask
)]
fn new_task_rejects_invalid_input(
    clock: FixedClock,
    #[case] fields: NewTask,
    #[case] expected: TaskDomainError,
) {
    assert_eq!(Task::new(fields, &clock), Err(expected));
}

#[rstest]
fn cycle_number_and_unit_range_validate_bounds() {
    assert_eq!(CycleNumber::new(0), Err(TaskDomainError::InvalidCycleNumber(0)));
    assert_eq!(CycleNumber::new(2), Ok(CycleNumber::REVIEW));
    assert_eq!(
        UnitRange::new(9, 3),
        Err(TaskDomainError::InvalidUnitRange { start: 9, end: 3 })
    );
    assert_eq!(UnitRange::new(11, 14).expect("valid").to_string(), "11-14");
    assert_eq!(UnitRange::single(7).to_string(), "7");
}

#[rstest]
fn record_progress_moves_task_in_progress(clock: FixedClock, owner: UserId) {
    let mut subject = Task::new(new_task(owner), &clock).expect("valid task");

    subject.record_progress(2, &clock).expect("progress within bounds");

    assert_eq!(subject.status(), TaskStatus::InProgress);
    assert_eq!(subject.completed_units(), 2);
    let overflow = subject.record_progress(6, &clock);
    assert_eq!(
        overflow,
        Err(TaskDomainError::ProgressExceedsTotal {
            task_id: subject.id(),
            completed: 6,
            total: 5,
        })
    );
}

#[rstest]
fn complete_fills_progress_and_rejects_second_completion(clock: FixedClock, owner: UserId) {
    let mut subject = Task::new(new_task(owner), &clock).expect("valid task");

    subject.complete(Some(42), &clock).expect("first completion");

    assert_eq!(subject.status(), TaskStatus::Completed);
    assert_eq!(subject.completed_units(), 5);
    assert_eq!(subject.actual_minutes(), Some(42));
    assert_eq!(subject.completed_at(), Some(clock.0));
    assert_eq!(
        subject.complete(None, &clock),
        Err(TaskDomainError::TaskAlreadyCompleted(subject.id()))
    );
}

#[rstest]
fn share_copy_resets_progress_for_new_assignee(clock: FixedClock, owner: UserId) {
    let mut template = Task::new(new_task(owner), &clock).expect("valid task");
    template.complete(Some(30), &clock).expect("completion");
    let learner = UserId::new();

    let copy = template.share_copy(learner, TaskKind::Single, &clock);

    assert_ne!(copy.id(), template.id());
    assert_eq!(copy.assigned_to(), learner);
    assert_eq!(copy.created_by(), owner);
    assert_eq!(copy.status(), TaskStatus::NotStarted);
    assert_eq!(copy.completed_units(), 0);
    assert_eq!(copy.completed_at(), None);
    assert_eq!(copy.actual_minutes(), None);
    assert!(copy.is_shared());
    assert_eq!(copy.due_date(), template.due_date());
}

#[rstest]
#[case(0, 1)]
#[case(2, 1)]
#[case(3, 2)]
#[case(7, 3)]
fn review_offsets_bucket_three_units_per_day(#[case] index: usize, #[case] expected: u64) {
    let daily = NonZeroU32::new(3).expect("non-zero");
    assert_eq!(review_due_offset(index, daily), expected);
}

#[rstest]
fn review_task_covers_single_unit_of_parent(clock: FixedClock, owner: UserId) {
    let parent = task(TaskKind::Parent, 30, date(2024, 5, 8), owner);
    let target = ReviewTarget {
        unit: 17,
        due_date: date(2024, 5, 2),
        assignee: owner,
        test_period_id: None,
    };

    let review = build_review_task(&parent, target, &clock).expect("review task");

    assert_eq!(review.title(), "Algebra workbook review: page 17");
    assert_eq!(review.parent_id(), Some(parent.id()));
    assert_eq!(review.cycle_number(), CycleNumber::REVIEW);
    assert_eq!(review.learning_stage(), LearningStage::Review);
    assert_eq!(review.total_units(), 1);
    assert_eq!(review.unit_range(), Some(UnitRange::single(17)));
    assert_eq!(review.estimated_minutes(), Some(2));
}

#[rstest]
fn review_task_requires_parent(clock: FixedClock, owner: UserId) {
    let single = task(TaskKind::Single, 3, date(2024, 5, 8), owner);
    let target = ReviewTarget {
        unit: 1,
        due_date: date(2024, 5, 2),
        assignee: owner,
        test_period_id: None,
    };

    assert_eq!(
        build_review_task(&single, target, &clock),
        Err(TaskDomainError::NotAParent(single.id()))
    );
}

#[rstest]
fn review_queue_groups_by_daily_capacity(owner: UserId) {
    let parent = task(TaskKind::Parent, 10, date(2024, 5, 20), owner);
    let child = TaskKind::Subtask {
        parent_id: parent.id(),
    };
    let queue: Vec<Task> = [9, 3, 5, 3, 1]
        .into_iter()
        .map(|day| task(child, 1, date(2024, 5, day), owner))
        .collect();
    let daily = NonZeroU32::new(2).expect("non-zero");

    let schedule = schedule_review_queue(&queue, daily, date(2024, 5, 1)).expect("schedule");

    let due: Vec<_> = schedule.iter().map(|entry| entry.due_date).collect();
    assert_eq!(
        due,
        vec![
            date(2024, 5, 2),
            date(2024, 5, 2),
            date(2024, 5, 3),
            date(2024, 5, 3),
            date(2024, 5, 4),
        ]
    );
    let first = schedule.first().expect("non-empty schedule");
    let earliest = queue.get(4).expect("fifth task");
    assert_eq!(first.task_id, earliest.id());
    let last = schedule.last().expect("non-empty schedule");
    let latest = queue.first().expect("first task");
    assert_eq!(last.task_id, latest.id());
    assert_eq!(last.group_index, 2);
}

#[rstest]
fn review_queue_keeps_unit_order_within_a_day(clock: FixedClock, owner: UserId) {
    let parent = task(TaskKind::Parent, 10, date(2024, 5, 20), owner);
    let queue: Vec<Task> = [8, 3, 5]
        .into_iter()
        .map(|unit| {
            let target = ReviewTarget {
                unit,
                due_date: date(2024, 5, 2),
                assignee: owner,
                test_period_id: None,
            };
            build_review_task(&parent, target, &clock).expect("review task")
        })
        .collect();
    let daily = NonZeroU32::new(3).expect("non-zero");

    let schedule = schedule_review_queue(&queue, daily, date(2024, 5, 1)).expect("schedule");

    let units: Vec<u32> = schedule
        .iter()
        .filter_map(|entry| queue.iter().find(|review| review.id() == entry.task_id))
        .filter_map(|review| review.unit_range().map(UnitRange::start))
        .collect();
    assert_eq!(units, vec![3, 5, 8]);
}

#[rstest]
fn finalization_task_follows_parent_due_date(clock: FixedClock, owner: UserId) {
    let parent = task(TaskKind::Parent, 30, date(2024, 5, 8), owner);
    let rules = FinalizationRules {
        offset_days: 2,
        time_percent: 50,
    };

    let check = build_finalization_task(&parent, rules, &clock).expect("finalization task");

    assert!(check.is_finalization());
    assert_eq!(check.title(), "Algebra workbook mastery check");
    assert_eq!(check.due_date(), date(2024, 5, 10));
    assert_eq!(check.estimated_minutes(), Some(30));
    assert_eq!(check.total_units(), 30);
    assert_eq!(check.parent_id(), Some(parent.id()));
}

#[rstest]
fn workload_progress_prefers_open_work() {
    let existing = crate::task::domain::TaskId::new();

    assert_eq!(
        WorkloadProgress::assess(2, Some(existing)),
        WorkloadProgress::Incomplete { open_subtasks: 2 }
    );
    assert!(WorkloadProgress::assess(0, None).needs_finalization());
    assert_eq!(
        WorkloadProgress::assess(0, Some(existing)),
        WorkloadProgress::Finalized {
            finalization_id: existing
        }
    );
}

#[rstest]
fn task_filter_combines_criteria(owner: UserId) {
    let parent = task(TaskKind::Parent, 10, date(2024, 5, 20), owner);
    let child = task(
        TaskKind::Subtask {
            parent_id: parent.id(),
        },
        1,
        date(2024, 5, 2),
        owner,
    );

    let open_children = TaskFilter::new()
        .with_parent(parent.id())
        .with_statuses(TaskStatus::OPEN);
    let reviews = TaskFilter::new()
        .with_assignee(owner)
        .with_cycle(CycleNumber::REVIEW);

    assert!(open_children.matches(&child));
    assert!(!open_children.matches(&parent));
    assert!(!reviews.matches(&child));
    assert!(TaskFilter::new().with_test_period(None).matches(&child));
}
