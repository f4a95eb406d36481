//! Diesel schema for learning-cycle persistence.

diesel::table! {
    /// Task records forming workload trees.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        title -> Text,
        /// Optional description.
        description -> Nullable<Text>,
        /// Tree position tag (`single`, `parent`, `subtask`).
        #[max_length = 20]
        task_type -> Varchar,
        /// Parent reference, set only on subtasks.
        parent_task_id -> Nullable<Uuid>,
        /// Learning cycle number.
        cycle_number -> Int2,
        /// Learning stage label.
        #[max_length = 20]
        learning_stage -> Varchar,
        /// Workload unit type.
        #[max_length = 20]
        unit_type -> Varchar,
        /// Workload size.
        total_units -> Int4,
        /// Completed units.
        completed_units -> Int4,
        /// First numbered unit, if numbered.
        unit_range_start -> Nullable<Int4>,
        /// Last numbered unit, if numbered.
        unit_range_end -> Nullable<Int4>,
        /// Effort estimate in minutes.
        estimated_minutes -> Nullable<Int4>,
        /// Reported effort in minutes.
        actual_minutes -> Nullable<Int4>,
        /// Planned start date.
        start_date -> Nullable<Date>,
        /// Due date.
        due_date -> Date,
        /// Progress status.
        #[max_length = 20]
        status -> Varchar,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Assignee.
        assigned_to -> Uuid,
        /// Creator.
        created_by -> Uuid,
        /// Test period.
        test_period_id -> Nullable<Uuid>,
        /// Distribution marker.
        is_shared -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Mistaken units recorded against tasks.
    task_mistakes (id) {
        /// Mistake identifier.
        id -> Uuid,
        /// Task the mistake belongs to.
        task_id -> Uuid,
        /// Mistaken unit number.
        unit -> Int4,
        /// Cycle during which the mistake was made.
        cycle_number -> Int2,
        /// Recording timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Edges from workload parents to generated review tasks.
    task_relationships (id) {
        /// Edge identifier.
        id -> Uuid,
        /// Workload parent.
        parent_task_id -> Uuid,
        /// Generated child task.
        child_task_id -> Uuid,
        /// Cycle of the child task.
        cycle_number -> Int2,
        /// Original unit covered by the child.
        unit -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Grade membership mirrored from the host application.
    grade_students (grade_id, student_id) {
        /// Grade identifier.
        grade_id -> Uuid,
        /// Learner identifier.
        student_id -> Uuid,
        /// Name shown to coordinators.
        #[max_length = 255]
        display_name -> Varchar,
        /// Enrollment timestamp.
        enrolled_at -> Timestamptz,
    }
}
