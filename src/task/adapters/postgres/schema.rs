//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning project identifier.
        project_id -> Int8,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Optional assignee identifier.
        assignee_id -> Nullable<Int8>,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Progress percentage.
        progress -> Nullable<Float8>,
        /// Due date.
        due_date -> Nullable<Timestamptz>,
        /// Start date.
        start_date -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Estimated effort in hours.
        estimated_hours -> Nullable<Int4>,
        /// Actual effort in hours.
        actual_hours -> Nullable<Int4>,
        /// Tag string.
        #[max_length = 500]
        tags -> Nullable<Varchar>,
        /// Manual ordering index.
        order_index -> Int4,
        /// Blocked flag.
        is_blocked -> Bool,
        /// Reason for being blocked.
        blocked_reason -> Nullable<Text>,
        /// Parent task identifier.
        parent_task_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Creating user.
        created_by -> Int8,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// User behind the last update.
        updated_by -> Int8,
        /// Soft-deletion timestamp.
        deleted_at -> Nullable<Timestamptz>,
        /// User who soft-deleted the task.
        deleted_by -> Nullable<Int8>,
        /// Row version for optimistic concurrency.
        version -> Int8,
    }
}

diesel::table! {
    /// Append-only task field history.
    task_history (id) {
        /// History record identifier.
        id -> Uuid,
        /// Task the record belongs to.
        task_id -> Uuid,
        /// Changed field name.
        #[max_length = 50]
        field_name -> Varchar,
        /// Value before the change.
        old_value -> Nullable<Text>,
        /// Value after the change.
        new_value -> Nullable<Text>,
        /// User that made the change.
        changed_by -> Int8,
        /// When the change was made.
        changed_at -> Timestamptz,
        /// Insertion sequence; orders records sharing a timestamp.
        seq -> Int8,
    }
}

diesel::joinable!(task_history -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_history);
