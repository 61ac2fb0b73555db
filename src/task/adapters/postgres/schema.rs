//! Diesel schema for ordered task list persistence.

diesel::table! {
    /// Task lists with their owner and sequence version.
    task_lists (id) {
        /// List identifier.
        id -> Uuid,
        /// Owning user identifier.
        owner_id -> Uuid,
        /// List name.
        #[max_length = 255]
        name -> Varchar,
        /// Optimistic-concurrency counter of the task sequence.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records; `position` is unique per list.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning list identifier.
        list_id -> Uuid,
        /// Task name.
        #[max_length = 500]
        name -> Varchar,
        /// Completion flag.
        completed -> Bool,
        /// Optional due timestamp.
        due_at -> Nullable<Timestamptz>,
        /// Position within the owning list.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> task_lists (list_id));
diesel::allow_tables_to_appear_in_same_query!(task_lists, tasks);
