pub mod achievements;
pub mod config;
pub mod date_cursor;
pub mod error;
pub mod model;
pub mod notify;
pub mod pomodoro;
pub mod preferences;
pub mod storage;
pub mod streak;
pub mod tags;
pub mod task_store;

pub use date_cursor::DateCursor;
pub use error::AppError;
pub use model::{Achievement, Priority, Task, Theme};
pub use pomodoro::{PomodoroTimer, Tick};
pub use preferences::Preferences;
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use streak::Streak;
pub use task_store::{AddOutcome, TaskStore, ToggleOutcome};

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Priority, Task};
    use time::macros::date;

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: "1704412800000".to_string(),
            text: "demo".to_string(),
            done: false,
            date: date!(2024 - 01 - 05),
            priority: Priority::default(),
            tags: Vec::new(),
        };

        assert_eq!(task.id, "1704412800000");
        assert_eq!(task.text, "demo");
        assert!(!task.done);
        assert_eq!(task.date, date!(2024 - 01 - 05));
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty());
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("missing text");
        assert_eq!(err.code(), "invalid_input");
    }
}
