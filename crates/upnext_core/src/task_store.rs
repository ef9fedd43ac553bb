//! Canonical ordered task collection and everything that mutates it.
//!
//! # Invariants
//! - Task ids are unique for the lifetime of the store.
//! - Every successful mutation is written through before it returns.
//! - Unknown ids and out-of-range indices leave state untouched.
//!
//! Callers re-query views (`day_view`, counts) after a mutation; outcome
//! values carry the signals a presentation layer reacts to.

use crate::achievements;
use crate::error::AppError;
use crate::model::{Achievement, Priority, Task};
use crate::storage::{KeyValueStore, Persistence};
use crate::streak::Streak;
use crate::tags;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub task: Task,
    /// True on a not-done to done transition.
    pub completed: bool,
    pub streak: Streak,
    pub newly_earned: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub task: Task,
    pub newly_earned: Vec<Achievement>,
}

pub struct TaskStore<S> {
    tasks: Vec<Task>,
    streak: Streak,
    earned: Vec<String>,
    persistence: Persistence<S>,
    persist_error: Option<AppError>,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn open(backend: S) -> Self {
        let persistence = Persistence::new(backend);
        let state = persistence.load();
        log::debug!(
            "event=store_opened module=task_store tasks={} streak={} achievements={}",
            state.tasks.len(),
            state.streak.value(),
            state.achievements.len()
        );

        let mut store = Self {
            tasks: state.tasks,
            streak: state.streak,
            earned: state.achievements,
            persistence,
            persist_error: None,
        };
        // Stored state may already qualify, e.g. after the key was lost.
        store.refresh_achievements();
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn streak(&self) -> Streak {
        self.streak
    }

    pub fn earned_achievements(&self) -> &[String] {
        &self.earned
    }

    /// Last write-through failure since the previous call, if any.
    pub fn take_persist_error(&mut self) -> Option<AppError> {
        self.persist_error.take()
    }

    /// Parses `#tags` out of `raw_input` and appends a task for `day`.
    /// Returns `None` without touching state when no text remains.
    pub fn add_task(&mut self, raw_input: &str, day: Date) -> Option<AddOutcome> {
        let parsed = tags::parse_input(raw_input);
        if parsed.text.is_empty() {
            log::debug!("event=add_ignored module=task_store reason=empty_text");
            return None;
        }

        let task = Task {
            id: self.next_id(),
            text: parsed.text,
            done: false,
            date: day,
            priority: Priority::Medium,
            tags: parsed.tags,
        };
        self.tasks.push(task.clone());
        log::info!(
            "event=task_added module=task_store id={} tags={}",
            task.id,
            task.tags.len()
        );

        let newly_earned = self.refresh_achievements();
        self.persist_tasks();

        Some(AddOutcome { task, newly_earned })
    }

    pub fn toggle_task(&mut self, id: &str) -> Option<ToggleOutcome> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.done = !task.done;
        let completed = task.done;
        let task = task.clone();

        if completed {
            self.streak.increment();
        } else {
            self.streak.decrement();
        }
        log::info!(
            "event=task_toggled module=task_store id={} done={} streak={}",
            task.id,
            completed,
            self.streak.value()
        );

        let newly_earned = self.refresh_achievements();
        self.persist_tasks_and_streak();

        Some(ToggleOutcome {
            task,
            completed,
            streak: self.streak,
            newly_earned,
        })
    }

    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(index);
        log::info!("event=task_deleted module=task_store id={}", removed.id);

        self.persist_tasks();
        Some(removed)
    }

    /// Moves the task at `from` so that it ends up at `to`, both positions in
    /// the full collection. `to` indexes the sequence after removal.
    pub fn reorder_task(&mut self, from: usize, to: usize) -> bool {
        let len = self.tasks.len();
        if from >= len || to >= len {
            log::debug!(
                "event=reorder_rejected module=task_store from={} to={} len={}",
                from,
                to,
                len
            );
            return false;
        }

        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        log::info!(
            "event=task_reordered module=task_store from={} to={}",
            from,
            to
        );

        self.persist_tasks();
        true
    }

    /// Reorders using positions inside the day-view of `day`. Tasks of other
    /// days keep their relative order.
    pub fn reorder_day_view(&mut self, day: Date, from: usize, to: usize) -> bool {
        let positions: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.date == day)
            .map(|(index, _)| index)
            .collect();

        match (positions.get(from), positions.get(to)) {
            (Some(&global_from), Some(&global_to)) => self.reorder_task(global_from, global_to),
            _ => {
                log::debug!(
                    "event=reorder_rejected module=task_store scope=day from={} to={} len={}",
                    from,
                    to,
                    positions.len()
                );
                false
            }
        }
    }

    pub fn filter_by_date(&self, day: Date) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |task| task.date == day)
    }

    pub fn day_view(&self, day: Date) -> Vec<&Task> {
        self.filter_by_date(day).collect()
    }

    pub fn count_remaining(&self, day: Date) -> usize {
        self.filter_by_date(day).filter(|task| !task.done).count()
    }

    pub fn count_completed(&self, day: Date) -> usize {
        self.filter_by_date(day).filter(|task| task.done).count()
    }

    fn next_id(&self) -> String {
        let mut candidate = millis_since_epoch(OffsetDateTime::now_utc().unix_timestamp_nanos());
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn refresh_achievements(&mut self) -> Vec<Achievement> {
        let newly_earned = achievements::award(&mut self.earned, &self.tasks, self.streak);
        if !newly_earned.is_empty() {
            for achievement in &newly_earned {
                log::info!(
                    "event=achievement_earned module=task_store id={}",
                    achievement.id
                );
            }
            let result = self.persistence.save_achievements(&self.earned);
            self.record(result);
        }
        newly_earned
    }

    fn persist_tasks(&mut self) {
        let result = self.persistence.save_tasks(&self.tasks);
        self.record(result);
    }

    fn persist_tasks_and_streak(&mut self) {
        let result = self.persistence.save(&self.tasks, self.streak);
        self.record(result);
    }

    fn record(&mut self, result: Result<(), AppError>) {
        if let Err(err) = result {
            log::error!(
                "event=persist_failed module=task_store code={} reason={}",
                err.code(),
                err.message()
            );
            self.persist_error = Some(err);
        }
    }
}

/// Clocks set before 1970 yield 0; `next_id` bumps from there.
fn millis_since_epoch(unix_nanos: i128) -> u128 {
    u128::try_from(unix_nanos / 1_000_000).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{TaskStore, millis_since_epoch};
    use crate::error::AppError;
    use crate::model::Priority;
    use crate::storage::{KeyValueStore, MemoryKeyValueStore, Persistence};
    use time::Date;
    use time::macros::date;

    const DAY: Date = date!(2024 - 01 - 05);
    const OTHER_DAY: Date = date!(2024 - 01 - 06);

    fn store() -> TaskStore<MemoryKeyValueStore> {
        TaskStore::open(MemoryKeyValueStore::new())
    }

    fn texts<S: KeyValueStore>(store: &TaskStore<S>) -> Vec<&str> {
        store.tasks().iter().map(|task| task.text.as_str()).collect()
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), AppError> {
            Err(AppError::io("read-only"))
        }
    }

    #[test]
    fn add_task_parses_tags_and_defaults() {
        let mut store = store();
        let added = store.add_task("Buy milk #errands #home", DAY).unwrap();

        assert_eq!(added.task.text, "Buy milk");
        assert_eq!(added.task.tags, vec!["errands", "home"]);
        assert_eq!(added.task.date, DAY);
        assert!(!added.task.done);
        assert_eq!(added.task.priority, Priority::Medium);
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn add_task_ignores_blank_input() {
        let backend = MemoryKeyValueStore::new();
        let mut store = TaskStore::open(backend.clone());

        assert!(store.add_task("   ", DAY).is_none());
        assert!(store.add_task("#only #tags", DAY).is_none());
        assert!(store.tasks().is_empty());
        assert_eq!(backend.raw("tasks"), None);
    }

    #[test]
    fn add_task_appends_with_unique_ids() {
        let mut store = store();
        for i in 0..20 {
            store.add_task(&format!("task {i}"), DAY).unwrap();
        }

        let mut ids: Vec<&str> = store.tasks().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(store.tasks()[19].text, "task 19");
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn id_clock_clamps_before_epoch() {
        assert_eq!(millis_since_epoch(1_704_412_800_000_123_456), 1_704_412_800_000);
        assert_eq!(millis_since_epoch(-5_000_000_000), 0);
    }

    #[test]
    fn toggle_moves_streak_both_ways() {
        let mut store = store();
        let id = store.add_task("Run", DAY).unwrap().task.id;

        let done = store.toggle_task(&id).unwrap();
        assert!(done.completed);
        assert!(done.task.done);
        assert_eq!(done.streak.value(), 1);

        let undone = store.toggle_task(&id).unwrap();
        assert!(!undone.completed);
        assert_eq!(undone.streak.value(), 0);
        assert_eq!(store.streak().value(), 0);
    }

    #[test]
    fn toggle_back_at_zero_streak_stays_zero() {
        let backend = MemoryKeyValueStore::new();
        backend.insert_raw(
            "tasks",
            r#"[{"id":"1","text":"done already","done":true,"date":"2024-01-05","priority":"medium","tags":[]}]"#,
        );
        let mut store = TaskStore::open(backend);

        let outcome = store.toggle_task("1").unwrap();
        assert!(!outcome.task.done);
        assert_eq!(outcome.streak.value(), 0);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut store = store();
        store.add_task("Run", DAY).unwrap();

        assert!(store.toggle_task("missing").is_none());
        assert_eq!(store.streak().value(), 0);
        assert!(!store.tasks()[0].done);
    }

    #[test]
    fn delete_removes_once() {
        let mut store = store();
        let id = store.add_task("A", DAY).unwrap().task.id;
        store.add_task("B", DAY).unwrap();

        let removed = store.delete_task(&id).unwrap();
        assert_eq!(removed.text, "A");
        assert_eq!(store.tasks().len(), 1);

        assert!(store.delete_task(&id).is_none());
        assert!(store.toggle_task(&id).is_none());
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn reorder_splices_out_then_in() {
        let mut store = store();
        for text in ["A", "B", "C", "D"] {
            store.add_task(text, DAY).unwrap();
        }

        assert!(store.reorder_task(0, 2));
        assert_eq!(texts(&store), vec!["B", "C", "A", "D"]);

        assert!(store.reorder_task(3, 0));
        assert_eq!(texts(&store), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn reorder_out_of_range_is_noop() {
        let mut store = store();
        for text in ["A", "B"] {
            store.add_task(text, DAY).unwrap();
        }

        assert!(!store.reorder_task(2, 0));
        assert!(!store.reorder_task(0, 2));
        assert_eq!(texts(&store), vec!["A", "B"]);
        assert!(!TaskStore::open(MemoryKeyValueStore::new()).reorder_task(0, 0));
    }

    #[test]
    fn reorder_day_view_keeps_other_days_in_place() {
        let mut store = store();
        store.add_task("A", DAY).unwrap();
        store.add_task("x", OTHER_DAY).unwrap();
        store.add_task("B", DAY).unwrap();
        store.add_task("y", OTHER_DAY).unwrap();
        store.add_task("C", DAY).unwrap();

        assert!(store.reorder_day_view(DAY, 0, 2));
        let day: Vec<&str> = store.day_view(DAY).iter().map(|t| t.text.as_str()).collect();
        let other: Vec<&str> = store
            .day_view(OTHER_DAY)
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(day, vec!["B", "C", "A"]);
        assert_eq!(other, vec!["x", "y"]);

        assert!(store.reorder_day_view(DAY, 2, 0));
        let day: Vec<&str> = store.day_view(DAY).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(day, vec!["A", "B", "C"]);

        assert!(!store.reorder_day_view(DAY, 0, 3));
    }

    #[test]
    fn filter_by_date_preserves_order_and_is_repeatable() {
        let mut store = store();
        store.add_task("A", DAY).unwrap();
        store.add_task("x", OTHER_DAY).unwrap();
        store.add_task("B", DAY).unwrap();

        let first: Vec<String> = store.filter_by_date(DAY).map(|t| t.text.clone()).collect();
        let second: Vec<String> = store.filter_by_date(DAY).map(|t| t.text.clone()).collect();
        assert_eq!(first, vec!["A", "B"]);
        assert_eq!(first, second);
        assert_eq!(store.tasks().len(), 3);
        assert!(store.day_view(date!(2030 - 01 - 01)).is_empty());
    }

    #[test]
    fn counts_follow_the_day_view() {
        let mut store = store();
        let id = store.add_task("A", DAY).unwrap().task.id;
        store.add_task("B", DAY).unwrap();
        let other = store.add_task("x", OTHER_DAY).unwrap().task.id;
        store.toggle_task(&id).unwrap();
        store.toggle_task(&other).unwrap();

        assert_eq!(store.count_remaining(DAY), 1);
        assert_eq!(store.count_completed(DAY), 1);
        assert_eq!(store.count_completed(OTHER_DAY), 1);
        assert_eq!(store.count_remaining(OTHER_DAY), 0);
    }

    #[test]
    fn mutations_write_through() {
        let backend = MemoryKeyValueStore::new();
        let mut store = TaskStore::open(backend.clone());
        let id = store.add_task("Read #books", DAY).unwrap().task.id;
        store.add_task("Write", DAY).unwrap();
        store.toggle_task(&id).unwrap();
        store.reorder_task(0, 1);

        let reloaded = Persistence::new(backend.clone()).load();
        assert_eq!(reloaded.tasks, store.tasks());
        assert_eq!(reloaded.streak.value(), 1);

        let reopened = TaskStore::open(backend);
        assert_eq!(reopened.tasks(), store.tasks());
        assert_eq!(reopened.streak(), store.streak());
        assert_eq!(reopened.earned_achievements(), store.earned_achievements());
    }

    #[test]
    fn achievements_are_reported_once() {
        let mut store = store();
        let first = store.add_task("one", DAY).unwrap();
        assert_eq!(first.newly_earned.len(), 1);
        assert_eq!(first.newly_earned[0].id, "first_task");

        let second = store.add_task("two", DAY).unwrap();
        assert!(second.newly_earned.is_empty());

        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(store.add_task(&format!("more {i}"), DAY).unwrap().task.id);
        }
        ids.push(first.task.id.clone());

        let mut earned_on_toggle = Vec::new();
        for id in &ids {
            let outcome = store.toggle_task(id).unwrap();
            earned_on_toggle.extend(outcome.newly_earned.into_iter().map(|a| a.id));
        }
        assert_eq!(earned_on_toggle, vec!["five_tasks", "streak_5"]);
        assert_eq!(
            store.earned_achievements(),
            &["first_task", "five_tasks", "streak_5"]
        );
    }

    #[test]
    fn open_awards_achievements_already_earned_by_stored_state() {
        let backend = MemoryKeyValueStore::new();
        backend.insert_raw(
            "tasks",
            r#"[{"id":"1","text":"done already","done":true,"date":"2024-01-05","priority":"medium","tags":[]}]"#,
        );
        backend.insert_raw("streak", "7");

        let store = TaskStore::open(backend.clone());
        assert_eq!(store.earned_achievements(), &["first_task", "streak_5"]);
        assert_eq!(
            backend.raw("achievements").as_deref(),
            Some(r#"["first_task","streak_5"]"#)
        );

        let mut reopened = TaskStore::open(backend);
        let added = reopened.add_task("next", DAY).unwrap();
        assert!(added.newly_earned.is_empty());
    }

    #[test]
    fn open_on_empty_backend_writes_nothing() {
        let backend = MemoryKeyValueStore::new();
        let store = TaskStore::open(backend.clone());

        assert!(store.earned_achievements().is_empty());
        assert_eq!(backend.raw("achievements"), None);
    }

    #[test]
    fn write_failure_keeps_state_and_is_reported() {
        let mut store = TaskStore::open(FailingStore);
        let added = store.add_task("A", DAY).unwrap();

        assert_eq!(store.tasks().len(), 1);
        let err = store.take_persist_error().unwrap();
        assert_eq!(err.code(), "io_error");
        assert!(store.take_persist_error().is_none());

        store.toggle_task(&added.task.id).unwrap();
        assert_eq!(store.streak().value(), 1);
        assert!(store.take_persist_error().is_some());
    }
}
