//! Write-through adapter between domain values and the key-value backend.
//!
//! Every key is read independently. An absent key yields its default, and so
//! does a key whose content cannot be decoded; the latter is logged and never
//! reaches the caller as an error.

use crate::error::AppError;
use crate::model::{Achievement, Task, Theme};
use crate::storage::KeyValueStore;
use crate::streak::Streak;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const TASKS_KEY: &str = "tasks";
pub const STREAK_KEY: &str = "streak";
pub const THEME_KEY: &str = "theme";
pub const ACHIEVEMENTS_KEY: &str = "achievements";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub tasks: Vec<Task>,
    pub streak: Streak,
    pub theme: Option<Theme>,
    pub achievements: Vec<String>,
}

/// Extra fields are ignored so theme objects written by other front ends
/// still load by name.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTheme {
    name: String,
}

#[derive(Debug, Clone)]
pub struct Persistence<S> {
    backend: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn load(&self) -> PersistedState {
        PersistedState {
            tasks: self.load_tasks(),
            streak: self.load_streak(),
            theme: self.load_theme(),
            achievements: self.load_achievements(),
        }
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        let tasks: Vec<Task> = self.decode(TASKS_KEY).unwrap_or_default();
        let mut seen = HashSet::new();
        let total = tasks.len();
        let unique: Vec<Task> = tasks
            .into_iter()
            .filter(|task| seen.insert(task.id.clone()))
            .collect();
        if unique.len() != total {
            log::warn!(
                "event=duplicate_ids_dropped module=persistence dropped={}",
                total - unique.len()
            );
        }
        unique
    }

    pub fn load_streak(&self) -> Streak {
        let Some(raw) = self.read(STREAK_KEY) else {
            return Streak::default();
        };
        match raw.trim().parse::<u64>() {
            Ok(value) => Streak::new(value),
            Err(err) => {
                log::warn!(
                    "event=malformed_value module=persistence key={} reason={}",
                    STREAK_KEY,
                    err
                );
                Streak::default()
            }
        }
    }

    pub fn load_theme(&self) -> Option<Theme> {
        let stored: StoredTheme = self.decode(THEME_KEY)?;
        let theme = Theme::find(&stored.name);
        if theme.is_none() {
            log::warn!(
                "event=unknown_theme module=persistence name={}",
                stored.name
            );
        }
        theme
    }

    pub fn load_achievements(&self) -> Vec<String> {
        let ids: Vec<String> = self.decode(ACHIEVEMENTS_KEY).unwrap_or_default();
        let mut earned: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if Achievement::find(&id).is_some() && !earned.contains(&id) {
                earned.push(id);
            }
        }
        earned
    }

    /// Writes tasks first, then the streak. The pair is not atomic.
    pub fn save(&mut self, tasks: &[Task], streak: Streak) -> Result<(), AppError> {
        self.save_tasks(tasks)?;
        self.save_streak(streak)
    }

    pub fn save_tasks(&mut self, tasks: &[Task]) -> Result<(), AppError> {
        let content = serde_json::to_string(tasks)?;
        self.backend.set(TASKS_KEY, &content)
    }

    pub fn save_streak(&mut self, streak: Streak) -> Result<(), AppError> {
        self.backend.set(STREAK_KEY, &streak.value().to_string())
    }

    pub fn save_theme(&mut self, theme: &Theme) -> Result<(), AppError> {
        let content = serde_json::to_string(&StoredTheme {
            name: theme.name.to_string(),
        })?;
        self.backend.set(THEME_KEY, &content)
    }

    pub fn save_achievements(&mut self, earned: &[String]) -> Result<(), AppError> {
        let content = serde_json::to_string(earned)?;
        self.backend.set(ACHIEVEMENTS_KEY, &content)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!(
                    "event=read_failed module=persistence key={} code={} reason={}",
                    key,
                    err.code(),
                    err.message()
                );
                None
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!(
                    "event=malformed_value module=persistence key={} reason={}",
                    key,
                    err
                );
                None
            }
        }
    }
}
