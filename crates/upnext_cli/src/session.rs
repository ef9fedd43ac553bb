use crate::render::DayListing;
use time::Date;
use upnext_core::config::{Config, ConfigOverrides, merge_overrides};
use upnext_core::date_cursor::parse_day;
use upnext_core::preferences::resolve_theme;
use upnext_core::pomodoro::DEFAULT_DURATION_SECS;
use upnext_core::{AppError, DateCursor, KeyValueStore, Preferences, TaskStore, Theme};

/// Everything one run of the front end owns: stores, the viewed day and
/// the configuration loaded at startup.
pub struct Session<S> {
    pub store: TaskStore<S>,
    pub preferences: Preferences<S>,
    pub cursor: DateCursor,
    config: Config,
}

impl<S: KeyValueStore + Clone> Session<S> {
    pub fn open(backend: S, config: Config) -> Self {
        Self::open_at(backend, config, DateCursor::today())
    }

    pub fn open_at(backend: S, config: Config, cursor: DateCursor) -> Self {
        Self {
            store: TaskStore::open(backend.clone()),
            preferences: Preferences::open(backend),
            cursor,
            config,
        }
    }
}

impl<S: KeyValueStore> Session<S> {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn effective_config(&self, overrides: &ConfigOverrides) -> Config {
        merge_overrides(&self.config, overrides)
    }

    pub fn viewed_day(&self) -> Date {
        self.cursor.current()
    }

    /// Moves the cursor for `--date` / `--offset`. `--offset` counts from
    /// today, not from the current cursor.
    pub fn apply_day_flags(
        &mut self,
        date: Option<&str>,
        offset: Option<i64>,
    ) -> Result<(), AppError> {
        match (date, offset) {
            (Some(_), Some(_)) => Err(AppError::invalid_input(
                "use either --date or --offset, not both",
            )),
            (Some(raw), None) => {
                let day = parse_day(raw)?;
                let delta = (day - self.cursor.current()).whole_days();
                self.cursor.shift(delta);
                if self.cursor.current() != day {
                    return Err(AppError::invalid_input("date is out of range"));
                }
                Ok(())
            }
            (None, Some(days)) => {
                self.cursor.reset_to_today();
                self.cursor.shift(days);
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    /// A theme passed as an override wins for this command only; otherwise
    /// the persisted choice, then the config file, then the default.
    pub fn theme(&self, overrides: &ConfigOverrides) -> Theme {
        overrides
            .theme
            .as_deref()
            .and_then(resolve_theme)
            .unwrap_or_else(|| self.preferences.theme_or(self.config.theme.as_deref()))
    }

    pub fn listing(&self) -> DayListing<'_> {
        let day = self.viewed_day();
        let entries = self
            .store
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, task)| task.date == day)
            .collect();
        DayListing {
            day,
            entries,
            remaining: self.store.count_remaining(day),
            completed: self.store.count_completed(day),
        }
    }

    /// Surfaces a write-through failure from the last mutation.
    pub fn check_persisted(&mut self) -> Result<(), AppError> {
        match self.store.take_persist_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn pomodoro_secs(config: &Config, minutes: Option<u32>, seconds: Option<u32>) -> u32 {
    if let Some(seconds) = seconds {
        return seconds;
    }
    minutes
        .or(config.pomodoro_minutes)
        .map(|minutes| minutes.saturating_mul(60))
        .unwrap_or(DEFAULT_DURATION_SECS)
}
