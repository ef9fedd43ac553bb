use crate::config::canonical_theme_name;
use crate::error::AppError;
use crate::model::Theme;
use crate::model::theme::{DARK, LIGHT};
use crate::storage::{KeyValueStore, Persistence};

/// Active theme, persisted under its own key.
pub struct Preferences<S> {
    theme: Option<Theme>,
    persistence: Persistence<S>,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn open(backend: S) -> Self {
        let persistence = Persistence::new(backend);
        let theme = persistence.load_theme();
        Self { theme, persistence }
    }

    /// The persisted choice, if the user ever made one.
    pub fn stored_theme(&self) -> Option<Theme> {
        self.theme
    }

    /// Persisted choice, else `fallback` (usually from config), else the
    /// default theme.
    pub fn theme_or(&self, fallback: Option<&str>) -> Theme {
        self.theme
            .or_else(|| fallback.and_then(resolve_theme))
            .unwrap_or_default()
    }

    pub fn theme(&self) -> Theme {
        self.theme_or(None)
    }

    pub fn set_theme(&mut self, name: &str) -> Result<Theme, AppError> {
        let theme = resolve_theme(name)
            .ok_or_else(|| AppError::invalid_input(format!("unknown theme '{}'", name.trim())))?;
        self.apply(theme)
    }

    /// Light switches to Dark; every other theme switches to Light.
    pub fn toggle_theme(&mut self) -> Result<Theme, AppError> {
        let next = if self.theme().is_light() { DARK } else { LIGHT };
        let theme = Theme::find(next).unwrap_or_default();
        self.apply(theme)
    }

    fn apply(&mut self, theme: Theme) -> Result<Theme, AppError> {
        self.theme = Some(theme);
        log::info!("event=theme_changed module=preferences name={}", theme.name);
        self.persistence.save_theme(&theme)?;
        Ok(theme)
    }
}

/// Resolves a user-supplied theme name, including aliases such as
/// `dark-mode` or `vanilla`.
pub fn resolve_theme(name: &str) -> Option<Theme> {
    Theme::find(name).or_else(|| canonical_theme_name(name).and_then(|n| Theme::find(&n)))
}
