/// A named colour theme. Terminal front ends render it through [`Palette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    accent: u8,
    muted: u8,
}

pub const LIGHT: &str = "Light";
pub const DARK: &str = "Dark";
pub const DEFAULT_THEME: &str = DARK;

const CATALOG: [Theme; 20] = [
    Theme::new(LIGHT, 27, 240),
    Theme::new(DARK, 33, 250),
    Theme::new("Sunset", 208, 223),
    Theme::new("Forest", 28, 151),
    Theme::new("Ocean", 33, 153),
    Theme::new("Lavender", 135, 183),
    Theme::new("Midnight", 62, 189),
    Theme::new("Cherry", 160, 217),
    Theme::new("Teal", 30, 152),
    Theme::new("Amber", 214, 230),
    Theme::new("Rose", 205, 218),
    Theme::new("Slate", 67, 250),
    Theme::new("Cyan", 44, 159),
    Theme::new("Lime", 112, 193),
    Theme::new("Emerald", 35, 157),
    Theme::new("Indigo", 61, 189),
    Theme::new("Gray", 244, 252),
    Theme::new("Yellow", 220, 229),
    Theme::new("Bronze", 166, 223),
    Theme::new("Gold", 178, 229),
];

impl Theme {
    const fn new(name: &'static str, accent: u8, muted: u8) -> Self {
        Self {
            name,
            accent,
            muted,
        }
    }

    pub fn all() -> &'static [Theme] {
        &CATALOG
    }

    /// Case-insensitive lookup by name. Aliases such as `dark-mode` are
    /// resolved by [`crate::config::canonical_theme_name`] first.
    pub fn find(name: &str) -> Option<Theme> {
        let wanted = name.trim();
        CATALOG
            .iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(wanted))
            .copied()
    }

    pub fn default_theme() -> Theme {
        CATALOG[1]
    }

    pub fn is_light(&self) -> bool {
        self.name == LIGHT
    }

    pub fn palette(&self) -> Palette {
        Palette {
            accent: format!("\x1b[38;5;{}m", self.accent),
            muted: format!("\x1b[38;5;{}m", self.muted),
            reset: "\x1b[0m".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Palette {
    pub accent: String,
    pub muted: String,
    pub reset: String,
}

impl Palette {
    /// Palette that leaves text untouched, used when colour is disabled.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}
