use clap::{Parser, Subcommand};
use upnext_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "upnext", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// View a specific day instead of today
    #[arg(long, value_name = "YYYY-MM-DD", global = true)]
    pub date: Option<String>,

    /// View the day N days away from today (negative for the past)
    #[arg(long, value_name = "DAYS", global = true, allow_negative_numbers = true)]
    pub offset: Option<i64>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task to the viewed day; words starting with # become tags
    ///
    /// Example: upnext add "Buy milk #errands #home"
    Add {
        input: Vec<String>,
    },
    /// Mark a task done, or reopen it if it is already done
    ///
    /// Example: upnext toggle 1704412800000
    Toggle {
        id: String,
    },
    /// Delete a task
    ///
    /// Example: upnext delete 1704412800000
    Delete {
        id: String,
    },
    /// Move a task to another position
    ///
    /// Positions index the whole task list unless --day-view is given.
    /// Example: upnext move 0 2
    /// Example: upnext move 0 2 --day-view
    Move {
        from: usize,
        to: usize,
        #[arg(long)]
        day_view: bool,
    },
    /// List the tasks of the viewed day
    ///
    /// Example: upnext list --offset -1
    List,
    /// Show streak and counts for the viewed day
    Stats,
    /// View the next day
    Next,
    /// View the previous day
    Prev,
    /// View today again
    Today,
    /// Show or change the colour theme
    ///
    /// Example: upnext theme set ocean
    Theme {
        #[command(subcommand)]
        theme: ThemeCommand,
    },
    /// List achievements and whether they are earned
    Achievements,
    /// Run a pomodoro countdown
    ///
    /// Example: upnext pomodoro --minutes 50
    Pomodoro {
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long, hide = true, conflicts_with = "minutes")]
        seconds: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Print the active theme
    Show,
    /// List available themes
    List,
    /// Switch to a named theme
    Set { name: String },
    /// Switch between Light and Dark
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    LogLevel,
    PomodoroMinutes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    if value.is_empty() {
        return Err("override value cannot be empty".to_string());
    }

    let canonical_field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "log_level" | "log" => ConfigOverrideTarget::LogLevel,
        "pomodoro_minutes" | "pomodoro" => ConfigOverrideTarget::PomodoroMinutes,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
            ConfigOverrideTarget::PomodoroMinutes => {
                let minutes = parsed
                    .value
                    .parse::<u32>()
                    .ok()
                    .filter(|minutes| *minutes > 0)
                    .ok_or_else(|| "pomodoro_minutes must be a positive integer".to_string())?;
                overrides.pomodoro_minutes = Some(minutes);
            }
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
