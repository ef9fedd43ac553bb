use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::Date;
use upnext_core::date_cursor::format_day;
use upnext_core::model::theme::Palette;
use upnext_core::{Achievement, Task, Theme};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    view_index: usize,
    #[tabled(rename = "Pos")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

#[derive(Tabled)]
struct AchievementRow {
    #[tabled(rename = "Achievement")]
    name: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
    #[tabled(rename = "Earned")]
    earned: &'static str,
}

/// Tasks of one day together with their positions in the full collection.
pub struct DayListing<'a> {
    pub day: Date,
    pub entries: Vec<(usize, &'a Task)>,
    pub remaining: usize,
    pub completed: usize,
}

pub fn day_label(day: Date) -> String {
    let weekday = day.weekday().to_string();
    format!("{} ({})", format_day(day), &weekday[..3])
}

pub fn streak_label(streak: u64) -> String {
    let unit = if streak == 1 { "day" } else { "days" };
    format!("Current streak: {streak} {unit}")
}

pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "done": task.done,
        "date": format_day(task.date),
        "priority": task.priority.label(),
        "tags": task.tags,
    })
}

pub fn achievement_ids(achievements: &[Achievement]) -> Vec<&'static str> {
    achievements.iter().map(|achievement| achievement.id).collect()
}

pub fn render_day(listing: &DayListing<'_>, palette: &Palette) -> String {
    let mut out = String::new();
    out.push_str(&palette.accentize(&day_label(listing.day)));
    out.push('\n');

    if listing.entries.is_empty() {
        out.push_str("No tasks for this day.\n");
    } else {
        let rows: Vec<TaskRow> = listing
            .entries
            .iter()
            .enumerate()
            .map(|(view_index, (position, task))| TaskRow {
                view_index,
                position: *position,
                id: task.id.clone(),
                done: if task.done { "[x]" } else { "[ ]" },
                text: task.text.clone(),
                tags: format_tags(&task.tags),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        out.push_str(&table.to_string());
        out.push('\n');
    }

    out.push_str(&palette.mutedize(&format!(
        "Remaining: {}  Completed: {}",
        listing.remaining, listing.completed
    )));
    out
}

pub fn day_json(listing: &DayListing<'_>) -> serde_json::Value {
    let tasks: Vec<serde_json::Value> = listing
        .entries
        .iter()
        .map(|(position, task)| {
            let mut entry = task_json(task);
            entry["position"] = serde_json::json!(position);
            entry
        })
        .collect();
    serde_json::json!({
        "date": format_day(listing.day),
        "tasks": tasks,
        "remaining": listing.remaining,
        "completed": listing.completed,
    })
}

pub fn render_achievements(earned: &[String]) -> String {
    let rows: Vec<AchievementRow> = Achievement::all()
        .iter()
        .map(|achievement| AchievementRow {
            name: achievement.name,
            description: achievement.description,
            earned: if earned.iter().any(|id| id == achievement.id) {
                "yes"
            } else {
                "no"
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn achievements_json(earned: &[String]) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = Achievement::all()
        .iter()
        .map(|achievement| {
            serde_json::json!({
                "id": achievement.id,
                "name": achievement.name,
                "description": achievement.description,
                "earned": earned.iter().any(|id| id == achievement.id),
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

pub fn render_theme_list(active: &Theme, palette: &Palette) -> String {
    Theme::all()
        .iter()
        .map(|theme| {
            if theme.name == active.name {
                palette.accentize(&format!("* {}", theme.name))
            } else {
                format!("  {}", theme.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
