#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const FIRST_TASK: &str = "first_task";
pub const FIVE_TASKS: &str = "five_tasks";
pub const STREAK_5: &str = "streak_5";

const CATALOG: [Achievement; 3] = [
    Achievement {
        id: FIRST_TASK,
        name: "First Task",
        description: "Complete your first task.",
    },
    Achievement {
        id: FIVE_TASKS,
        name: "Task Master",
        description: "Complete 5 tasks.",
    },
    Achievement {
        id: STREAK_5,
        name: "5-Day Streak",
        description: "Maintain a streak of 5 days.",
    },
];

impl Achievement {
    pub fn all() -> &'static [Achievement] {
        &CATALOG
    }

    pub fn find(id: &str) -> Option<Achievement> {
        CATALOG.iter().find(|achievement| achievement.id == id).copied()
    }
}
