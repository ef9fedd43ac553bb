use crate::model::Task;
use crate::model::achievement::{Achievement, FIRST_TASK, FIVE_TASKS, STREAK_5};
use crate::streak::Streak;

const TASK_MASTER_THRESHOLD: usize = 5;
const STREAK_THRESHOLD: u64 = 5;

/// Ids whose award condition currently holds, in catalog order.
///
/// `first_task` only needs a task to exist, not to be completed.
pub fn qualifying(tasks: &[Task], streak: Streak) -> Vec<&'static str> {
    let completed = tasks.iter().filter(|task| task.done).count();

    Achievement::all()
        .iter()
        .map(|achievement| achievement.id)
        .filter(|id| match *id {
            FIRST_TASK => !tasks.is_empty(),
            FIVE_TASKS => completed >= TASK_MASTER_THRESHOLD,
            STREAK_5 => streak.value() >= STREAK_THRESHOLD,
            _ => false,
        })
        .collect()
}

/// Appends newly qualifying ids to `earned` and returns them. Earned ids are
/// never removed.
pub fn award(earned: &mut Vec<String>, tasks: &[Task], streak: Streak) -> Vec<Achievement> {
    let mut newly_earned = Vec::new();
    for id in qualifying(tasks, streak) {
        if earned.iter().any(|existing| existing == id) {
            continue;
        }
        earned.push(id.to_string());
        if let Some(achievement) = Achievement::find(id) {
            newly_earned.push(achievement);
        }
    }
    newly_earned
}
