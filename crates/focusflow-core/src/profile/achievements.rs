//! Achievement catalog and unlock rules.
//!
//! Evaluation is a pure function of the profile *before* the triggering
//! mutation: each rule checks the pre-mutation counter value, so the
//! threshold fires on exactly the crossing mutation and never again.

use super::types::{Achievement, UserProfile};

pub const FIRST_TASK: &str = "first-task";
pub const FOCUS_MASTER: &str = "focus-master";
pub const TASK_MASTER: &str = "task-master";
pub const STREAK_KEEPER: &str = "streak-keeper";

/// The fixed 4-badge catalog, all locked.
pub fn catalog() -> Vec<Achievement> {
    let badge = |id: &str, name: &str, description: &str, icon: &str| Achievement {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        unlocked: false,
        unlocked_at: None,
    };
    vec![
        badge(
            FIRST_TASK,
            "Primeira Tarefa",
            "Complete sua primeira tarefa",
            "Award",
        ),
        badge(FOCUS_MASTER, "Foco Total", "Complete 10 pomodoros", "Target"),
        badge(
            TASK_MASTER,
            "Mestre das Tarefas",
            "Complete 50 tarefas",
            "Trophy",
        ),
        badge(
            STREAK_KEEPER,
            "Sequência Perfeita",
            "Mantenha uma sequência de 7 dias",
            "Flame",
        ),
    ]
}

/// Does this badge's threshold sit exactly at the given pre-mutation
/// profile? (first-task: no tasks yet; focus-master: the 10th pomodoro
/// just completed; task-master: the 50th task; streak-keeper: day 7.)
fn condition_met(id: &str, before: &UserProfile) -> bool {
    match id {
        FIRST_TASK => before.total_tasks == 0,
        FOCUS_MASTER => before.pomodoros_completed == 9,
        TASK_MASTER => before.completed_tasks == 49,
        STREAK_KEEPER => before.streak == 6,
        _ => false,
    }
}

/// Which of `candidates` should unlock, given the profile as it stood
/// before the mutation. Already-unlocked badges never re-fire.
pub fn evaluate<'a>(before: &UserProfile, candidates: &[&'a str]) -> Vec<&'a str> {
    candidates
        .iter()
        .filter(|id| {
            let already = before
                .achievement(id)
                .map(|a| a.unlocked)
                .unwrap_or(true);
            !already && condition_met(id, before)
        })
        .copied()
        .collect()
}
