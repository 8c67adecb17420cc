//! The to-do list.
//!
//! Plain collection operations; the only invariant is id uniqueness,
//! which `Uuid::new_v4` provides. Profile counters are the caller's
//! concern: the CLI routes adds and completions through the
//! [`ProfileStore`](crate::profile::ProfileStore) mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub category: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: u32,
}

/// Persisted as the `tasks.json` blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// Add a task. Blank text is rejected with `None`.
    pub fn add(&mut self, text: &str, category: &str) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.tasks.push(Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            category: category.to_string(),
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
        });
        self.tasks.last()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Flip completion. Returns the new completion state, `None` for an
    /// unknown id.
    pub fn toggle(&mut self, id: Uuid) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then(Utc::now);
        Some(task.completed)
    }

    /// Remove a task. Returns false for an unknown id.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn stats(&self) -> TaskStats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total > 0 {
            (completed * 100 / total) as u32
        } else {
            0
        };
        TaskStats {
            total,
            completed,
            pending: total - completed,
            completion_rate,
        }
    }
}
