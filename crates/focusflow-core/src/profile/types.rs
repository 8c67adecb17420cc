//! Profile and settings data model.
//!
//! Field names are the persisted/wire contract (camelCase), shared by the
//! local JSON blobs and the remote profile API. Partial updates are typed:
//! [`ProfileUpdate`] and [`SettingsUpdate`] carry optional fields and merge
//! shallowly, one field group at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::achievements;

/// A one-way unlockable badge tied to a profile counter threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// The user's profile: identity, counters, and the badge catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub join_date: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub pomodoros_completed: u32,
    pub streak: u32,
    pub achievements: Vec<Achievement>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            id: None,
            name: "Usuário".to_string(),
            email: "usuario@exemplo.com".to_string(),
            avatar: None,
            join_date: Utc::now().format("%B %Y").to_string(),
            total_tasks: 0,
            completed_tasks: 0,
            pomodoros_completed: 0,
            streak: 0,
            achievements: achievements::catalog(),
        }
    }
}

impl UserProfile {
    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Blue,
    Green,
    Purple,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pt,
    En,
    Es,
}

/// Pure configuration. No invariants beyond the volume clamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub notifications: bool,
    pub sound_enabled: bool,
    pub pomodoro_notifications: bool,
    pub task_reminders: bool,
    pub auto_save: bool,
    pub theme: Theme,
    pub language: Language,
    pub volume: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            sound_enabled: true,
            pomodoro_notifications: true,
            task_reminders: true,
            auto_save: true,
            theme: Theme::Blue,
            language: Language::Pt,
            volume: 50,
        }
    }
}

impl AppSettings {
    /// Get a settings value as a string by its wire-contract key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by key from its string form. Unknown keys and
    /// unparseable values are rejected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut json = serde_json::to_value(&*self).map_err(|e| e.to_string())?;
        let obj = json.as_object_mut().ok_or("settings is not an object")?;
        let existing = obj
            .get(key)
            .ok_or_else(|| format!("unknown settings key: {key}"))?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| e.to_string())?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value.parse::<u64>().map_err(|e| e.to_string())?.into(),
            ),
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(key.to_string(), new_value);
        *self = serde_json::from_value(json).map_err(|e| e.to_string())?;
        self.volume = self.volume.min(100);
        Ok(())
    }
}

/// Optional-field update for the profile group. Shallow merge: every
/// present field replaces its counterpart wholesale (the achievements
/// vector included).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tasks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_tasks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoros_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<Achievement>>,
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(avatar) = &self.avatar {
            profile.avatar = Some(avatar.clone());
        }
        if let Some(join_date) = &self.join_date {
            profile.join_date = join_date.clone();
        }
        if let Some(total_tasks) = self.total_tasks {
            profile.total_tasks = total_tasks;
        }
        if let Some(completed_tasks) = self.completed_tasks {
            profile.completed_tasks = completed_tasks;
        }
        if let Some(pomodoros_completed) = self.pomodoros_completed {
            profile.pomodoros_completed = pomodoros_completed;
        }
        if let Some(streak) = self.streak {
            profile.streak = streak;
        }
        if let Some(achievements) = &self.achievements {
            profile.achievements = achievements.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|v| v.as_object().is_some_and(|o| o.is_empty()))
            .unwrap_or(true)
    }
}

/// Optional-field update for the settings group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_reminders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
}

impl SettingsUpdate {
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
        if let Some(sound_enabled) = self.sound_enabled {
            settings.sound_enabled = sound_enabled;
        }
        if let Some(pomodoro_notifications) = self.pomodoro_notifications {
            settings.pomodoro_notifications = pomodoro_notifications;
        }
        if let Some(task_reminders) = self.task_reminders {
            settings.task_reminders = task_reminders;
        }
        if let Some(auto_save) = self.auto_save {
            settings.auto_save = auto_save;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(volume) = self.volume {
            settings.volume = volume.min(100);
        }
    }

    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|v| v.as_object().is_some_and(|o| o.is_empty()))
            .unwrap_or(true)
    }
}
