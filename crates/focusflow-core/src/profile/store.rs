//! Profile/settings store.
//!
//! Sole owner of [`UserProfile`] and [`AppSettings`]. Every public
//! mutation is: optimistic in-memory change, synchronous achievement
//! evaluation against the pre-mutation profile, one local persistence of
//! the result, then a detached best-effort remote PATCH. Nothing in this
//! path returns a transport or storage error to the caller - the worst
//! case is a raised `sync_degraded` flag and a session that continues on
//! local state.

use chrono::Utc;

use super::achievements::{self, FIRST_TASK, FOCUS_MASTER, STREAK_KEEPER, TASK_MASTER};
use super::types::{AppSettings, ProfileUpdate, SettingsUpdate, Theme, UserProfile};
use crate::error::{StorageError, SyncError};
use crate::events::Event;
use crate::storage::{self, LocalStore, PROFILE_FILE, SETTINGS_FILE};
use crate::sync::{ApiClient, SyncHandle};

pub struct ProfileStore {
    profile: UserProfile,
    settings: AppSettings,
    storage: LocalStore,
    sync: SyncHandle,
}

impl ProfileStore {
    /// Local-only store: blobs from disk (defaults when missing or
    /// corrupt), no remote.
    pub fn local(storage: LocalStore) -> Self {
        let profile = storage.load_or_default(PROFILE_FILE);
        let settings = storage.load_or_default(SETTINGS_FILE);
        Self {
            profile,
            settings,
            storage,
            sync: SyncHandle::offline(),
        }
    }

    /// Full startup: local blobs first, then one remote fetch.
    ///
    /// A `200` replaces both field groups with the remote copy
    /// (last-fetched-wins). A `404` means the id is new: the current
    /// local state is pushed with a create. Anything else degrades to
    /// local-only, which the returned events report as a
    /// [`Event::SyncDegraded`]. Only a broken client-id file is an error.
    pub async fn init(
        storage: LocalStore,
        client: ApiClient,
    ) -> Result<(Self, Vec<Event>), StorageError> {
        let user_id = storage::get_or_create_client_id_at(storage.dir())?;
        let mut profile: UserProfile = storage.load_or_default(PROFILE_FILE);
        let mut settings: AppSettings = storage.load_or_default(SETTINGS_FILE);
        profile.id = Some(user_id.clone());

        let sync = SyncHandle::new(client.clone(), user_id.clone());
        let mut events = Vec::new();
        match client.fetch_user(&user_id).await {
            Ok(envelope) => {
                profile = envelope.profile;
                profile.id = Some(user_id);
                settings = envelope.settings;
            }
            Err(SyncError::NotFound) => {
                if client
                    .create_user(&user_id, Some(&profile), Some(&settings))
                    .await
                    .is_err()
                {
                    sync.mark_degraded(true);
                    events.push(Event::SyncDegraded { at: Utc::now() });
                }
            }
            Err(_) => {
                sync.mark_degraded(true);
                events.push(Event::SyncDegraded { at: Utc::now() });
            }
        }

        let store = Self {
            profile,
            settings,
            storage,
            sync,
        };
        store.persist_profile();
        store.persist_settings();
        Ok((store, events))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Non-fatal "sync degraded" status for the presentation layer.
    pub fn is_sync_degraded(&self) -> bool {
        self.sync.is_degraded()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Shallow-merge into the profile group.
    pub fn update_profile(&mut self, update: ProfileUpdate) {
        update.apply(&mut self.profile);
        self.commit_profile();
    }

    /// Shallow-merge into the settings group. Returns the new theme when
    /// it changed, so the presentation layer can restyle.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Option<Theme> {
        let previous_theme = self.settings.theme;
        update.apply(&mut self.settings);
        self.persist_settings();
        self.sync.spawn_patch(None, Some(self.settings.clone()));
        (self.settings.theme != previous_theme).then_some(self.settings.theme)
    }

    /// A task entered the system (not yet completed).
    pub fn record_task_added(&mut self) -> Vec<Event> {
        self.profile.total_tasks += 1;
        self.commit_profile();
        Vec::new()
    }

    /// A task entered the system, possibly already completed.
    pub fn record_task_completed(&mut self, completed: bool) -> Vec<Event> {
        let before = self.profile.clone();
        self.profile.total_tasks += 1;
        let mut unlocked = Vec::new();
        if completed {
            self.profile.completed_tasks += 1;
            unlocked = achievements::evaluate(&before, &[FIRST_TASK, TASK_MASTER]);
        }
        self.finish_mutation(unlocked)
    }

    /// An existing, already-counted task was toggled to completed. Only
    /// the completion counter moves; counters never decrease, so
    /// un-completing is not recorded. The first-task badge is tied to
    /// the add path, where the task count is still zero.
    pub fn record_task_toggled(&mut self, completed: bool) -> Vec<Event> {
        if !completed {
            return Vec::new();
        }
        let before = self.profile.clone();
        self.profile.completed_tasks += 1;
        let unlocked = achievements::evaluate(&before, &[TASK_MASTER]);
        self.finish_mutation(unlocked)
    }

    /// A Work phase ran to completion.
    pub fn record_pomodoro_completed(&mut self) -> Vec<Event> {
        let before = self.profile.clone();
        self.profile.pomodoros_completed += 1;
        let unlocked = achievements::evaluate(&before, &[FOCUS_MASTER]);
        self.finish_mutation(unlocked)
    }

    /// The external daily scheduler extended the streak.
    pub fn record_streak_increment(&mut self) -> Vec<Event> {
        let before = self.profile.clone();
        self.profile.streak += 1;
        let unlocked = achievements::evaluate(&before, &[STREAK_KEEPER]);
        self.finish_mutation(unlocked)
    }

    /// One-way unlock. No-op (and no re-stamp) when already unlocked.
    pub fn unlock_achievement(&mut self, id: &str) -> Option<Event> {
        let already = self
            .profile
            .achievement(id)
            .map(|a| a.unlocked)
            .unwrap_or(true);
        if already {
            return None;
        }
        let event = self.stamp_unlock(id);
        self.commit_profile();
        event
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Apply unlocks from an achievement evaluation, then commit the
    /// counters and unlocks together in one persistence.
    fn finish_mutation(&mut self, unlocked: Vec<&str>) -> Vec<Event> {
        let events: Vec<Event> = unlocked
            .into_iter()
            .filter_map(|id| self.stamp_unlock(id))
            .collect();
        self.commit_profile();
        events
    }

    fn stamp_unlock(&mut self, id: &str) -> Option<Event> {
        let now = Utc::now();
        let badge = self.profile.achievements.iter_mut().find(|a| a.id == id)?;
        badge.unlocked = true;
        badge.unlocked_at = Some(now);
        Some(Event::AchievementUnlocked {
            id: id.to_string(),
            at: now,
        })
    }

    fn commit_profile(&mut self) {
        self.persist_profile();
        self.sync.spawn_patch(Some(self.profile.clone()), None);
    }

    fn persist_profile(&self) {
        // Best-effort: a failed write degrades, it does not propagate.
        let _ = self.storage.save(PROFILE_FILE, &self.profile);
    }

    fn persist_settings(&self) {
        let _ = self.storage.save(SETTINGS_FILE, &self.settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local_store(dir: &TempDir) -> ProfileStore {
        ProfileStore::local(LocalStore::at(dir.path()))
    }

    #[test]
    fn completed_task_from_zero_unlocks_first_task() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);

        let events = store.record_task_completed(true);
        assert_eq!(store.profile().total_tasks, 1);
        assert_eq!(store.profile().completed_tasks, 1);
        assert!(matches!(
            events.as_slice(),
            [Event::AchievementUnlocked { id, .. }] if id == FIRST_TASK
        ));
        let badge = store.profile().achievement(FIRST_TASK).unwrap();
        assert!(badge.unlocked);
        assert!(badge.unlocked_at.is_some());
    }

    #[test]
    fn pending_task_does_not_unlock_anything() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);

        let events = store.record_task_added();
        assert!(events.is_empty());
        assert_eq!(store.profile().total_tasks, 1);
        assert_eq!(store.profile().completed_tasks, 0);
        assert!(!store.profile().achievement(FIRST_TASK).unwrap().unlocked);
    }

    #[test]
    fn tenth_pomodoro_unlocks_focus_master() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);

        for _ in 0..9 {
            assert!(store.record_pomodoro_completed().is_empty());
        }
        let events = store.record_pomodoro_completed();
        assert_eq!(store.profile().pomodoros_completed, 10);
        assert!(matches!(
            events.as_slice(),
            [Event::AchievementUnlocked { id, .. }] if id == FOCUS_MASTER
        ));
    }

    #[test]
    fn seventh_streak_day_unlocks_streak_keeper() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);
        for _ in 0..6 {
            store.record_streak_increment();
        }
        let events = store.record_streak_increment();
        assert_eq!(store.profile().streak, 7);
        assert!(matches!(
            events.as_slice(),
            [Event::AchievementUnlocked { id, .. }] if id == STREAK_KEEPER
        ));
    }

    #[test]
    fn unlock_is_one_way_and_keeps_its_timestamp() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);

        let first = store.unlock_achievement(FOCUS_MASTER);
        assert!(first.is_some());
        let stamped = store
            .profile()
            .achievement(FOCUS_MASTER)
            .unwrap()
            .unlocked_at;

        assert!(store.unlock_achievement(FOCUS_MASTER).is_none());
        assert_eq!(
            store.profile().achievement(FOCUS_MASTER).unwrap().unlocked_at,
            stamped
        );
    }

    #[test]
    fn counter_and_unlock_are_committed_together() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = local_store(&dir);
            store.record_task_completed(true);
        }
        // A fresh store sees both the counter and the unlock on disk.
        let reopened = local_store(&dir);
        assert_eq!(reopened.profile().completed_tasks, 1);
        assert!(reopened.profile().achievement(FIRST_TASK).unwrap().unlocked);
    }

    #[test]
    fn toggle_moves_only_the_completion_counter() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);
        store.record_task_added();
        store.record_task_toggled(true);
        assert_eq!(store.profile().total_tasks, 1);
        assert_eq!(store.profile().completed_tasks, 1);
        // Un-completing never decrements.
        store.record_task_toggled(false);
        assert_eq!(store.profile().completed_tasks, 1);
    }

    #[test]
    fn toggling_a_counted_task_does_not_unlock_first_task() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);
        store.record_task_added();
        let events = store.record_task_toggled(true);
        assert!(events.is_empty());
        assert!(!store.profile().achievement(FIRST_TASK).unwrap().unlocked);
    }

    #[test]
    fn fiftieth_completion_via_toggle_unlocks_task_master() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);
        for _ in 0..49 {
            assert!(store.record_task_toggled(true).is_empty());
        }
        let events = store.record_task_toggled(true);
        assert_eq!(store.profile().completed_tasks, 50);
        assert!(matches!(
            events.as_slice(),
            [Event::AchievementUnlocked { id, .. }] if id == TASK_MASTER
        ));
    }

    #[test]
    fn update_settings_reports_theme_change() {
        let dir = TempDir::new().unwrap();
        let mut store = local_store(&dir);

        let unchanged = store.update_settings(SettingsUpdate {
            volume: Some(70),
            ..SettingsUpdate::default()
        });
        assert!(unchanged.is_none());

        let changed = store.update_settings(SettingsUpdate {
            theme: Some(Theme::Green),
            ..SettingsUpdate::default()
        });
        assert_eq!(changed, Some(Theme::Green));
        assert_eq!(store.settings().volume, 70);
    }

    #[tokio::test]
    async fn init_creates_remote_user_on_404() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex(r"^/api/users/focus-.*$".into()))
            .with_status(404)
            .with_body(r#"{"error":"Usuário não encontrado"}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/users")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&crate::sync::UserEnvelope::default()).unwrap())
            .create_async()
            .await;

        let (store, events) =
            ProfileStore::init(LocalStore::at(dir.path()), ApiClient::new(server.url()))
                .await
                .unwrap();
        assert!(!store.is_sync_degraded());
        assert!(events.is_empty());
        create.assert_async().await;
    }

    #[tokio::test]
    async fn init_survives_a_dead_server() {
        let dir = TempDir::new().unwrap();
        let (store, events) = ProfileStore::init(
            LocalStore::at(dir.path()),
            ApiClient::new("http://127.0.0.1:1"),
        )
        .await
        .unwrap();
        assert!(store.is_sync_degraded());
        // Degradation is reported as a startup event, not an error.
        assert!(matches!(events.as_slice(), [Event::SyncDegraded { .. }]));
        // Session continues on local defaults.
        assert_eq!(store.profile().total_tasks, 0);
    }

    #[tokio::test]
    async fn init_prefers_the_fetched_remote_state() {
        let dir = TempDir::new().unwrap();
        let mut remote = crate::sync::UserEnvelope::default();
        remote.profile.pomodoros_completed = 12;
        remote.settings.theme = Theme::Red;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex(r"^/api/users/focus-.*$".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&remote).unwrap())
            .create_async()
            .await;

        let (store, _) =
            ProfileStore::init(LocalStore::at(dir.path()), ApiClient::new(server.url()))
                .await
                .unwrap();
        assert_eq!(store.profile().pomodoros_completed, 12);
        assert_eq!(store.settings().theme, Theme::Red);
        // The local id is kept, never the remote's.
        assert!(store.profile().id.as_deref().unwrap().starts_with("focus-"));
    }
}
