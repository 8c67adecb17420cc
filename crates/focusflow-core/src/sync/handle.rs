//! Fire-and-forget remote writes.
//!
//! Profile store mutations must never wait on the network: a PATCH is
//! spawned as a detached task and its outcome only moves the
//! `sync_degraded` flag. Callers read the flag for UI display; they never
//! join the task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::profile::{AppSettings, UserProfile};
use crate::sync::ApiClient;

/// Owns the detached-write path and the degraded flag.
///
/// An offline handle (no client) swallows writes entirely; the session is
/// local-only by construction.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    client: Option<ApiClient>,
    user_id: String,
    degraded: Arc<AtomicBool>,
}

impl SyncHandle {
    pub fn new(client: ApiClient, user_id: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            user_id: user_id.into(),
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that never talks to the network.
    pub fn offline() -> Self {
        Self {
            client: None,
            user_id: String::new(),
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while the last remote write (or the initial fetch) failed.
    /// Non-fatal: local state stays authoritative for the session.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn mark_degraded(&self, degraded: bool) {
        self.degraded.store(degraded, Ordering::Relaxed);
    }

    /// Queue a best-effort PATCH of the given field groups. Returns
    /// immediately; a failure only flips the degraded flag. Without a
    /// runtime (plain sync caller) the write is skipped and the handle
    /// marked degraded.
    pub fn spawn_patch(&self, profile: Option<UserProfile>, settings: Option<AppSettings>) {
        let Some(client) = self.client.clone() else {
            return;
        };
        if profile.is_none() && settings.is_none() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.mark_degraded(true);
            return;
        };
        let user_id = self.user_id.clone();
        let degraded = self.degraded.clone();
        runtime.spawn(async move {
            let result = client
                .patch_user(&user_id, profile.as_ref(), settings.as_ref())
                .await;
            degraded.store(result.is_err(), Ordering::Relaxed);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_handle_is_inert() {
        let handle = SyncHandle::offline();
        handle.spawn_patch(Some(UserProfile::default()), None);
        assert!(!handle.is_degraded());
    }

    #[tokio::test]
    async fn failed_patch_flips_degraded_flag() {
        let client = ApiClient::new("http://127.0.0.1:1");
        let handle = SyncHandle::new(client, "focus-abc");
        handle.spawn_patch(Some(UserProfile::default()), None);
        // The write is detached; poll the flag briefly.
        for _ in 0..100 {
            if handle.is_degraded() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("degraded flag never set");
    }

    #[tokio::test]
    async fn successful_patch_clears_degraded_flag() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/api/users/focus-abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::to_string(&crate::sync::UserEnvelope::default()).unwrap(),
            )
            .create_async()
            .await;

        let handle = SyncHandle::new(ApiClient::new(server.url()), "focus-abc");
        handle.mark_degraded(true);
        handle.spawn_patch(None, Some(AppSettings::default()));
        for _ in 0..100 {
            if !handle.is_degraded() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("degraded flag never cleared");
    }
}
