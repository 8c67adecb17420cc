//! In-memory user database mirrored to a JSON file.
//!
//! All users live in a `Mutex<HashMap>`; the file is a mirror that is
//! loaded once on boot and rewritten after each mutation so state
//! survives a restart. A failed mirror write is logged and the request
//! still succeeds from memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::{fs, io};

use focusflow_core::UserEnvelope;

pub struct UserDb {
    path: PathBuf,
    users: Mutex<HashMap<String, UserEnvelope>>,
}

impl UserDb {
    /// Open the database at `path`, loading any existing mirror file.
    /// A corrupt mirror starts the server empty rather than refusing to
    /// boot.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let users = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(users) => users,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt user db, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable user db, starting empty");
                HashMap::new()
            }
        };
        Self {
            path,
            users: Mutex::new(users),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, UserEnvelope>> {
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn get(&self, id: &str) -> Option<UserEnvelope> {
        self.lock().get(id).cloned()
    }

    pub fn insert(&self, id: &str, user: UserEnvelope) {
        let mut users = self.lock();
        users.insert(id.to_string(), user);
        self.persist(&users);
    }

    /// Mutate the user under `id` in place. Returns the updated envelope,
    /// or `None` if the id is unknown.
    pub fn update(
        &self,
        id: &str,
        apply: impl FnOnce(&mut UserEnvelope),
    ) -> Option<UserEnvelope> {
        let mut users = self.lock();
        let user = users.get_mut(id)?;
        apply(user);
        let updated = user.clone();
        self.persist(&users);
        Some(updated)
    }

    fn persist(&self, users: &HashMap<String, UserEnvelope>) {
        if let Err(e) = write_mirror(&self.path, users) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to mirror user db");
        }
    }
}

fn write_mirror(path: &Path, users: &HashMap<String, UserEnvelope>) -> io::Result<()> {
    let text = serde_json::to_string_pretty(users)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn insert_get_and_count() {
        let dir = TempDir::new().unwrap();
        let db = UserDb::open(dir.path().join("users.json"));
        assert_eq!(db.count(), 0);
        assert!(db.get("focus-a").is_none());

        db.insert("focus-a", UserEnvelope::default());
        assert_eq!(db.count(), 1);
        assert_eq!(db.get("focus-a").unwrap().profile.name, "Usuário");
    }

    #[test]
    fn update_unknown_id_is_none() {
        let dir = TempDir::new().unwrap();
        let db = UserDb::open(dir.path().join("users.json"));
        assert!(db.update("focus-a", |_| {}).is_none());
    }

    #[test]
    fn mirror_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let db = UserDb::open(&path);
        db.insert("focus-a", UserEnvelope::default());
        db.update("focus-a", |user| user.profile.streak = 7);
        drop(db);

        let reopened = UserDb::open(&path);
        assert_eq!(reopened.count(), 1);
        assert_eq!(reopened.get("focus-a").unwrap().profile.streak, 7);
    }

    #[test]
    fn corrupt_mirror_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "{nope").unwrap();

        let db = UserDb::open(&path);
        assert_eq!(db.count(), 0);
    }
}
