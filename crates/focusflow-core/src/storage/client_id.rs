// Opaque client identifier for the remote profile store.
// Format: "focus-<uuid>". Created once, persisted, never regenerated.

use std::fs;
use std::io::Write;
use std::path::Path;

use uuid::Uuid;

use crate::error::StorageError;

const CLIENT_ID_FILE: &str = "client_id.txt";
const CLIENT_ID_PREFIX: &str = "focus-";

/// Get or create the client id under the given directory.
///
/// An existing file wins; a file holding something that is not a client
/// id is an error rather than a silent regeneration, since regenerating
/// would orphan the remote profile.
pub fn get_or_create_client_id_at(dir: &Path) -> Result<String, StorageError> {
    let path = dir.join(CLIENT_ID_FILE);

    if path.exists() {
        let content = fs::read_to_string(&path).map_err(|source| StorageError::WriteFailed {
            file: CLIENT_ID_FILE.to_string(),
            source,
        })?;
        let client_id = content.trim().to_string();
        if client_id.starts_with(CLIENT_ID_PREFIX) {
            return Ok(client_id);
        }
        return Err(StorageError::InvalidClientId(client_id));
    }

    let client_id = format!("{}{}", CLIENT_ID_PREFIX, Uuid::new_v4());

    let write = (|| -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        let mut file = fs::File::create(&path)?;
        writeln!(file, "{client_id}")
    })();
    write.map_err(|source| StorageError::WriteFailed {
        file: CLIENT_ID_FILE.to_string(),
        source,
    })?;

    Ok(client_id)
}

/// Get or create the client id in the default data directory.
pub fn get_or_create_client_id() -> Result<String, StorageError> {
    get_or_create_client_id_at(&super::data_dir()?)
}
