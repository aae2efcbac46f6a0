//! Encrypted session file under the user config directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::config::config_root_dir;

use super::crypto::{
    decrypt_session, derive_key, encrypt_session, fresh_key, looks_encrypted, salt_of,
    DerivedKey, EncryptedSessionRecord,
};
use super::error::SessionError;
use super::types::Session;
use super::SessionStore;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Returns the default session path (`~/.config/bookvault/session.json`).
pub fn default_session_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("bookvault").join("session.json"))
}

/// Session store persisting one encrypted record on disk.
///
/// Unreadable records (bad JSON, tampered ciphertext, a different machine)
/// read as "no session" and are deleted.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    key: Mutex<Option<DerivedKey>>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: Mutex::new(None),
        }
    }

    /// Store at the default path, when the platform has a config root.
    pub fn open_default() -> Option<Self> {
        default_session_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key_for_salt(&self, salt: [u8; super::crypto::SALT_LEN]) -> Result<DerivedKey, SessionError> {
        let mut cached = self.key.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(key) = cached.as_ref().filter(|key| key.salt == salt) {
            return Ok(key.clone());
        }
        let key = derive_key(salt)?;
        *cached = Some(key.clone());
        Ok(key)
    }

    fn write_key(&self) -> Result<DerivedKey, SessionError> {
        let mut cached = self.key.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(key) = cached.as_ref() {
            return Ok(key.clone());
        }
        let key = fresh_key()?;
        *cached = Some(key.clone());
        Ok(key)
    }

    fn load(&self) -> Result<Option<Session>, SessionError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SessionError::Io(err)),
        };
        let value: serde_json::Value = serde_json::from_str(&text).map_err(|err| {
            SessionError::Invalid(format!(
                "failed to parse session file `{}`: {err}",
                self.path.display()
            ))
        })?;

        if looks_encrypted(&value) {
            let record: EncryptedSessionRecord = serde_json::from_value(value).map_err(|err| {
                SessionError::Invalid(format!("malformed encrypted session record: {err}"))
            })?;
            let key = self.key_for_salt(salt_of(&record)?)?;
            return decrypt_session(&key, &record).map(Some);
        }

        // Plaintext records from older builds are re-written encrypted.
        let session: Session = serde_json::from_value(value).map_err(|err| {
            SessionError::Invalid(format!("malformed session record: {err}"))
        })?;
        if let Err(err) = self.store(&session) {
            tracing::warn!("failed to migrate plaintext session record: {err}");
        }
        Ok(Some(session))
    }

    fn store(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700));
            }
        }

        let record = encrypt_session(&self.write_key()?, session)?;
        let text = serde_json::to_string_pretty(&record).map_err(|err| {
            SessionError::Invalid(format!("failed to serialize session record: {err}"))
        })?;
        // Write a sibling file and rename it over the record so readers see
        // either the previous record or the new one, never a partial write.
        let tmp_path = self.temp_path();
        let written = write_private(&tmp_path, text.as_bytes())
            .and_then(|()| std::fs::rename(&tmp_path, &self.path));
        if let Err(err) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(SessionError::Io(err));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session.json".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }
}

/// Create `path` readable only by the owner and write `bytes` durably.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "discarding unreadable session: {err}");
                let _ = std::fs::remove_file(&self.path);
                None
            }
        }
    }

    fn set(&self, session: &Session) -> Result<(), SessionError> {
        self.store(session)
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionError::Io(err)),
        }
    }
}
