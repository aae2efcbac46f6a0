//! In-process session store.

use std::sync::Mutex;

use super::error::SessionError;
use super::types::Session;
use super::SessionStore;

/// Session store holding the serialized record in memory, the way browser
/// local storage holds a single string value.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: &Session) -> Self {
        let raw = serde_json::to_string(session).ok();
        Self {
            raw: Mutex::new(raw),
        }
    }

    /// Seed the store with an arbitrary serialized record.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// Current serialized record, if any.
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.raw.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        let mut raw = self.lock();
        let text = raw.as_deref()?;
        match serde_json::from_str::<Session>(text) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!("discarding unreadable session record: {err}");
                *raw = None;
                None
            }
        }
    }

    fn set(&self, session: &Session) -> Result<(), SessionError> {
        let text = serde_json::to_string(session)
            .map_err(|err| SessionError::Invalid(format!("failed to serialize session: {err}")))?;
        *self.lock() = Some(text);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.lock() = None;
        Ok(())
    }
}
