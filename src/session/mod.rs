//! Session persistence.
//!
//! The client reads the session through [`SessionStore`] at the moment each
//! request is dispatched, so writes from login, refresh and logout are
//! visible to the next request without any caching layer.

mod crypto;
mod error;
mod file;
mod memory;
mod types;

pub use error::SessionError;
pub use file::{default_session_path, FileSessionStore};
pub use memory::MemorySessionStore;
pub use types::Session;

/// Storage for the single persisted session record.
///
/// Implementations must treat an unreadable record as absent (and discard
/// it) rather than failing `get`.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Session>;
    /// Replace the stored record wholesale.
    fn set(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}
