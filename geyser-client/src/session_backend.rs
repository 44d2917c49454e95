//! Pluggable session storage backend.
//!
//! The [`SessionBackend`] trait abstracts over where a [`SessionData`] lives
//! between runs. Two backends are provided:
//! * [`JsonFileBackend`]: a JSON cookie list on disk (default).
//! * [`InMemoryBackend`]: nothing touches the disk.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::session::SessionData;

// ─── Trait ────────────────────────────────────────────────────────────────────

/// An abstraction over where and how session data is persisted.
pub trait SessionBackend: Send + Sync {
    /// Persist the given session.
    fn save(&self, session: &SessionData) -> io::Result<()>;

    /// Load a previously persisted session, or return `None` if none exists.
    fn load(&self) -> io::Result<Option<SessionData>>;

    /// Remove the stored session (e.g. on logout).
    fn delete(&self) -> io::Result<()>;

    /// Human-readable name of this backend (for log messages).
    fn name(&self) -> &str;
}

// ─── JsonFileBackend ──────────────────────────────────────────────────────────

/// The default backend: a pretty-printed JSON array of cookies.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path { &self.path }
}

impl SessionBackend for JsonFileBackend {
    fn save(&self, session: &SessionData) -> io::Result<()> {
        session.save(&self.path)
    }

    fn load(&self) -> io::Result<Option<SessionData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        SessionData::load(&self.path).map(Some)
    }

    fn delete(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn name(&self) -> &str { "json-file" }
}

// ─── InMemoryBackend ──────────────────────────────────────────────────────────

/// An ephemeral backend. Useful for tests or one-shot tools.
#[derive(Default)]
pub struct InMemoryBackend {
    data: Mutex<Option<SessionData>>,
}

impl InMemoryBackend {
    pub fn new() -> Self { Self::default() }
}

impl SessionBackend for InMemoryBackend {
    fn save(&self, session: &SessionData) -> io::Result<()> {
        *self.data.lock().unwrap_or_else(|p| p.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> io::Result<Option<SessionData>> {
        Ok(self.data.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn delete(&self) -> io::Result<()> {
        *self.data.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }

    fn name(&self) -> &str { "in-memory" }
}
