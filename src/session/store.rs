use crate::config::write_atomically;
use crate::error::{JllessError, Result};
use crate::session::Session;
use std::path::{Path, PathBuf};

/// Backing storage for the session document
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet
    fn read(&self) -> Result<Option<Session>>;

    fn write(&self, session: &Session) -> Result<()>;
}

/// Session stored as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileSessionStore {
    fn read(&self) -> Result<Option<Session>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(JllessError::session(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            JllessError::session(format!("corrupt session file {}: {}", self.path.display(), e))
        })
    }

    fn write(&self, session: &Session) -> Result<()> {
        let encoded = serde_json::to_vec_pretty(session)
            .map_err(|e| JllessError::session(format!("failed to encode session: {}", e)))?;
        write_atomically(&self.path, &encoded).map_err(|e| {
            JllessError::session(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}
