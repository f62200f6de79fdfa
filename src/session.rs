//! Persisted tab list and its restoration.
//!
//! The session is the ordered list of open tabs, each described only by the
//! paths it was loaded from. It is written in full after every structural
//! change and read back at startup, where files that have since disappeared
//! are dropped without complaint.

pub mod restore;
pub mod store;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use restore::{plan_restore, restore_session, RestoredTab};
pub use store::{JsonFileSessionStore, SessionStore};

/// Persistent identity of a tab
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TabDescriptor {
    Single { path: PathBuf },
    Merged { paths: Vec<PathBuf> },
}

impl TabDescriptor {
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self::Single { path: path.into() }
    }

    pub fn merged<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::Merged {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Descriptor for the paths that actually contributed to a load
    ///
    /// A merge that ended up with one file is a single tab.
    pub fn for_loaded(mut paths: Vec<PathBuf>) -> Self {
        if paths.len() == 1 {
            Self::Single {
                path: paths.remove(0),
            }
        } else {
            Self::Merged { paths }
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::Single { path } => std::slice::from_ref(path),
            Self::Merged { paths } => paths,
        }
    }

    /// Title shown for the tab
    pub fn display_name(&self) -> String {
        match self {
            Self::Single { path } => file_name(path),
            Self::Merged { paths } => match paths.as_slice() {
                [only] => file_name(only),
                [first, second] => format!("{} + {}", file_name(first), file_name(second)),
                _ => format!("{} merged files", paths.len()),
            },
        }
    }
}

/// `path` joined onto the working directory unless it is already absolute
///
/// Persisted tabs must resolve from any working directory. If the working
/// directory cannot be determined the path is kept as given.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            log::warn!("Keeping relative path {}: {}", path.display(), e);
            path.to_path_buf()
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// On-disk session document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub tabs: Vec<TabDescriptor>,
}

/// Saves and loads the tab list, never failing outward
///
/// Writes are serialized so concurrent saves cannot interleave.
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    write_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Manager persisting to a JSON file at `path`
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(JsonFileSessionStore::new(path)))
    }

    /// Replace the persisted list with `tabs`
    ///
    /// Returns `false` when the write failed; the failure is only logged.
    pub fn save(&self, tabs: &[TabDescriptor]) -> bool {
        let _guard = self.write_lock.lock();
        let session = Session {
            tabs: tabs.to_vec(),
        };
        match self.store.write(&session) {
            Ok(()) => {
                log::debug!("Saved session with {} tabs", tabs.len());
                true
            }
            Err(e) => {
                log::warn!("Failed to save session: {}", e);
                false
            }
        }
    }

    /// The persisted list, or nothing when there is none or it is unreadable
    pub fn load(&self) -> Vec<TabDescriptor> {
        let _guard = self.write_lock.lock();
        match self.store.read() {
            Ok(Some(session)) => session.tabs,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Ignoring unreadable session: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_descriptor_wire_format() {
        let session = Session {
            tabs: vec![
                TabDescriptor::single("/var/log/app.jsonl"),
                TabDescriptor::merged(["/a.jsonl", "/b.jsonl"]),
            ],
        };
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(
            json,
            r#"{"tabs":[{"kind":"single","path":"/var/log/app.jsonl"},{"kind":"merged","paths":["/a.jsonl","/b.jsonl"]}]}"#
        );
        assert_eq!(serde_json::from_str::<Session>(&json).unwrap(), session);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            TabDescriptor::single("/var/log/app.jsonl").display_name(),
            "app.jsonl"
        );
        assert_eq!(
            TabDescriptor::merged(["/x/a.jsonl", "/y/b.jsonl"]).display_name(),
            "a.jsonl + b.jsonl"
        );
        assert_eq!(
            TabDescriptor::merged(["/a", "/b", "/c"]).display_name(),
            "3 merged files"
        );
    }

    #[test]
    fn test_for_loaded_downgrades_single_survivor() {
        assert_eq!(
            TabDescriptor::for_loaded(vec![PathBuf::from("/a")]),
            TabDescriptor::single("/a")
        );
        assert_eq!(
            TabDescriptor::for_loaded(vec![PathBuf::from("/a"), PathBuf::from("/b")]),
            TabDescriptor::merged(["/a", "/b"])
        );
    }

    #[test]
    fn test_manager_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::at_path(dir.path().join("session.json"));
        assert!(manager.load().is_empty());

        let tabs = vec![
            TabDescriptor::single("/one.jsonl"),
            TabDescriptor::merged(["/two.jsonl", "/three.jsonl"]),
        ];
        assert!(manager.save(&tabs));
        assert_eq!(manager.load(), tabs);

        assert!(manager.save(&[]));
        assert!(manager.load().is_empty());
    }

    #[test]
    fn test_corrupt_session_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(SessionManager::at_path(&path).load().is_empty());
    }

    #[test]
    fn test_failed_save_returns_false() {
        let dir = tempdir().unwrap();
        // a directory where the file should be makes the final rename fail
        let path = dir.path().join("session.json");
        std::fs::create_dir(&path).unwrap();
        assert!(!SessionManager::at_path(&path).save(&[TabDescriptor::single("/a")]));
    }

    #[test]
    fn test_absolute_path_resolves_against_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        let resolved = absolute_path(Path::new("logs/a.jsonl"));
        assert!(resolved.is_absolute());
        assert_eq!(resolved, cwd.join("logs/a.jsonl"));

        let already = cwd.join("b.jsonl");
        assert_eq!(absolute_path(&already), already);
    }
}
