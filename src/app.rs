//! Application orchestration layer
//!
//! Owns the open tabs and keeps the persisted session in step with them. The
//! record-level work lives in the loader, filter, sort and view modules; this
//! layer only wires them to tabs and decides when the session is written.

pub mod tab;

use crate::config::{AppConfig, ConfigPaths};
use crate::error::Result;
use crate::file_handler::{FileSystem, LocalFileSystem};
use crate::loader::Loader;
use crate::parser::BatchParser;
use crate::record::RecordStore;
use crate::session::{absolute_path, restore::restore_with, SessionManager, TabDescriptor};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub use tab::{Tab, TabHandle, TabId};

/// Result of opening a merged tab
#[derive(Debug, Clone)]
pub struct MergedTab {
    pub tab: TabHandle,
    /// Requested paths that could not be read
    pub failed_paths: Vec<PathBuf>,
}

/// Tab registry coordinating loads and session persistence
pub struct Application {
    loader: Loader,
    config: AppConfig,
    session: SessionManager,
    tabs: Mutex<Vec<TabHandle>>,
    next_id: AtomicU64,
    shutdown: Arc<AtomicBool>,
}

impl Application {
    /// Wire the application from its collaborators
    pub fn new(fs: Arc<dyn FileSystem>, config: AppConfig, session: SessionManager) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let loader = Loader::new(fs)
            .with_parser(BatchParser::new(config.batch_size))
            .with_cancel(Arc::clone(&shutdown));

        Self {
            loader,
            config,
            session,
            tabs: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            shutdown,
        }
    }

    /// Local disk, config and session from `paths`
    pub fn from_config_paths(paths: &ConfigPaths) -> Result<Self> {
        let config = AppConfig::load(&paths.config_file())?;
        let session = SessionManager::at_path(paths.session_file());
        Ok(Self::new(Arc::new(LocalFileSystem::new()), config, session))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Open one file in a new tab
    ///
    /// Relative paths are resolved against the working directory, so the tab
    /// is persisted with an absolute path.
    pub async fn open_file(&self, path: &Path) -> Result<TabHandle> {
        let path = absolute_path(path);
        let output = self.loader.load_file(&path).await?;
        let handle = self.register(TabDescriptor::single(&path), output.store, output.skipped);
        log::info!("Opened tab {} for {}", handle.id(), path.display());
        Ok(handle)
    }

    /// Open several files merged into one tab
    ///
    /// Unreadable files are left out and reported. When only one file could
    /// be read the tab is a single-file tab.
    pub async fn open_merged(&self, paths: &[PathBuf]) -> Result<MergedTab> {
        let paths: Vec<PathBuf> = paths.iter().map(|path| absolute_path(path)).collect();
        let output = self.loader.load_merged(&paths).await?;
        let descriptor = TabDescriptor::for_loaded(output.loaded_paths);
        let handle = self.register(descriptor, output.store, output.skipped);
        log::info!("Opened merged tab {} ({})", handle.id(), handle.display_name());
        Ok(MergedTab {
            tab: handle,
            failed_paths: output.failed_paths,
        })
    }

    /// Close a tab; `false` when no tab has that id
    pub fn close_tab(&self, id: TabId) -> bool {
        let mut tabs = self.tabs.lock();
        let Some(position) = tabs.iter().position(|tab| tab.id() == id) else {
            return false;
        };
        tabs.remove(position);
        self.persist(&tabs);
        true
    }

    /// Open tabs in display order
    pub fn tabs(&self) -> Vec<TabHandle> {
        self.tabs.lock().clone()
    }

    pub fn tab(&self, id: TabId) -> Option<TabHandle> {
        self.tabs.lock().iter().find(|tab| tab.id() == id).cloned()
    }

    /// Reopen the persisted tabs, appending them in persisted order
    ///
    /// Missing or unreadable files are skipped. The session is rewritten to
    /// match what was actually restored.
    pub async fn restore_session(&self) -> Vec<TabHandle> {
        let persisted = self.session.load();
        if persisted.is_empty() {
            return Vec::new();
        }

        let restored = restore_with(&self.loader, &persisted).await;
        let mut tabs = self.tabs.lock();
        let handles: Vec<TabHandle> = restored
            .into_iter()
            .map(|tab| {
                let handle = self.new_handle(tab.descriptor, tab.store, tab.skipped);
                tabs.push(handle.clone());
                handle
            })
            .collect();
        self.persist(&tabs);
        handles
    }

    /// Cancel in-flight parses and write the final session
    pub fn shutdown(&self) -> bool {
        self.shutdown.store(true, Ordering::SeqCst);
        let tabs = self.tabs.lock();
        self.persist(&tabs)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn register(
        &self,
        descriptor: TabDescriptor,
        store: Arc<RecordStore>,
        skipped: usize,
    ) -> TabHandle {
        let handle = self.new_handle(descriptor, store, skipped);
        let mut tabs = self.tabs.lock();
        tabs.push(handle.clone());
        self.persist(&tabs);
        handle
    }

    fn new_handle(
        &self,
        descriptor: TabDescriptor,
        store: Arc<RecordStore>,
        skipped: usize,
    ) -> TabHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        TabHandle::new(Tab::new(id, descriptor, store, skipped, &self.config))
    }

    /// Write the session for `tabs`; the caller holds the tab list lock
    fn persist(&self, tabs: &[TabHandle]) -> bool {
        let descriptors: Vec<TabDescriptor> =
            tabs.iter().map(|tab| tab.descriptor().clone()).collect();
        self.session.save(&descriptors)
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("tabs", &self.tabs.lock().len())
            .field("shutdown", &self.is_shut_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JllessError;
    use crate::file_handler::accessor::testing::MemoryFileSystem;
    use tempfile::tempdir;

    fn app(session_path: &Path) -> Application {
        let fs = MemoryFileSystem::new()
            .with_file("/a.jsonl", "{\"time\":\"2025-10-20T17:19:16Z\",\"n\":1}\n")
            .with_file("/b.jsonl", "{\"time\":\"2025-10-20T17:19:15Z\",\"n\":2}\nbad\n");
        Application::new(
            Arc::new(fs),
            AppConfig::default(),
            SessionManager::at_path(session_path),
        )
    }

    #[tokio::test]
    async fn test_open_and_close_update_session() {
        let dir = tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let app = app(&session_path);

        let a = app.open_file(Path::new("/a.jsonl")).await.unwrap();
        let merged = app
            .open_merged(&[PathBuf::from("/a.jsonl"), PathBuf::from("/b.jsonl")])
            .await
            .unwrap();
        assert_eq!(merged.tab.lock().skipped(), 1);
        assert_eq!(app.tabs().len(), 2);

        let persisted = SessionManager::at_path(&session_path).load();
        assert_eq!(
            persisted,
            vec![
                TabDescriptor::single("/a.jsonl"),
                TabDescriptor::merged(["/a.jsonl", "/b.jsonl"]),
            ]
        );

        assert!(app.close_tab(a.id()));
        assert!(!app.close_tab(a.id()));
        assert_eq!(
            SessionManager::at_path(&session_path).load(),
            vec![TabDescriptor::merged(["/a.jsonl", "/b.jsonl"])]
        );
    }

    #[tokio::test]
    async fn test_failed_open_leaves_tabs_untouched() {
        let dir = tempdir().unwrap();
        let app = app(&dir.path().join("session.json"));
        let err = app.open_file(Path::new("/missing.jsonl")).await.unwrap_err();
        assert!(err.is_file_access());
        assert!(app.tabs().is_empty());
    }

    #[tokio::test]
    async fn test_merge_of_one_readable_file_is_single() {
        let dir = tempdir().unwrap();
        let app = app(&dir.path().join("session.json"));
        let merged = app
            .open_merged(&[PathBuf::from("/gone.jsonl"), PathBuf::from("/b.jsonl")])
            .await
            .unwrap();
        assert_eq!(merged.tab.descriptor(), &TabDescriptor::single("/b.jsonl"));
        assert_eq!(merged.failed_paths, vec![PathBuf::from("/gone.jsonl")]);
    }

    #[tokio::test]
    async fn test_restore_session_appends_and_rewrites() {
        let dir = tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        SessionManager::at_path(&session_path).save(&[
            TabDescriptor::merged(["/a.jsonl", "/gone.jsonl"]),
            TabDescriptor::single("/gone.jsonl"),
            TabDescriptor::single("/b.jsonl"),
        ]);

        let app = app(&session_path);
        let restored = app.restore_session().await;
        let names: Vec<String> = restored.iter().map(|t| t.display_name()).collect();
        assert_eq!(names, vec!["a.jsonl", "b.jsonl"]);
        assert!(app.tab(restored[1].id()).is_some());

        assert_eq!(
            SessionManager::at_path(&session_path).load(),
            vec![TabDescriptor::single("/a.jsonl"), TabDescriptor::single("/b.jsonl")]
        );
    }

    #[tokio::test]
    async fn test_relative_paths_are_persisted_absolute() {
        let dir = tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let cwd = std::env::current_dir().unwrap();
        let line = "{\"time\":\"2025-10-20T17:19:16Z\",\"n\":1}\n";
        let fs = MemoryFileSystem::new()
            .with_file(cwd.join("logs/a.jsonl"), line)
            .with_file(cwd.join("logs/b.jsonl"), line);
        let app = Application::new(
            Arc::new(fs),
            AppConfig::default(),
            SessionManager::at_path(&session_path),
        );

        app.open_file(Path::new("logs/a.jsonl")).await.unwrap();
        let merged = app
            .open_merged(&[PathBuf::from("logs/a.jsonl"), PathBuf::from("logs/missing.jsonl")])
            .await
            .unwrap();
        assert_eq!(merged.failed_paths, vec![cwd.join("logs/missing.jsonl")]);

        let persisted = SessionManager::at_path(&session_path).load();
        assert_eq!(
            persisted,
            vec![
                TabDescriptor::single(cwd.join("logs/a.jsonl")),
                TabDescriptor::single(cwd.join("logs/a.jsonl")),
            ]
        );
        assert!(persisted
            .iter()
            .flat_map(|tab| tab.paths())
            .all(|path| path.is_absolute()));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_later_loads() {
        let dir = tempdir().unwrap();
        let app = app(&dir.path().join("session.json"));
        assert!(app.shutdown());
        assert!(app.is_shut_down());
        let err = app.open_file(Path::new("/a.jsonl")).await.unwrap_err();
        assert!(matches!(err, JllessError::Cancelled));
    }
}
