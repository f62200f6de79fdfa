use crate::file_handler::FileSystem;
use crate::loader::Loader;
use crate::record::RecordStore;
use crate::session::TabDescriptor;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;

/// A tab brought back from the session
#[derive(Debug, Clone)]
pub struct RestoredTab {
    /// What the tab is now made of; may be narrower than what was persisted
    pub descriptor: TabDescriptor,
    pub store: Arc<RecordStore>,
    pub skipped: usize,
}

/// Reduce persisted descriptors to what still exists on disk
///
/// Single tabs whose file is gone are dropped. Merged tabs keep their existing
/// paths in order, become single when one is left and are dropped when none is.
pub fn plan_restore(fs: &dyn FileSystem, tabs: &[TabDescriptor]) -> Vec<TabDescriptor> {
    tabs.iter()
        .filter_map(|descriptor| match descriptor {
            TabDescriptor::Single { path } => {
                if fs.exists(path) {
                    Some(descriptor.clone())
                } else {
                    log::debug!("Dropping session tab, {} no longer exists", path.display());
                    None
                }
            }
            TabDescriptor::Merged { paths } => {
                let existing: Vec<PathBuf> = paths.iter().filter(|p| fs.exists(p)).cloned().collect();
                if existing.len() < paths.len() {
                    log::debug!(
                        "Merged session tab lost {} of {} files",
                        paths.len() - existing.len(),
                        paths.len()
                    );
                }
                if existing.is_empty() {
                    None
                } else {
                    Some(TabDescriptor::for_loaded(existing))
                }
            }
        })
        .collect()
}

/// Restore `tabs` with a default [`Loader`] over `fs`
pub async fn restore_session(fs: Arc<dyn FileSystem>, tabs: &[TabDescriptor]) -> Vec<RestoredTab> {
    restore_with(&Loader::new(fs), tabs).await
}

/// Restore `tabs`, loading concurrently and returning in persisted order
///
/// Tabs that fail to load are left out; nothing here is an error.
pub async fn restore_with(loader: &Loader, tabs: &[TabDescriptor]) -> Vec<RestoredTab> {
    let plan = plan_restore(loader.file_system().as_ref(), tabs);
    let loads = plan.into_iter().map(|descriptor| restore_one(loader, descriptor));

    let restored: Vec<RestoredTab> = join_all(loads).await.into_iter().flatten().collect();
    log::info!("Restored {} of {} session tabs", restored.len(), tabs.len());
    restored
}

async fn restore_one(loader: &Loader, descriptor: TabDescriptor) -> Option<RestoredTab> {
    match descriptor {
        TabDescriptor::Single { path } => match loader.load_file(&path).await {
            Ok(output) => Some(RestoredTab {
                descriptor: TabDescriptor::Single { path },
                store: output.store,
                skipped: output.skipped,
            }),
            Err(e) => {
                log::debug!("Dropping session tab {}: {}", path.display(), e);
                None
            }
        },
        TabDescriptor::Merged { paths } => match loader.load_merged(&paths).await {
            Ok(output) => Some(RestoredTab {
                descriptor: TabDescriptor::for_loaded(output.loaded_paths),
                store: output.store,
                skipped: output.skipped,
            }),
            Err(e) => {
                log::debug!("Dropping merged session tab: {}", e);
                None
            }
        },
    }
}
