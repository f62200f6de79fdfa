//! Filesystem collaborator boundary.
//!
//! The core never touches `std::fs` directly outside this module: every load
//! and every existence check during session restore goes through a
//! [`FileSystem`], so the display layer can substitute its own implementation.

use crate::error::Result;
use crate::file_handler::factory::SourceFactory;
use crate::file_handler::source::ByteSource;
use async_trait::async_trait;
use std::path::Path;

/// Read access to log sources
///
/// All implementations must be thread-safe; loads for different tabs may be
/// in flight at the same time.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Open a source and return its (decompressed) bytes
    ///
    /// # Errors
    /// A file-access error when the source cannot be opened or read at all.
    async fn open_for_read(&self, path: &Path) -> Result<ByteSource>;

    /// Whether `path` currently exists
    fn exists(&self, path: &Path) -> bool;
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn open_for_read(&self, path: &Path) -> Result<ByteSource> {
        SourceFactory::open(path).await
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
