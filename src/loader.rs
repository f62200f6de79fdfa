//! Loading files into record stores.
//!
//! Reading goes through the [`FileSystem`] seam; parsing runs on tokio's
//! blocking pool so the caller's runtime stays responsive.

use crate::error::{JllessError, Result};
use crate::file_handler::{ByteSource, FileSystem};
use crate::parser::{BatchParser, ParseStats};
use crate::record::{RecordStore, RecordStoreBuilder};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// A single loaded file
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub store: Arc<RecordStore>,
    pub skipped: usize,
}

/// A merged load of several files
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub store: Arc<RecordStore>,
    pub skipped: usize,
    /// Paths that contributed, in request order
    pub loaded_paths: Vec<PathBuf>,
    /// Paths that could not be opened, in request order
    pub failed_paths: Vec<PathBuf>,
}

/// Opens and parses files through a [`FileSystem`]
#[derive(Clone)]
pub struct Loader {
    fs: Arc<dyn FileSystem>,
    parser: BatchParser,
    cancel: Option<Arc<AtomicBool>>,
}

impl Loader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            parser: BatchParser::default(),
            cancel: None,
        }
    }

    pub fn with_parser(mut self, parser: BatchParser) -> Self {
        self.parser = parser;
        self
    }

    /// Abort parsing with `Cancelled` once `flag` is set
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Load one file
    ///
    /// Fails only when the file cannot be opened or read; malformed lines are
    /// counted in `skipped`.
    pub async fn load_file(&self, path: &Path) -> Result<LoadOutput> {
        let source = self.fs.open_for_read(path).await?;
        log::debug!(
            "Opened {} ({} bytes, {})",
            path.display(),
            source.len(),
            source.strategy()
        );

        let (store, stats) = self.parse_sources(vec![source]).await?;
        log::info!(
            "Loaded {} records from {} ({} skipped)",
            stats.records,
            path.display(),
            stats.skipped
        );
        Ok(LoadOutput {
            store: Arc::new(store),
            skipped: stats.skipped,
        })
    }

    /// Load several files into one store, ordered by time
    ///
    /// Unreadable files are reported in `failed_paths` and do not abort the
    /// merge. When none can be read the result is `NoReadableSources`.
    pub async fn load_merged(&self, paths: &[PathBuf]) -> Result<MergeOutput> {
        let opened = join_all(paths.iter().map(|path| self.fs.open_for_read(path))).await;

        let mut sources = Vec::with_capacity(paths.len());
        let mut loaded_paths = Vec::new();
        let mut failed_paths = Vec::new();
        for (path, result) in paths.iter().zip(opened) {
            match result {
                Ok(source) => {
                    sources.push(source);
                    loaded_paths.push(path.clone());
                }
                Err(e) => {
                    log::warn!("Leaving {} out of merge: {}", path.display(), e);
                    failed_paths.push(path.clone());
                }
            }
        }

        if sources.is_empty() {
            return Err(JllessError::NoReadableSources {
                paths: paths.to_vec(),
            });
        }

        let (store, stats) = self.parse_sources(sources).await?;
        log::info!(
            "Merged {} records from {} files ({} skipped, {} unreadable)",
            stats.records,
            loaded_paths.len(),
            stats.skipped,
            failed_paths.len()
        );
        Ok(MergeOutput {
            store: Arc::new(store),
            skipped: stats.skipped,
            loaded_paths,
            failed_paths,
        })
    }

    /// Parse every source in order into one store on the blocking pool
    async fn parse_sources(&self, sources: Vec<ByteSource>) -> Result<(RecordStore, ParseStats)> {
        let parser = self.parser;
        let cancel = self.cancel.clone();

        tokio::task::spawn_blocking(move || -> Result<(RecordStore, ParseStats)> {
            let mut builder = RecordStoreBuilder::new();
            let mut stats = ParseStats::default();
            for source in &sources {
                let file_stats = parser.parse_into(source.as_bytes(), &mut builder, cancel.as_deref())?;
                stats.absorb(file_stats);
            }
            Ok((builder.finish(), stats))
        })
        .await
        .map_err(|e| JllessError::other(format!("parse task failed: {}", e)))?
    }
}

/// Load one file with default settings
pub async fn load_file(fs: Arc<dyn FileSystem>, path: &Path) -> Result<LoadOutput> {
    Loader::new(fs).load_file(path).await
}

/// Merge several files with default settings
pub async fn load_merged(fs: Arc<dyn FileSystem>, paths: &[PathBuf]) -> Result<MergeOutput> {
    Loader::new(fs).load_merged(paths).await
}
