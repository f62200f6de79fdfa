//! # jlless - In-memory core for JSONL log viewing
//!
//! Loads structured (zerolog-style) JSONL logs into ordered record stores and
//! answers the questions a log viewer asks of them: which records match these
//! words, which fall inside this time window, what does the column look like
//! sorted, and what is the next page. Open tabs survive restarts through a
//! small persisted session.
//!
//! ## Features
//!
//! - **Tolerant parsing**: malformed lines are counted and skipped, never fatal
//! - **Merged tabs**: several files combined into one time-ordered store
//! - **Search**: multi-term, case-insensitive, AND-combined over every field
//! - **Range and level filters**: inclusive time windows, level sets
//! - **Type-aware sorting**: temporal, numeric or text per column, stable
//! - **Compression Support**: Transparent handling of gzip, bzip2, xz and zstd
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`file_handler`] - File access seam, compression and memory mapping
//! - [`parser`] - Batch JSONL parsing
//! - [`record`] - Records, stores and the column model
//! - [`filter`], [`sort`], [`view`] - Projections of a store
//! - [`loader`] - Opening and parsing files off the async runtime
//! - [`session`] - Persisted tab list and restore
//! - [`config`] - User settings and file locations
//! - [`app`] - Tab registry tying the above together

// Core modules
pub mod config;
pub mod error;
pub mod file_handler;
pub mod timestamp;

// Data model and algorithms
pub mod filter;
pub mod parser;
pub mod record;
pub mod sort;
pub mod view;

// Orchestration
pub mod app;
pub mod loader;
pub mod session;

// Re-export commonly used types for convenience
pub use error::{JllessError, Result};

// Public API surface for external usage
pub use app::{Application, MergedTab, Tab, TabHandle, TabId};
pub use config::{AppConfig, ConfigPaths};
pub use file_handler::{FileSystem, LocalFileSystem};
pub use filter::{apply_filter, FilterState};
pub use loader::{load_file, load_merged, LoadOutput, Loader, MergeOutput};
pub use parser::BatchParser;
pub use record::{columns, ColumnLayout, Record, RecordStore};
pub use session::{restore_session, SessionManager, TabDescriptor};
pub use sort::{SortDirection, SortSpec};
pub use view::{Paginator, View};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install `env_logger` as the `log` backend, honouring `RUST_LOG`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(cfg!(test))
        .try_init();
}
