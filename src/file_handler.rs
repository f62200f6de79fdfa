//! File handling abstraction with memory mapping and compression support.
//!
//! This module is the filesystem collaborator of the log core: it validates
//! paths, transparently decompresses rotated logs and hands back the raw bytes
//! of a source for the batch parser.

pub mod accessor;
pub mod compression;
pub mod factory;
pub mod source;
pub mod validation;

pub use accessor::{FileSystem, LocalFileSystem};
pub use compression::{detect_compression, CompressionType, Detection};
pub use factory::SourceFactory;
pub use source::ByteSource;
pub use validation::validate_file_path;
