//! Factory for opening log sources.
//!
//! Chooses how the bytes of a file are held in memory based on its size and
//! compression, after validating the path.

use crate::error::{JllessError, Result};
use crate::file_handler::compression::{decompress_file, detect_compression, DecompressionResult};
use crate::file_handler::source::ByteSource;
use crate::file_handler::validation::validate_file_path;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Factory for creating [`ByteSource`] instances
///
/// # Strategy Selection
/// - Files < 50MB: In-memory (`ByteSource::InMemory`)
/// - Files ≥ 50MB: Memory mapping (`ByteSource::MemoryMapped`)
/// - Compressed files: decompressed into memory or into a mapped temp file
pub struct SourceFactory;

impl SourceFactory {
    /// Size threshold for choosing between in-memory and memory-mapped strategies
    pub(crate) const MEMORY_THRESHOLD: u64 = 50 * 1024 * 1024; // 50MB

    /// Open `path` with the most suitable strategy
    ///
    /// # Errors
    /// * Validation errors (missing path, directory, unreadable)
    /// * Decompression errors for corrupt compressed input
    /// * Memory mapping failures
    pub async fn open(path: &Path) -> Result<ByteSource> {
        validate_file_path(path)?;

        let detection = detect_compression(path).await?;
        if detection.format.is_compressed() {
            log::debug!(
                "Decompressing {} ({})",
                path.display(),
                detection.format.name()
            );
            match decompress_file(path, detection.format).await {
                Ok(decoded) => return Self::from_decompressed(decoded),
                // named like an archive but not one; read the bytes as they are
                Err(e) if !detection.confirmed => {
                    log::warn!("Reading {} as plain text: {}", path.display(), e);
                }
                Err(e) => return Err(e),
            }
        }

        let file_size = std::fs::metadata(path)
            .map_err(|e| JllessError::file_error("Failed to get file metadata", e))?
            .len();

        if file_size < Self::MEMORY_THRESHOLD {
            let content = tokio::fs::read(path).await.map_err(|e| {
                JllessError::file_error(format!("Failed to read file: {}", path.display()), e)
            })?;
            Ok(ByteSource::InMemory(content))
        } else {
            let file = File::open(path).map_err(|e| {
                JllessError::file_error(format!("Failed to open file: {}", path.display()), e)
            })?;
            let mmap = unsafe {
                Mmap::map(&file).map_err(|e| {
                    JllessError::file_error(
                        format!("Failed to memory map file: {}", path.display()),
                        e,
                    )
                })?
            };
            Ok(ByteSource::MemoryMapped(mmap))
        }
    }

    fn from_decompressed(decoded: DecompressionResult) -> Result<ByteSource> {
        match decoded {
            DecompressionResult::InMemory(data) => Ok(ByteSource::InMemory(data)),
            DecompressionResult::TempFile(temp_file) => {
                let handle = temp_file
                    .reopen()
                    .map_err(|e| JllessError::file_error("Failed to reopen temp file", e))?;
                let mmap = unsafe {
                    Mmap::map(&handle)
                        .map_err(|e| JllessError::file_error("Failed to memory map temp file", e))?
                };
                Ok(ByteSource::Compressed {
                    mmap,
                    _temp_file: temp_file,
                })
            }
        }
    }
}
