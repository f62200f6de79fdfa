//! File validation utilities for ensuring a path can be opened as a log source.
//!
//! Unlike a pager, an empty file is a perfectly valid log source here: it loads
//! as an empty record store.

use crate::error::{JllessError, Result};
use std::fs::File;
use std::path::Path;

/// Largest file accepted as a log source (100GB)
const MAX_REASONABLE_SIZE: u64 = 100 * 1024 * 1024 * 1024;

/// Validate that a file path is accessible and suitable for loading
///
/// # Validations Performed
/// - Path exists and is a regular file (not a directory)
/// - File is readable by the current process
/// - File size is not suspiciously large for a log file
///
/// # Error Cases
/// - `FileNotFound` when the path does not exist
/// - `NotAFile` when the path points to a directory or other special file
/// - `PermissionDenied` when the file cannot be opened for reading
/// - `FileError` for oversized files and metadata failures
pub fn validate_file_path(path: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(JllessError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(JllessError::file_error(
                format!("Failed to read file metadata: {}", path.display()),
                e,
            ));
        }
    };

    if !metadata.is_file() {
        return Err(JllessError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let file_size = metadata.len();
    if file_size > MAX_REASONABLE_SIZE {
        return Err(JllessError::file_error(
            format!(
                "File is suspiciously large ({}GB): {}",
                file_size / (1024 * 1024 * 1024),
                path.display()
            ),
            std::io::Error::new(std::io::ErrorKind::InvalidData, "File too large"),
        ));
    }

    // Try to open the file to verify read permissions
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => JllessError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => JllessError::file_error(
            format!("Cannot open file for reading: {}", path.display()),
            e,
        ),
    })?;

    Ok(())
}
