//! Byte sources backing a loaded log file.
//!
//! A source is whatever the factory decided was the cheapest way to hold the
//! file content: an owned buffer, a memory map, or a memory map over a
//! decompressed temporary file.

use memmap2::Mmap;
use tempfile::NamedTempFile;

/// Storage strategy for the raw bytes of one source file
#[derive(Debug)]
pub enum ByteSource {
    /// Content loaded entirely into memory (small files, small compressed files)
    InMemory(Vec<u8>),
    /// Content accessed via memory mapping (large plain files)
    MemoryMapped(Mmap),
    /// Compressed file decompressed to temp file and memory-mapped
    /// The temp file is kept alive to prevent deletion
    Compressed {
        mmap: Mmap,
        _temp_file: NamedTempFile,
    },
}

impl ByteSource {
    /// Get the underlying bytes as a slice regardless of storage strategy
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ByteSource::InMemory(vec) => vec.as_slice(),
            ByteSource::MemoryMapped(mmap) => &mmap[..],
            ByteSource::Compressed { mmap, .. } => &mmap[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short label for diagnostics
    pub fn strategy(&self) -> &'static str {
        match self {
            ByteSource::InMemory(_) => "in-memory",
            ByteSource::MemoryMapped(_) => "mmap",
            ByteSource::Compressed { .. } => "decompressed-mmap",
        }
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSource::InMemory(bytes)
    }
}
