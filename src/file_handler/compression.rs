//! Compression format detection and transparent decompression of log sources.
//!
//! Rotated logs are frequently shipped as `.gz`/`.zst`; they are decoded before
//! parsing so the parser only ever sees plain JSONL text.

use crate::error::{JllessError, Result};
use async_compression::tokio::bufread::{BzDecoder, GzipDecoder, XzDecoder, ZstdDecoder};
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};

/// Compressed inputs smaller than this are decompressed straight into memory
const IN_MEMORY_THRESHOLD: u64 = 10_000_000; // 10MB

/// Container formats a rotated log may arrive in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

/// Leading bytes of each supported container
const SIGNATURES: [(&[u8], CompressionType); 4] = [
    (&[0x1f, 0x8b], CompressionType::Gzip),
    (b"BZh", CompressionType::Bzip2),
    (&[0x28, 0xb5, 0x2f, 0xfd], CompressionType::Zstd),
    (&[0xfd, b'7', b'z', b'X', b'Z', 0x00], CompressionType::Xz),
];

impl CompressionType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    pub fn is_compressed(&self) -> bool {
        *self != Self::None
    }
}

/// Where decompressed content ended up
#[derive(Debug)]
pub enum DecompressionResult {
    InMemory(Vec<u8>),
    TempFile(NamedTempFile),
}

/// Outcome of format detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub format: CompressionType,
    /// The leading bytes matched the format; otherwise only the file name did
    pub confirmed: bool,
}

impl Detection {
    fn plain() -> Self {
        Self {
            format: CompressionType::None,
            confirmed: false,
        }
    }
}

/// Decide how `path` is encoded
///
/// Leading bytes win. Content that opens with `{` is plain JSONL whatever the
/// file is called; only unrecognised content falls back to the extension, and
/// such a guess is left unconfirmed.
pub async fn detect_compression(path: &Path) -> Result<Detection> {
    let mut head = [0u8; 8];
    let mut filled = 0;
    if let Ok(mut file) = File::open(path).await {
        filled = file.read(&mut head).await.unwrap_or(0);
    }
    let head = &head[..filled];

    if let Some(format) = detect_by_magic(head) {
        return Ok(Detection {
            format,
            confirmed: true,
        });
    }
    if head.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
        return Ok(Detection::plain());
    }
    Ok(detect_by_extension(path)
        .map(|format| Detection {
            format,
            confirmed: false,
        })
        .unwrap_or_else(Detection::plain))
}

fn detect_by_magic(head: &[u8]) -> Option<CompressionType> {
    SIGNATURES
        .iter()
        .find(|(signature, _)| head.starts_with(signature))
        .map(|(_, format)| *format)
}

fn detect_by_extension(path: &Path) -> Option<CompressionType> {
    let extension = path.extension()?.to_string_lossy().to_ascii_lowercase();
    let format = match extension.as_str() {
        "gz" | "gzip" => CompressionType::Gzip,
        "bz2" => CompressionType::Bzip2,
        "xz" => CompressionType::Xz,
        "zst" | "zstd" => CompressionType::Zstd,
        _ => return None,
    };
    Some(format)
}

/// Decompress a file, into memory when small, into a temp file otherwise
pub async fn decompress_file(
    path: &Path,
    compression: CompressionType,
) -> Result<DecompressionResult> {
    let compressed_size = tokio::fs::metadata(path)
        .await
        .map_err(|e| JllessError::file_error("Failed to read compressed file metadata", e))?
        .len();

    if compressed_size < IN_MEMORY_THRESHOLD {
        decompress_to_memory(path, compression)
            .await
            .map(DecompressionResult::InMemory)
    } else {
        decompress_to_spill_file(path, compression)
            .await
            .map(DecompressionResult::TempFile)
    }
}

async fn open_decoder(
    path: &Path,
    compression: CompressionType,
) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    let reader = BufReader::new(
        File::open(path)
            .await
            .map_err(|e| JllessError::file_error("Failed to open compressed file", e))?,
    );

    let decoder: Box<dyn AsyncRead + Unpin + Send> = match compression {
        CompressionType::Gzip => Box::new(GzipDecoder::new(reader)),
        CompressionType::Bzip2 => Box::new(BzDecoder::new(reader)),
        CompressionType::Xz => Box::new(XzDecoder::new(reader)),
        CompressionType::Zstd => Box::new(ZstdDecoder::new(reader)),
        CompressionType::None => {
            return Err(JllessError::compression(format!(
                "{} is not compressed",
                path.display()
            )));
        }
    };
    Ok(decoder)
}

async fn decompress_to_memory(path: &Path, compression: CompressionType) -> Result<Vec<u8>> {
    let mut decoder = open_decoder(path, compression).await?;
    let mut decoded = Vec::new();
    decoder
        .read_to_end(&mut decoded)
        .await
        .map_err(|e| decode_failure(path, compression, e))?;
    Ok(decoded)
}

async fn decompress_to_spill_file(path: &Path, compression: CompressionType) -> Result<NamedTempFile> {
    let mut decoder = open_decoder(path, compression).await?;

    let spill = NamedTempFile::new()
        .map_err(|e| JllessError::file_error("Failed to create decompression spill file", e))?;
    let mut writer = BufWriter::new(
        File::create(spill.path())
            .await
            .map_err(|e| JllessError::file_error("Failed to open spill file", e))?,
    );

    let written = tokio::io::copy(&mut decoder, &mut writer)
        .await
        .map_err(|e| decode_failure(path, compression, e))?;
    writer
        .flush()
        .await
        .map_err(|e| JllessError::file_error("Failed to flush spill file", e))?;

    log::debug!(
        "Spilled {} decompressed bytes of {} to {}",
        written,
        path.display(),
        spill.path().display()
    );
    Ok(spill)
}

fn decode_failure(path: &Path, compression: CompressionType, error: std::io::Error) -> JllessError {
    JllessError::compression(format!(
        "{} is not valid {} data: {}",
        path.display(),
        compression.name(),
        error
    ))
}
