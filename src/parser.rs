//! Line-oriented JSONL parsing into record batches.
//!
//! Every line is decoded on its own. Blank lines are skipped silently, lines
//! that are not a JSON object are counted as skipped, and parsing always runs
//! to the end of the input unless cancelled.

use crate::error::{JllessError, Result};
use crate::record::{Record, RecordStore, RecordStoreBuilder};
use bstr::ByteSlice;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records accumulated before a batch is appended to the store
pub const DEFAULT_BATCH_SIZE: usize = 5000;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Counts from one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub records: usize,
    pub skipped: usize,
}

impl ParseStats {
    pub fn absorb(&mut self, other: ParseStats) {
        self.records += other.records;
        self.skipped += other.skipped;
    }
}

/// A finished store and the number of lines dropped while building it
#[derive(Debug, Clone)]
pub struct ParsedStore {
    pub store: RecordStore,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchParser {
    batch_size: usize,
}

impl Default for BatchParser {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchParser {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Parse `bytes` and build the time-ordered store
    pub fn parse(&self, bytes: &[u8], cancel: Option<&AtomicBool>) -> Result<ParsedStore> {
        self.parse_polling(bytes, || is_set(cancel))
    }

    /// Builds a store only when every batch made it in
    fn parse_polling(&self, bytes: &[u8], cancelled: impl FnMut() -> bool) -> Result<ParsedStore> {
        let mut builder = RecordStoreBuilder::new();
        let stats = self.append_polling(bytes, &mut builder, cancelled)?;
        Ok(ParsedStore {
            store: builder.finish(),
            skipped: stats.skipped,
        })
    }

    /// Parse `bytes`, appending records to `builder` one batch at a time
    ///
    /// The cancel flag is polled before each batch. On `Cancelled` the builder
    /// holds a partial result and must be discarded.
    pub fn parse_into(
        &self,
        bytes: &[u8],
        builder: &mut RecordStoreBuilder,
        cancel: Option<&AtomicBool>,
    ) -> Result<ParseStats> {
        self.append_polling(bytes, builder, || is_set(cancel))
    }

    fn append_polling(
        &self,
        bytes: &[u8],
        builder: &mut RecordStoreBuilder,
        mut cancelled: impl FnMut() -> bool,
    ) -> Result<ParseStats> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut stats = ParseStats::default();
        let mut batch = Vec::with_capacity(self.batch_size.min(1024));

        check_cancelled(&mut cancelled)?;

        for (index, line) in Lines::new(bytes).enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_line(line) {
                Ok(record) => batch.push(record),
                Err(reason) => {
                    stats.skipped += 1;
                    log::debug!("Skipping line {}: {}", index + 1, reason);
                }
            }

            if batch.len() >= self.batch_size {
                stats.records += batch.len();
                builder.append_batch(std::mem::take(&mut batch));
                check_cancelled(&mut cancelled)?;
            }
        }

        if !batch.is_empty() {
            stats.records += batch.len();
            builder.append_batch(batch);
        }

        if stats.skipped > 0 {
            log::info!(
                "Parsed {} records, skipped {} malformed lines",
                stats.records,
                stats.skipped
            );
        }
        Ok(stats)
    }
}

fn is_set(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn check_cancelled(cancelled: &mut impl FnMut() -> bool) -> Result<()> {
    if cancelled() {
        Err(JllessError::Cancelled)
    } else {
        Ok(())
    }
}

fn parse_line(line: &[u8]) -> std::result::Result<Record, String> {
    let value: Value = serde_json::from_slice(line).map_err(|e| e.to_string())?;
    Record::from_value(value).ok_or_else(|| "not a JSON object".to_string())
}

/// Newline-delimited slices of a buffer, without the terminating `\n`
struct Lines<'a> {
    rest: &'a [u8],
}

impl<'a> Lines<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let line = match memchr::memchr(b'\n', self.rest) {
            Some(pos) => {
                let line = &self.rest[..pos];
                self.rest = &self.rest[pos + 1..];
                line
            }
            None => std::mem::take(&mut self.rest),
        };
        Some(line)
    }
}
