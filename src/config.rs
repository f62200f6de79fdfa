//! User configuration and on-disk locations.
//!
//! Settings live in `config.toml` and the session in `session.json`, both under
//! `<config_dir>/jlless/`. `JLLESS_CONFIG_DIR` overrides the directory.

use crate::error::{JllessError, Result};
use crate::parser::DEFAULT_BATCH_SIZE;
use crate::record::DEFAULT_VISIBLE_COLUMNS;
use crate::view::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "jlless";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const SESSION_FILE_NAME: &str = "session.json";
pub const CONFIG_DIR_ENV: &str = "JLLESS_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_visible_columns")]
    pub visible_columns: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Opaque to the core; owned by whatever displays the tabs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_geometry: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            visible_columns: default_visible_columns(),
            page_size: default_page_size(),
            batch_size: default_batch_size(),
            window_geometry: None,
        }
    }
}

fn default_visible_columns() -> Vec<String> {
    DEFAULT_VISIBLE_COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl AppConfig {
    /// Read `path`, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(JllessError::config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| JllessError::config(format!("invalid config: {}", e)))?;
        Ok(config.normalized())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| JllessError::config(format!("failed to encode config: {}", e)))
    }

    /// Write atomically, creating the parent directory when needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let encoded = self.to_toml()?;
        write_atomically(path, encoded.as_bytes())
            .map_err(|e| JllessError::config(format!("failed to write {}: {}", path.display(), e)))
    }

    /// Zero sizes would stall paging and batching
    fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.batch_size = self.batch_size.max(1);
        self
    }
}

/// Locations of the config and session files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$JLLESS_CONFIG_DIR`, else the platform config directory plus `jlless`
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::new(dir));
        }
        dirs::config_dir()
            .map(|base| Self::new(base.join(APP_DIR_NAME)))
            .ok_or_else(|| JllessError::config("no configuration directory for this platform"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    pub fn session_file(&self) -> PathBuf {
        self.dir.join(SESSION_FILE_NAME)
    }
}

/// Replace `path` with `contents` through a temp file in the same directory
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
