use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};

/// Where the whole state document lives between runs.
pub trait Storage {
    /// The stored document, or `None` on first run.
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, raw: &str) -> Result<()>;
}

/// A single JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for JsonFileStorage {
    /// Bytes that are not UTF-8 come back as [`TrackerError::MalformedDocument`],
    /// same as any other unreadable document.
    fn load(&self) -> Result<Option<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let contents = String::from_utf8(bytes).map_err(|e| {
            TrackerError::MalformedDocument(format!("stored state is not valid UTF-8: {e}"))
        })?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(contents))
    }

    /// Writes next to the target and renames over it, so a crash mid-write never
    /// leaves a truncated document behind.
    fn save(&mut self, raw: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, raw)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Keeps the document in memory. Used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            contents: Some(raw.into()),
            saves: 0,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn save(&mut self, raw: &str) -> Result<()> {
        self.contents = Some(raw.to_string());
        self.saves += 1;
        Ok(())
    }
}
