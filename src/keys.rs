use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Outcome of reading the keys file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedKeys {
    /// The file does not exist.
    Missing,
    /// Keys in file order, trimmed.
    Keys(Vec<String>),
}

impl LoadedKeys {
    pub fn into_keys(self) -> Vec<String> {
        match self {
            LoadedKeys::Missing => Vec::new(),
            LoadedKeys::Keys(keys) => keys,
        }
    }
}

/// Abstract pending-keys persistence interface
pub trait KeyStore {
    /// Return the pending keys. A missing source is reported, not raised.
    fn load(&self) -> Result<LoadedKeys>;
    /// Replace the pending keys. An empty slice leaves an empty source behind.
    fn save(&self, keys: &[String]) -> Result<()>;
    /// Human-readable location for status messages.
    fn location(&self) -> String;
}

/// Extracts issue keys from keys file content, skipping blank and `#` comment lines.
pub fn parse_keys(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Plain text keys file, one key per line.
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileKeyStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<LoadedKeys> {
        if !self.path.exists() {
            return Ok(LoadedKeys::Missing);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read keys file {}", self.path.display()))?;
        Ok(LoadedKeys::Keys(parse_keys(&content)))
    }

    fn save(&self, keys: &[String]) -> Result<()> {
        let mut file = File::create(&self.path).with_context(|| {
            format!(
                "Failed to open keys file {} for writing",
                self.path.display()
            )
        })?;
        for key in keys {
            writeln!(file, "{key}").context("Failed to write key to file")?;
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
