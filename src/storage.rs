// SPDX-License-Identifier: GPL-3.0-only

//! Client-side file saving
//!
//! Saving is fire-and-forget: callers get no result back, failures are only
//! logged.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Sink for exported files
pub trait FileSaver {
    /// Save `content` under a name derived from `suggested_name`
    fn save(&self, suggested_name: &str, content: &[u8]);
}

/// Saves into a fixed directory, never overwriting an existing file
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    directory: PathBuf,
}

impl DirectorySaver {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write the file and return the path actually used
    pub fn write(&self, suggested_name: &str, content: &[u8]) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let path = unique_path(&self.directory, suggested_name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, suggested_name: &str, content: &[u8]) {
        match self.write(suggested_name, content) {
            Ok(path) => info!(path = %path.display(), bytes = content.len(), "File saved"),
            Err(e) => error!(
                directory = %self.directory.display(),
                name = suggested_name,
                error = %e,
                "Failed to save file"
            ),
        }
    }
}

/// First free path for `name` in `dir`, appending `_1`, `_2`, ... to the stem
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let mut n = 1u32;
    loop {
        let file_name = match ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        let candidate = dir.join(file_name);
        if !candidate.exists() {
            debug!(path = %candidate.display(), "Disambiguated file name");
            return candidate;
        }
        n += 1;
    }
}
