use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

use crate::error::ReconError;

/// A directory that could not be read during the walk.
#[derive(Debug)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub error: std::io::Error,
}

/// Lazy depth-first walk yielding regular files under a root.
///
/// Symlinks are not followed. Traversal order is whatever `read_dir`
/// returns. Unreadable sub-directories surface as `Err(SkippedDir)` items and
/// the walk continues past them.
pub struct TreeWalker {
    pending: Vec<PathBuf>,
    current: Option<(PathBuf, ReadDir)>,
}

impl TreeWalker {
    /// Fails only when the root itself cannot be listed.
    pub fn new(root: &Path) -> Result<Self, ReconError> {
        if !root.is_dir() {
            return Err(ReconError::InvalidRoot(root.to_path_buf()));
        }
        let entries = fs::read_dir(root).map_err(|_| ReconError::InvalidRoot(root.to_path_buf()))?;
        Ok(Self {
            pending: Vec::new(),
            current: Some((root.to_path_buf(), entries)),
        })
    }
}

impl Iterator for TreeWalker {
    type Item = Result<PathBuf, SkippedDir>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some((dir, entries)) = self.current.as_mut() else {
                let next_dir = self.pending.pop()?;
                match fs::read_dir(&next_dir) {
                    Ok(entries) => self.current = Some((next_dir, entries)),
                    Err(error) => return Some(Err(SkippedDir { path: next_dir, error })),
                }
                continue;
            };

            let Some(entry) = entries.next() else {
                self.current = None;
                continue;
            };
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    return Some(Err(SkippedDir { path: dir.clone(), error }));
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(error) => return Some(Err(SkippedDir { path, error })),
            };
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                self.pending.push(path);
                continue;
            }
            if file_type.is_file() {
                return Some(Ok(path));
            }
        }
    }
}

/// File name as UTF-8, or `None` for names that are not valid UTF-8.
pub fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
