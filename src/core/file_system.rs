use super::models::FileHandle;
use glob::Pattern;
use ignore::{WalkBuilder, overrides::OverrideBuilder};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/*
 * This module enumerates the files of a project tree. It defines errors specific
 * to enumeration, a trait `FileEnumeratorOperations` abstracting the traversal,
 * and a concrete implementation `CoreFileEnumerator` built on the `ignore` crate's
 * walker. Unreadable directories are skipped; only a missing or non-directory
 * root is reported as an error.
 */

#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    Walk(ignore::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<ignore::Error> for FileSystemError {
    fn from(err: ignore::Error) -> Self {
        FileSystemError::Walk(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::Walk(e) => write!(f, "Directory walk error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Invalid project root: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            FileSystemError::Walk(e) => Some(e),
            FileSystemError::InvalidPath(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * Knobs controlling which descendants of the project root are enumerated.
 * The defaults visit every descendant, hidden entries included, without
 * consulting ignore files.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationOptions {
    pub respect_ignore_files: bool,
    pub include_hidden: bool,
    pub follow_links: bool,
    // Gitignore-style globs to exclude. A leading '!' re-includes.
    pub exclude_patterns: Vec<String>,
    // Globs matched against the file name only. Empty means every file.
    pub file_masks: Vec<String>,
}

impl Default for EnumerationOptions {
    fn default() -> Self {
        EnumerationOptions {
            respect_ignore_files: false,
            include_hidden: true,
            follow_links: false,
            exclude_patterns: Vec::new(),
            file_masks: Vec::new(),
        }
    }
}

/*
 * Defines the operation for listing the files of a project.
 * Implementations return every non-directory descendant of `root_path` exactly
 * once, in an order that is stable for an unchanged tree.
 */
pub trait FileEnumeratorOperations: Send + Sync {
    fn enumerate(&self, root_path: &Path) -> Result<Vec<FileHandle>>;
}

/*
 * The core implementation of `FileEnumeratorOperations`.
 * Entries are visited in file path order, which makes the result deterministic.
 * Per-entry walk errors (typically a directory that cannot be listed) are logged
 * and skipped so the rest of the tree is still enumerated.
 */
pub struct CoreFileEnumerator {
    options: EnumerationOptions,
}

impl CoreFileEnumerator {
    pub fn new(options: EnumerationOptions) -> Self {
        CoreFileEnumerator { options }
    }

    fn build_walker(&self, root_path: &Path) -> WalkBuilder {
        let respect = self.options.respect_ignore_files;
        let mut walker_builder = WalkBuilder::new(root_path);
        walker_builder
            .standard_filters(false)
            .hidden(!self.options.include_hidden)
            .parents(respect)
            .git_global(false) // Keep results independent of the user's global git config.
            .git_ignore(respect)
            .git_exclude(respect)
            .ignore(respect)
            .require_git(false)
            .follow_links(self.options.follow_links)
            .sort_by_file_path(|a, b| a.cmp(b));

        if !self.options.exclude_patterns.is_empty() {
            let mut override_builder = OverrideBuilder::new(root_path);
            for pattern in &self.options.exclude_patterns {
                let trimmed = pattern.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }

                // Overrides are whitelists, so an exclude becomes a negated glob and vice versa.
                let override_pattern = if let Some(negated) = trimmed.strip_prefix('!') {
                    let include_pattern = negated.trim();
                    if include_pattern.is_empty() {
                        continue;
                    }
                    include_pattern.to_string()
                } else {
                    format!("!{trimmed}")
                };

                if let Err(err) = override_builder.add(&override_pattern) {
                    log::warn!("FileEnumerator: Invalid exclude pattern '{pattern}': {err}");
                }
            }

            match override_builder.build() {
                Ok(overrides) => {
                    walker_builder.overrides(overrides);
                }
                Err(err) => {
                    log::warn!(
                        "FileEnumerator: Failed to build overrides for exclude patterns: {err}"
                    );
                }
            }
        }

        walker_builder
    }
}

impl Default for CoreFileEnumerator {
    fn default() -> Self {
        Self::new(EnumerationOptions::default())
    }
}

impl FileEnumeratorOperations for CoreFileEnumerator {
    fn enumerate(&self, root_path: &Path) -> Result<Vec<FileHandle>> {
        if !root_path.is_dir() {
            return Err(FileSystemError::InvalidPath(root_path.to_path_buf()));
        }
        log::debug!(
            "FileEnumerator: Enumerating {root_path:?} (respect_ignore_files: {}, follow_links: {}).",
            self.options.respect_ignore_files,
            self.options.follow_links
        );

        let masks = compile_file_masks(&self.options.file_masks);
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files: Vec<FileHandle> = Vec::new();

        for entry_result in self.build_walker(root_path).build() {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!("FileEnumerator: Skipping unreadable entry: {err}");
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            // Without link following, a symlink to a directory still reports as a symlink.
            if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
                continue;
            }

            if !masks.is_empty() {
                let name = entry.file_name().to_string_lossy();
                if !masks.iter().any(|mask| mask.matches(&name)) {
                    log::trace!("FileEnumerator: {path:?} does not match any file mask.");
                    continue;
                }
            }

            let identity = if self.options.follow_links {
                fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
            } else {
                path.to_path_buf()
            };
            if !seen.insert(identity) {
                log::trace!("FileEnumerator: {path:?} already enumerated through another path.");
                continue;
            }

            files.push(FileHandle::new(path.to_path_buf()));
        }

        log::debug!(
            "FileEnumerator: Found {} files under {:?}.",
            files.len(),
            root_path
        );
        Ok(files)
    }
}

fn compile_file_masks(masks: &[String]) -> Vec<Pattern> {
    masks
        .iter()
        .map(|mask| mask.trim())
        .filter(|mask| !mask.is_empty())
        .filter_map(|mask| match Pattern::new(mask) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                log::warn!("FileEnumerator: Invalid file mask '{mask}': {err}");
                None
            }
        })
        .collect()
}
