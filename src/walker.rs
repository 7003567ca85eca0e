/*!
 * Sorted, exclusion-aware depth-first traversal
 */

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::Result;
use crate::filter::PathFilter;
use crate::types::{FailureStage, SoftFailure, WalkEntry};

/// Callbacks invoked by [`Walker::walk`] for every non-excluded entry.
///
/// The walker does not look at extensions; visitors decide what a matching
/// file is.
pub trait Visitor {
    /// Called for a directory, before any of its children
    fn on_directory(&mut self, entry: &WalkEntry);

    /// Called for a regular file
    fn on_file(&mut self, entry: &WalkEntry);

    /// Called when a directory could not be listed; its subtree is skipped
    fn on_error(&mut self, _failure: SoftFailure) {}
}

/// Depth-first walker shared by the manifest, clone and statistics passes.
///
/// Entries of every directory are visited in file-name order (byte order of
/// the OS string, independent of locale), so two walks over an unchanged tree
/// always produce the same sequence.
pub struct Walker<'a> {
    filter: &'a PathFilter,
    tick: Option<&'a dyn Fn()>,
}

impl<'a> Walker<'a> {
    /// Create a walker applying `filter` at every entry
    pub fn new(filter: &'a PathFilter) -> Self {
        Self { filter, tick: None }
    }

    /// Invoke `tick` once per visited entry (progress reporting)
    pub fn with_tick(mut self, tick: &'a dyn Fn()) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Walk everything below `root`.
    ///
    /// `prefix` is prepended to every relative path handed to the visitor.
    /// Listing failures are reported to the visitor and logged; the walk then
    /// continues with the next sibling. Only failing to resolve `root` itself
    /// is returned as an error.
    pub fn walk(&self, root: &Path, prefix: &Path, visitor: &mut dyn Visitor) -> Result<()> {
        let root = fs::canonicalize(root)?;
        let filter = self.filter;

        let entries = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !filter.is_entry_excluded(e.path(), e.path_is_symlink()));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.clone());
                    warn!("Skipping {}: {}", path.display(), err);
                    visitor.on_error(SoftFailure {
                        stage: FailureStage::Walk,
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let rel_path = relative_path(&root, entry.path(), prefix);
            let walk_entry = WalkEntry {
                path: entry.path().to_path_buf(),
                rel_path,
                depth: entry.depth() - 1,
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                visitor.on_directory(&walk_entry);
            } else if file_type.is_file() {
                visitor.on_file(&walk_entry);
            } else {
                continue;
            }

            if let Some(tick) = self.tick {
                tick();
            }
        }

        Ok(())
    }
}

fn relative_path(root: &Path, path: &Path, prefix: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(rel) => prefix.join(rel),
        Err(_) => prefix.join(path.file_name().unwrap_or_default()),
    }
}
