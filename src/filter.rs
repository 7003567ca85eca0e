/*!
 * Exclusion filtering shared by every traversal pass
 */

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::utils::normalize_path;

/// One configured exclusion, in both of its resolved forms
#[derive(Debug, Clone)]
struct Exclusion {
    /// Absolute path with `.`/`..` resolved, symlinks untouched
    lexical: PathBuf,
    /// Fully resolved path, when the entry exists on disk
    canonical: Option<PathBuf>,
}

impl Exclusion {
    fn covers(&self, candidate: &Path) -> bool {
        candidate.starts_with(&self.lexical)
            || self
                .canonical
                .as_ref()
                .map_or(false, |canonical| candidate.starts_with(canonical))
    }
}

/// Decides whether a filesystem entry is excluded from all processing.
///
/// Exclusion entries are resolved once, at construction. An entry is excluded
/// when its path equals, or sits below, an exclusion in either its lexical or
/// its symlink-resolved form. Comparison is per path component, so excluding
/// `A/src` leaves `A/srcs` untouched.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    /// Directory relative candidates and exclusion entries are anchored at
    base: PathBuf,
    exclusions: Vec<Exclusion>,
}

impl PathFilter {
    /// Build a filter from exclusion entries.
    ///
    /// Relative entries are interpreted against `base` (the scan root).
    /// Entries that do not exist on disk keep only their lexical form and
    /// never match anything.
    pub fn new<P: AsRef<Path>>(exclusions: &[P], base: &Path) -> Self {
        let base = fs::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
        let exclusions = exclusions
            .iter()
            .map(|entry| {
                let lexical = normalize_path(entry.as_ref(), &base);
                let canonical = fs::canonicalize(&lexical).ok();
                debug!(
                    "exclusion entry {} -> {} ({:?})",
                    entry.as_ref().display(),
                    lexical.display(),
                    canonical
                );
                Exclusion { lexical, canonical }
            })
            .collect();

        Self { base, exclusions }
    }

    /// A filter that excludes nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Check whether a path is excluded.
    ///
    /// Candidates are normalized lexically; walkers hand in paths rooted at an
    /// already canonical directory, so no filesystem access happens here.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclusions.is_empty() {
            return false;
        }
        let candidate = normalize_path(path, &self.base);
        self.exclusions.iter().any(|e| e.covers(&candidate))
    }

    /// Check an entry that may be a symlink.
    ///
    /// Links are excluded by their own path and also by the path they resolve
    /// to, so a link into an excluded directory does not expose its contents.
    pub fn is_entry_excluded(&self, path: &Path, is_symlink: bool) -> bool {
        if self.is_excluded(path) {
            return true;
        }
        if !is_symlink || self.exclusions.is_empty() {
            return false;
        }
        match fs::canonicalize(path) {
            Ok(target) => self.exclusions.iter().any(|e| e.covers(&target)),
            Err(_) => false,
        }
    }
}
