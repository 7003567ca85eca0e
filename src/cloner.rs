/*!
 * Clone tree creation with renamed copies of matching files
 */

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::types::{FailureStage, SoftFailure, WalkEntry};
use crate::utils::matches_extension;
use crate::walker::{Visitor, Walker};

/// Suffix appended (not substituted) to every cloned file name
pub const CLONE_SUFFIX: &str = ".txt";

/// Result of cloning one project directory
#[derive(Debug, Clone, Default)]
pub struct CloneOutcome {
    /// Destination paths of the files copied, in walk order
    pub copied: Vec<PathBuf>,
    /// Bytes written into the clone tree
    pub bytes_copied: u64,
    /// Directories or files that could not be created or copied
    pub failures: Vec<SoftFailure>,
}

/// Destination of a cloned file: `dest/<rel_path><CLONE_SUFFIX>`
pub fn clone_target(dest: &Path, rel_path: &Path) -> PathBuf {
    let mut name = OsString::from(rel_path.as_os_str());
    name.push(CLONE_SUFFIX);
    dest.join(PathBuf::from(name))
}

struct CloneVisitor<'a> {
    dest: &'a Path,
    extensions: &'a [String],
    outcome: CloneOutcome,
}

impl CloneVisitor<'_> {
    fn record(&mut self, path: &Path, reason: String) {
        warn!("Clone failed for {}: {}", path.display(), reason);
        self.outcome.failures.push(SoftFailure {
            stage: FailureStage::Clone,
            path: path.to_path_buf(),
            reason,
        });
    }
}

impl Visitor for CloneVisitor<'_> {
    fn on_directory(&mut self, entry: &WalkEntry) {
        let target = self.dest.join(&entry.rel_path);
        if let Err(e) = fs::create_dir_all(&target) {
            self.record(&target, format!("could not create directory: {}", e));
        }
    }

    fn on_file(&mut self, entry: &WalkEntry) {
        if !matches_extension(&entry.file_name(), self.extensions) {
            return;
        }

        let target = clone_target(self.dest, &entry.rel_path);
        match fs::copy(&entry.path, &target) {
            Ok(bytes) => {
                self.outcome.bytes_copied += bytes;
                self.outcome.copied.push(target);
            }
            Err(e) => self.record(&entry.path, format!("could not copy file: {}", e)),
        }
    }

    fn on_error(&mut self, failure: SoftFailure) {
        self.outcome.failures.push(failure);
    }
}

/// Mirrors a project directory into a clone tree
pub struct Cloner<'a> {
    walker: &'a Walker<'a>,
    extensions: &'a [String],
}

impl<'a> Cloner<'a> {
    pub fn new(walker: &'a Walker<'a>, extensions: &'a [String]) -> Self {
        Self { walker, extensions }
    }

    /// Copy every matching file under `source` into `dest`, renamed with
    /// [`CLONE_SUFFIX`], creating the directory structure on the way.
    ///
    /// Per-entry failures are collected in the outcome; only failing to
    /// create `dest` itself or to resolve `source` is an error.
    pub fn clone(&self, source: &Path, dest: &Path) -> Result<CloneOutcome> {
        fs::create_dir_all(dest)?;

        let mut visitor = CloneVisitor {
            dest,
            extensions: self.extensions,
            outcome: CloneOutcome::default(),
        };
        self.walker.walk(source, Path::new(""), &mut visitor)?;

        Ok(visitor.outcome)
    }
}
