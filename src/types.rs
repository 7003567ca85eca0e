/*!
 * Core types and data structures for the srcbundle pipeline
 */

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};

/// A non-excluded entry handed to a walker visitor
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the walk root, prefixed with the walk's relative prefix
    pub rel_path: PathBuf,
    /// Nesting level below the walk root (direct children are 0)
    pub depth: usize,
}

impl WalkEntry {
    /// Final component of the entry's path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// Outcome of reading a matching file as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRead {
    /// File decoded successfully
    Text(String),
    /// File could not be read or decoded; carries the reason
    Failed(String),
}

/// Which pipeline step recorded a soft failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Listing a directory during any traversal
    Walk,
    /// Reading or decoding a file for the manifest
    Manifest,
    /// Copying a file into the clone tree
    Clone,
    /// Packaging a clone tree
    Archive,
    /// Any other per-project step (manifest file creation, etc.)
    Project,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Walk => "walk",
            FailureStage::Manifest => "manifest",
            FailureStage::Clone => "clone",
            FailureStage::Archive => "archive",
            FailureStage::Project => "project",
        };
        f.write_str(name)
    }
}

/// An error confined to one file or one project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    /// Step that produced the failure
    pub stage: FailureStage,
    /// Path the failure concerns
    pub path: PathBuf,
    /// Human readable reason
    pub reason: String,
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.path.display(), self.reason)
    }
}

/// Per-project result of one run
#[derive(Debug, Clone)]
pub struct ProjectReport {
    /// Project directory name
    pub name: String,
    /// Matching files found under the project
    pub files: usize,
    /// Total size of those files in bytes
    pub bytes: u64,
    /// Wall time spent on the project
    pub elapsed: Duration,
    /// Number of soft failures recorded for the project
    pub soft_failures: usize,
    /// Path of the written archive, if the archive step succeeded
    pub archive: Option<PathBuf>,
}

/// Aggregate result of one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Local time the run started
    pub started_at: DateTime<Local>,
    /// Wall time of the whole run
    pub elapsed: Duration,
    /// Total matching files across all projects
    pub files_processed: usize,
    /// Total bytes of matching files across all projects
    pub total_bytes: u64,
    /// Output root the artifacts were written to
    pub output_root: PathBuf,
    /// Per-project details in processing order
    pub projects: Vec<ProjectReport>,
    /// Every soft failure recorded during the run
    pub failures: Vec<SoftFailure>,
}

impl RunSummary {
    /// Elapsed wall time in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Whether any soft failure happened during the run
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
