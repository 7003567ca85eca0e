/*!
 * Run orchestration: manifest, clone and archive for every project folder
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::archiver::Archiver;
use crate::cloner::Cloner;
use crate::config::Config;
use crate::error::{BundleError, Result};
use crate::filter::PathFilter;
use crate::manifest::ManifestBuilder;
use crate::types::{FailureStage, ProjectReport, RunSummary, SoftFailure, WalkEntry};
use crate::utils::{clear_folder, count_items, matches_extension};
use crate::walker::{Visitor, Walker};

/// Events emitted by a running pipeline, in order
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Human readable status line
    Log(String),
    /// A project folder is about to be processed
    ProjectStarted {
        /// Project folder name
        name: String,
        /// Entries the three traversal passes will visit
        total_steps: u64,
    },
    /// One traversal entry was processed
    Advance,
    /// The run completed
    Finished(RunSummary),
}

/// Receiver side of the pipeline's one-way event stream
pub trait EventSink {
    fn emit(&self, event: PipelineEvent);
}

impl EventSink for Sender<PipelineEvent> {
    fn emit(&self, event: PipelineEvent) {
        // A closed receiver only means nobody is listening any more
        let _ = self.send(event);
    }
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

/// What one project produced before statistics are gathered
struct ProjectRun {
    name: String,
    path: PathBuf,
    elapsed: Duration,
    archive: Option<PathBuf>,
    failures: Vec<SoftFailure>,
}

/// Counts matching files and their sizes for run statistics
struct StatsVisitor<'a> {
    extensions: &'a [String],
    files: usize,
    bytes: u64,
}

impl Visitor for StatsVisitor<'_> {
    fn on_directory(&mut self, _entry: &WalkEntry) {}

    fn on_file(&mut self, entry: &WalkEntry) {
        if !matches_extension(&entry.file_name(), self.extensions) {
            return;
        }
        self.files += 1;
        match fs::metadata(&entry.path) {
            Ok(metadata) => self.bytes += metadata.len(),
            Err(e) => warn!("Cannot stat {}: {}", entry.path.display(), e),
        }
    }
}

/// Drives one run over every project folder of the scan root
pub struct Pipeline<S: EventSink> {
    config: Config,
    sink: S,
}

impl<S: EventSink> Pipeline<S> {
    /// Create a pipeline for an immutable configuration snapshot
    pub fn new(config: Config, sink: S) -> Self {
        Self { config, sink }
    }

    fn log(&self, message: String) {
        self.sink.emit(PipelineEvent::Log(message));
    }

    /// Execute the run.
    ///
    /// Errors returned from here are fatal to the whole run. Failures inside
    /// one project folder are recorded in the summary instead.
    pub fn run(&self) -> Result<RunSummary> {
        let started_at = Local::now();
        let start = Instant::now();

        // Must hold before clearing, or the output root could take sources with it
        self.config.validate()?;

        let output_root = &self.config.output_root;
        clear_folder(output_root)?;
        info!("Cleared output folder {}", output_root.display());
        self.log(format!("Folder '{}' cleared.", output_root.display()));

        let scan_root = &self.config.scan_root;
        if !scan_root.is_dir() {
            error!("Scan folder '{}' not found", scan_root.display());
            return Err(BundleError::ScanRootMissing(scan_root.clone()));
        }

        let filter = PathFilter::new(&self.config.exclude, scan_root);
        let projects = list_projects(scan_root)?;

        if projects.is_empty() {
            info!("No project folders in {}", scan_root.display());
            self.log(format!(
                "Folder '{}' has no folders to process.",
                scan_root.display()
            ));
        }

        Ok(self.process_projects(&filter, projects, started_at, start))
    }

    /// Process prepared project folders in order and emit the summary.
    ///
    /// Expects the output root to exist; nothing here clears it.
    pub(crate) fn process_projects(
        &self,
        filter: &PathFilter,
        projects: Vec<(String, PathBuf)>,
        started_at: DateTime<Local>,
        start: Instant,
    ) -> RunSummary {
        let mut runs = Vec::with_capacity(projects.len());
        for (name, path) in projects {
            if filter.is_entry_excluded(&path, path.is_symlink()) {
                info!("Project {} is excluded", name);
                self.log(format!("Skipping excluded folder: {}", name));
                continue;
            }

            self.log(format!("Processing folder: {}", name));
            let project_start = Instant::now();
            let mut failures = Vec::new();
            let archive = match self.process_project(&name, &path, filter, &mut failures) {
                Ok(archive) => archive,
                Err(e) => {
                    error!("Processing {} failed: {}", name, e);
                    self.log(format!("Processing folder {} failed: {}", name, e));
                    failures.push(SoftFailure {
                        stage: FailureStage::Project,
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    None
                }
            };

            runs.push(ProjectRun {
                name,
                path,
                elapsed: project_start.elapsed(),
                archive,
                failures,
            });
        }

        let summary = self.summarize(started_at, start, filter, runs);
        info!(
            "Run finished: {} files, {} bytes, {:.3}s",
            summary.files_processed,
            summary.total_bytes,
            summary.elapsed_seconds()
        );
        self.log("Processing complete.".to_string());
        self.sink.emit(PipelineEvent::Finished(summary.clone()));

        summary
    }

    /// Manifest, clone and archive one project; returns the archive path.
    ///
    /// Errors end this project only. An archive failure is recorded and
    /// yields `None` without discarding the manifest and clone.
    fn process_project(
        &self,
        name: &str,
        path: &Path,
        filter: &PathFilter,
        failures: &mut Vec<SoftFailure>,
    ) -> Result<Option<PathBuf>> {
        let output_root = &self.config.output_root;
        let extensions = &self.config.extensions;

        self.sink.emit(PipelineEvent::ProjectStarted {
            name: name.to_string(),
            total_steps: count_items(path, filter) * 3,
        });

        let tick = || self.sink.emit(PipelineEvent::Advance);
        let walker = Walker::new(filter).with_tick(&tick);

        let manifest_path = output_root.join(format!("{}.txt", name));
        let manifest = ManifestBuilder::new(&walker, extensions).write(path, name, &manifest_path)?;
        info!(
            "{}: manifest with {} files written to {}",
            name,
            manifest.content_files.len(),
            manifest_path.display()
        );
        self.log(format!(
            "Hierarchy and file contents saved to {}",
            manifest_path.display()
        ));
        self.report_failures(&manifest.failures);
        failures.extend(manifest.failures);

        let clone_root = output_root.join(name);
        let cloned = Cloner::new(&walker, extensions).clone(path, &clone_root)?;
        info!(
            "{}: cloned {} files ({} bytes)",
            name,
            cloned.copied.len(),
            cloned.bytes_copied
        );
        self.log(format!("Cloned folder saved to '{}'", clone_root.display()));
        // Listing failures were already reported by the manifest passes
        let clone_failures: Vec<SoftFailure> = cloned
            .failures
            .into_iter()
            .filter(|f| f.stage != FailureStage::Walk)
            .collect();
        self.report_failures(&clone_failures);
        failures.extend(clone_failures);

        let archive_path = output_root.join(format!("{}.zip", name));
        match Archiver::new().archive(&clone_root, &archive_path, output_root) {
            Ok(outcome) => {
                info!("{}: archive with {} entries", name, outcome.entries.len());
                self.log(format!("ZIP archive created: {}", archive_path.display()));
                Ok(Some(archive_path))
            }
            Err(e) => {
                error!("{}: archive failed: {}", name, e);
                self.log(format!("ZIP archive for {} failed: {}", name, e));
                failures.push(SoftFailure {
                    stage: FailureStage::Archive,
                    path: archive_path,
                    reason: e.to_string(),
                });
                Ok(None)
            }
        }
    }

    fn report_failures(&self, failures: &[SoftFailure]) {
        for failure in failures {
            self.log(format!("Warning: {}", failure));
        }
    }

    /// Gather statistics from fresh walks over the original project folders
    fn summarize(
        &self,
        started_at: DateTime<Local>,
        start: Instant,
        filter: &PathFilter,
        runs: Vec<ProjectRun>,
    ) -> RunSummary {
        let walker = Walker::new(filter);
        let mut projects = Vec::with_capacity(runs.len());
        let mut failures = Vec::new();

        for run in runs {
            let mut stats = StatsVisitor {
                extensions: &self.config.extensions,
                files: 0,
                bytes: 0,
            };
            if let Err(e) = walker.walk(&run.path, Path::new(""), &mut stats) {
                warn!("Statistics walk of {} failed: {}", run.path.display(), e);
            }

            projects.push(ProjectReport {
                name: run.name,
                files: stats.files,
                bytes: stats.bytes,
                elapsed: run.elapsed,
                soft_failures: run.failures.len(),
                archive: run.archive,
            });
            failures.extend(run.failures);
        }

        RunSummary {
            started_at,
            elapsed: start.elapsed(),
            files_processed: projects.iter().map(|p| p.files).sum(),
            total_bytes: projects.iter().map(|p| p.bytes).sum(),
            output_root: self.config.output_root.clone(),
            projects,
            failures,
        }
    }
}

/// Immediate subdirectories of the scan root as absolute paths, sorted by name
pub(crate) fn list_projects(scan_root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let root = fs::canonicalize(scan_root)?;
    let mut projects = Vec::new();
    for entry in fs::read_dir(&root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            projects.push((entry.file_name().to_string_lossy().to_string(), path));
        }
    }
    projects.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(projects)
}
