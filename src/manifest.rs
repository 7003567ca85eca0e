/*!
 * Text manifest assembly: directory hierarchy followed by file contents
 */

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{FailureStage, SoftFailure, TextRead, WalkEntry};
use crate::utils::matches_extension;
use crate::walker::{Visitor, Walker};

/// A fully assembled manifest for one project directory
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Complete manifest text
    pub text: String,
    /// Files listed in the hierarchy section, in order
    pub hierarchy_files: Vec<PathBuf>,
    /// Files with a block in the contents section, in order
    pub content_files: Vec<PathBuf>,
    /// Files that could not be read or decoded
    pub failures: Vec<SoftFailure>,
}

/// Read a file and decode it as UTF-8
pub fn read_text(path: &Path) -> TextRead {
    match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => TextRead::Text(text),
            Err(e) => TextRead::Failed(format!("could not decode as UTF-8: {}", e.utf8_error())),
        },
        Err(e) => TextRead::Failed(format!("could not read file: {}", e)),
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Emits one line per directory and per matching file
pub struct HierarchyVisitor<'a> {
    extensions: &'a [String],
    out: String,
    files: Vec<PathBuf>,
    failures: Vec<SoftFailure>,
}

impl<'a> HierarchyVisitor<'a> {
    pub fn new(extensions: &'a [String]) -> Self {
        Self {
            extensions,
            out: String::new(),
            files: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl Visitor for HierarchyVisitor<'_> {
    fn on_directory(&mut self, entry: &WalkEntry) {
        self.out.push_str(&format!(
            "{}[DIR]  {}{}\n",
            indent(entry.depth),
            entry.rel_path.display(),
            MAIN_SEPARATOR
        ));
    }

    fn on_file(&mut self, entry: &WalkEntry) {
        if !matches_extension(&entry.file_name(), self.extensions) {
            return;
        }
        self.out.push_str(&format!(
            "{}[FILE] {}\n",
            indent(entry.depth),
            entry.rel_path.display()
        ));
        self.files.push(entry.rel_path.clone());
    }

    fn on_error(&mut self, failure: SoftFailure) {
        self.failures.push(failure);
    }
}

/// Emits one fenced block per matching file
pub struct ContentVisitor<'a> {
    extensions: &'a [String],
    out: String,
    files: Vec<PathBuf>,
    failures: Vec<SoftFailure>,
}

impl<'a> ContentVisitor<'a> {
    pub fn new(extensions: &'a [String]) -> Self {
        Self {
            extensions,
            out: String::new(),
            files: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl Visitor for ContentVisitor<'_> {
    fn on_directory(&mut self, _entry: &WalkEntry) {}

    fn on_file(&mut self, entry: &WalkEntry) {
        if !matches_extension(&entry.file_name(), self.extensions) {
            return;
        }

        let read = read_text(&entry.path);
        if let TextRead::Failed(reason) = &read {
            warn!("Could not include {}: {}", entry.path.display(), reason);
            self.failures.push(SoftFailure {
                stage: FailureStage::Manifest,
                path: entry.path.clone(),
                reason: reason.clone(),
            });
        }

        self.out.push_str(&render_block(&entry.rel_path, &read));
        self.files.push(entry.rel_path.clone());
    }

    fn on_error(&mut self, failure: SoftFailure) {
        self.failures.push(failure);
    }
}

/// Length of the longest run of backticks in `text`
fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Render one contents-section block.
///
/// The fence is always longer than any backtick run in the body, so file
/// contents can never close the block early.
pub fn render_block(rel_path: &Path, read: &TextRead) -> String {
    let body = match read {
        TextRead::Text(text) => text.clone(),
        TextRead::Failed(reason) => format!("[error: {}]", reason),
    };
    let fence = "`".repeat((longest_backtick_run(&body) + 1).max(3));

    let mut block = format!("{} {}\n", fence, rel_path.display());
    block.push_str(&body);
    if !body.is_empty() && !body.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(&fence);
    block.push_str("\n\n");
    block
}

/// Builds the manifest for a project from two independent walks
pub struct ManifestBuilder<'a> {
    walker: &'a Walker<'a>,
    extensions: &'a [String],
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(walker: &'a Walker<'a>, extensions: &'a [String]) -> Self {
        Self { walker, extensions }
    }

    /// Walk `project_dir` twice: once for the hierarchy, once for contents.
    ///
    /// Relative paths are prefixed with `name`, so entries read `name/src/...`.
    pub fn build(&self, project_dir: &Path, name: &str) -> Result<Manifest> {
        let prefix = Path::new(name);

        let mut hierarchy = HierarchyVisitor::new(self.extensions);
        self.walker.walk(project_dir, prefix, &mut hierarchy)?;
        debug!("{}: hierarchy lists {} files", name, hierarchy.files.len());

        let mut contents = ContentVisitor::new(self.extensions);
        self.walker.walk(project_dir, prefix, &mut contents)?;
        debug!("{}: contents hold {} files", name, contents.files.len());

        let mut text = format!("Directory structure of {}:\n", name);
        text.push_str(&hierarchy.out);
        text.push_str(&format!("\nFile contents of {}:\n\n", name));
        text.push_str(&contents.out);

        // Listing failures are identical in both passes; keep one copy
        let mut failures = hierarchy.failures;
        failures.extend(
            contents
                .failures
                .into_iter()
                .filter(|f| f.stage != FailureStage::Walk),
        );

        Ok(Manifest {
            text,
            hierarchy_files: hierarchy.files,
            content_files: contents.files,
            failures,
        })
    }

    /// Build the manifest and write it to `output_file` as UTF-8
    pub fn write(&self, project_dir: &Path, name: &str, output_file: &Path) -> Result<Manifest> {
        let manifest = self.build(project_dir, name)?;
        fs::write(output_file, manifest.text.as_bytes())?;
        Ok(manifest)
    }
}
