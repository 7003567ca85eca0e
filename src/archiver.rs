/*!
 * Zip packaging of finished clone trees
 */

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path};

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::bail;
use crate::error::{Result, ResultExt};

/// Result of archiving one clone tree
#[derive(Debug, Clone, Default)]
pub struct ArchiveOutcome {
    /// Entry names written, in order
    pub entries: Vec<String>,
}

/// Archive entry name for `path` relative to `base`, using `/` separators
pub fn entry_name(path: &Path, base: &Path) -> Result<String> {
    let rel = match path.strip_prefix(base) {
        Ok(rel) => rel,
        Err(_) => bail!(
            Archive,
            "{} is not inside {}",
            path.display(),
            base.display()
        ),
    };

    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

/// Writes DEFLATE-compressed zip archives
#[derive(Debug, Clone, Copy, Default)]
pub struct Archiver;

impl Archiver {
    pub fn new() -> Self {
        Self
    }

    /// Pack everything under `source_dir` into `archive_path`.
    ///
    /// Entry names are relative to `path_base`, so archiving
    /// `out/A` with base `out` yields entries like `A/src/main.py.txt`.
    /// Directories get their own entries so empty ones survive extraction.
    /// A partially written archive is removed on failure.
    pub fn archive(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        path_base: &Path,
    ) -> Result<ArchiveOutcome> {
        let result = self.write_archive(source_dir, archive_path, path_base);
        if result.is_err() && archive_path.exists() {
            if let Err(e) = fs::remove_file(archive_path) {
                warn!("Could not remove partial archive {}: {}", archive_path.display(), e);
            }
        }
        result
    }

    fn write_archive(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        path_base: &Path,
    ) -> Result<ArchiveOutcome> {
        let file = File::create(archive_path)
            .with_context(|| format!("Failed to create {}", archive_path.display()))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut outcome = ArchiveOutcome::default();

        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry?;
            let name = entry_name(entry.path(), path_base)?;
            if name.is_empty() {
                continue;
            }

            if entry.file_type().is_dir() {
                zip.add_directory(format!("{}/", name), options)?;
                outcome.entries.push(format!("{}/", name));
            } else if entry.file_type().is_file() {
                zip.start_file(name.clone(), options)?;
                let mut source = File::open(entry.path())
                    .with_context(|| format!("Failed to open {}", entry.path().display()))?;
                io::copy(&mut source, &mut zip)
                    .with_context(|| format!("Failed to compress {}", entry.path().display()))?;
                outcome.entries.push(name);
            }
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        debug!(
            "Wrote {} entries to {}",
            outcome.entries.len(),
            archive_path.display()
        );
        Ok(outcome)
    }
}
