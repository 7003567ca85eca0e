/*!
 * Utility functions for srcbundle
 */

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::filter::PathFilter;
use crate::types::WalkEntry;
use crate::walker::{Visitor, Walker};

/// Default extensions used when the settings file does not name any
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".php", ".js", ".py", ".json"];

/// Whether a file name ends with any of the configured suffixes.
///
/// Matching is case-sensitive and purely textual: `.py` matches `main.py`
/// but not `main.PY`, and a bare `py` matches `happy`.
pub fn matches_extension(file_name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
}

/// Remove a folder with everything inside it and recreate it empty
pub fn clear_folder(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)
}

/// Resolve `.` and `..` segments without touching the filesystem.
///
/// Relative inputs are anchored at `base` first. `..` never climbs above the
/// filesystem root.
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute form of a path that may not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended, so symlinked parents resolve the same way as for existing paths.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let lexical = normalize_path(path, &std::env::current_dir()?);
    let mut tail = Vec::new();
    let mut current = lexical.as_path();
    loop {
        if let Ok(resolved) = fs::canonicalize(current) {
            return Ok(tail.iter().rev().fold(resolved, |acc: PathBuf, part| acc.join(part)));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                current = parent;
            }
            _ => return Ok(lexical),
        }
    }
}

struct CountVisitor {
    count: u64,
}

impl Visitor for CountVisitor {
    fn on_directory(&mut self, _entry: &WalkEntry) {
        self.count += 1;
    }

    fn on_file(&mut self, _entry: &WalkEntry) {
        self.count += 1;
    }
}

/// Count non-excluded entries (files and directories) for progress tracking
pub fn count_items(dir: &Path, filter: &PathFilter) -> u64 {
    let mut visitor = CountVisitor { count: 0 };
    match Walker::new(filter).walk(dir, Path::new(""), &mut visitor) {
        Ok(()) => visitor.count,
        Err(_) => 0,
    }
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_exact_suffix() {
        let exts = vec![".py".to_string(), ".json".to_string()];
        assert!(matches_extension("main.py", &exts));
        assert!(matches_extension("package.json", &exts));
        assert!(!matches_extension("main.PY", &exts));
        assert!(!matches_extension("main.pyc", &exts));
        assert!(!matches_extension("README.md", &exts));
    }

    #[test]
    fn normalize_resolves_dot_segments() {
        let base = Path::new("/scan");
        assert_eq!(
            normalize_path(Path::new("A/./src/../lib"), base),
            PathBuf::from("/scan/A/lib")
        );
        assert_eq!(
            normalize_path(Path::new("/x/y/../../.."), base),
            PathBuf::from("/")
        );
        assert_eq!(
            normalize_path(Path::new("/abs/path"), base),
            PathBuf::from("/abs/path")
        );
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }
}
