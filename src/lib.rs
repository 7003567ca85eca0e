/*!
 * srcbundle - Bundle project folders for sharing or offline review
 *
 * For every project folder under a scan root this library writes a text
 * manifest (hierarchy plus file contents), a cloned tree where each matching
 * file carries an extra `.txt` suffix, and a zip archive of that clone.
 */

pub mod archiver;
pub mod cloner;
pub mod config;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;
pub mod walker;


// Re-export main components for easier access
pub use archiver::Archiver;
pub use cloner::{Cloner, CLONE_SUFFIX};
pub use config::{Args, Config, Settings};
pub use error::{BundleError, Result};
pub use filter::PathFilter;
pub use manifest::{Manifest, ManifestBuilder};
pub use pipeline::{EventSink, NullSink, Pipeline, PipelineEvent};
pub use report::{ReportFormat, Reporter};
pub use types::{ProjectReport, RunSummary, SoftFailure, TextRead, WalkEntry};
pub use utils::{count_items, format_file_size};
pub use walker::{Visitor, Walker};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
