/*!
 * Configuration handling for srcbundle
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BundleError, Result};
use crate::utils::{absolute_path, DEFAULT_EXTENSIONS};
use crate::{bail, ensure};

/// Settings file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Durable log file used when `--log-file` is not given
pub const DEFAULT_LOG_FILE: &str = "module_errors.log";

/// Command-line arguments for srcbundle
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "srcbundle",
    version = env!("CARGO_PKG_VERSION"),
    about = "Bundle project folders into text manifests, renamed clones and zip archives",
    long_about = "For every folder inside the scan folder, writes a text manifest of its hierarchy and file contents, a cloned tree where each matching file gets an extra .txt suffix, and a zip archive of that clone."
)]
pub struct Args {
    /// Settings file (JSON)
    #[clap(long)]
    pub config: Option<String>,

    /// Folder containing the project folders to process
    #[clap(long)]
    pub scan: Option<String>,

    /// Output folder for manifests, clones and archives (cleared on every run)
    #[clap(long)]
    pub out: Option<String>,

    /// Comma-separated list of file name suffixes to process
    #[clap(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Comma-separated list of paths to exclude (absolute or relative to the scan folder)
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// File that receives the durable run log
    #[clap(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: String,

    /// Log debug details
    #[clap(short, long)]
    pub verbose: bool,

    /// Write the effective settings back to the settings file
    #[clap(long)]
    pub save_config: bool,

    /// Do not draw a progress bar
    #[clap(long)]
    pub no_progress: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Persisted settings, stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File name suffixes to process
    pub extensions: Vec<String>,
    /// Folder containing the project folders
    pub scan_folder: PathBuf,
    /// Output folder
    pub clone_folder: PathBuf,
    /// Excluded paths
    pub exclude: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            scan_folder: PathBuf::from("scan"),
            clone_folder: PathBuf::from("clone"),
            exclude: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => bail!(
                Config,
                "Cannot read settings file {}: {}",
                path.display(),
                e
            ),
        };
        serde_json::from_str(&text).map_err(|e| {
            BundleError::Config(format!("Invalid settings file {}: {}", path.display(), e))
        })
    }

    /// Load settings, falling back to defaults when the file is absent.
    ///
    /// A missing file is only tolerated when `required` is false.
    pub fn load_or_default(path: &Path, required: bool) -> Result<Self> {
        if !required && !path.exists() {
            info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded settings
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(scan) = &args.scan {
            self.scan_folder = PathBuf::from(scan);
        }
        if let Some(out) = &args.out {
            self.clone_folder = PathBuf::from(out);
        }

        let extensions = clean_list(&args.extensions);
        if !extensions.is_empty() {
            self.extensions = extensions;
        }

        let exclude = clean_list(&args.exclude);
        if !exclude.is_empty() {
            self.exclude = exclude.into_iter().map(PathBuf::from).collect();
        }
    }

    /// Settings file path selected by the arguments
    pub fn path_from_args(args: &Args) -> PathBuf {
        PathBuf::from(args.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE))
    }

    /// Load the settings file named by `args` and apply the overrides
    pub fn resolve(args: &Args) -> Result<Self> {
        let path = Self::path_from_args(args);
        let mut settings = Self::load_or_default(&path, args.config.is_some())?;
        settings.apply_args(args);
        Ok(settings)
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Immutable configuration snapshot for one run
#[derive(Clone, Debug)]
pub struct Config {
    /// File name suffixes that make a file "matching"
    pub extensions: Vec<String>,

    /// Folder whose immediate subfolders are the projects
    pub scan_root: PathBuf,

    /// Folder that receives manifests, clone trees and archives
    pub output_root: PathBuf,

    /// Paths excluded from every pass
    pub exclude: Vec<PathBuf>,
}

impl Config {
    /// Create configuration from resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            extensions: settings.extensions.clone(),
            scan_root: settings.scan_folder.clone(),
            output_root: settings.clone_folder.clone(),
            exclude: settings.exclude.clone(),
        }
    }

    /// Validate the configuration.
    ///
    /// The scan root is allowed to be missing here; the pipeline reports that
    /// as a fatal run error.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.extensions.is_empty(),
            Config,
            "At least one extension must be configured"
        );
        ensure!(
            self.extensions.iter().all(|e| !e.is_empty()),
            Config,
            "Extensions must not be empty strings"
        );

        let scan = absolute_path(&self.scan_root)?;
        let out = absolute_path(&self.output_root)?;
        ensure!(
            !out.starts_with(&scan) && !scan.starts_with(&out),
            Config,
            "Output folder {} and scan folder {} must not contain each other",
            self.output_root.display(),
            self.scan_root.display()
        );

        Ok(())
    }
}

