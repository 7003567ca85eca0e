/*!
 * Command-line interface for srcbundle
 */

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use srcbundle::config::{Args, Config, Settings};
use srcbundle::pipeline::{Pipeline, PipelineEvent};
use srcbundle::report::{ReportFormat, Reporter};
use srcbundle::types::RunSummary;

/// Run finished but some files or folders failed
const EXIT_PARTIAL: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "srcbundle", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = setup_logging(Path::new(&args.log_file), args.verbose) {
        eprintln!("Warning: Failed to open log file {}: {}", args.log_file, e);
    }

    match run(args) {
        Ok(summary) if summary.has_failures() => ExitCode::from(EXIT_PARTIAL),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> srcbundle::Result<RunSummary> {
    // Resolve settings file + overrides into one immutable snapshot
    let settings = Settings::resolve(&args)?;
    let config = Config::from_settings(&settings);
    config.validate()?;

    if args.save_config {
        settings.save(&Settings::path_from_args(&args))?;
    }

    info!(
        "Starting run: scan={} out={} extensions={:?} exclude={:?}",
        config.scan_root.display(),
        config.output_root.display(),
        config.extensions,
        config.exclude
    );

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ⏱️  {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 Setup");

    // Pipeline runs on a worker; this thread only renders its events
    let (tx, rx) = mpsc::channel::<PipelineEvent>();
    let worker = thread::spawn(move || Pipeline::new(config, tx).run());

    for event in rx {
        match event {
            PipelineEvent::Log(line) => progress.println(line),
            PipelineEvent::ProjectStarted { name, total_steps } => {
                progress.set_length(total_steps);
                progress.set_position(0);
                progress.set_prefix(format!("📁 {}", name));
            }
            PipelineEvent::Advance => progress.inc(1),
            PipelineEvent::Finished(_) => progress.set_prefix("✅ Done"),
        }
    }
    progress.finish_and_clear();

    let summary = match worker.join() {
        Ok(result) => result?,
        Err(_) => {
            return Err(srcbundle::error!(Unexpected, "Pipeline worker panicked"));
        }
    };

    Reporter::new(ReportFormat::ConsoleTable).print_report(&summary);
    for failure in &summary.failures {
        eprintln!("Warning: {}", failure);
    }

    Ok(summary)
}

fn setup_logging(log_file: &Path, verbose: bool) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("srcbundle=debug,warn")
        } else {
            EnvFilter::new("srcbundle=info,warn")
        }
    });

    // Ignore a second initialisation attempt
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(())
}
