/*!
 * End-to-end test of a run through the public API
 */

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use tempfile::tempdir;

use srcbundle::{Config, Pipeline, PipelineEvent, ReportFormat, Reporter};

#[test]
fn test_background_run_with_report() {
    let temp_dir = tempdir().unwrap();
    let scan = temp_dir.path().join("scan");
    fs::create_dir_all(scan.join("shop").join("api")).unwrap();
    fs::create_dir_all(scan.join("shop").join("vendor")).unwrap();
    fs::write(scan.join("shop").join("index.php"), "<?php echo 1;").unwrap();
    fs::write(scan.join("shop").join("api").join("routes.js"), "export {}").unwrap();
    fs::write(scan.join("shop").join("vendor").join("lib.js"), "// vendored").unwrap();
    fs::create_dir_all(scan.join("tool")).unwrap();
    fs::write(scan.join("tool").join("run.py"), "print(1)\n").unwrap();

    let config = Config {
        extensions: vec![".php".to_string(), ".js".to_string(), ".py".to_string()],
        scan_root: scan.clone(),
        output_root: temp_dir.path().join("clone"),
        exclude: vec![scan.join("shop").join("vendor")],
    };
    let out = config.output_root.clone();

    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || Pipeline::new(config, tx).run());
    let events: Vec<PipelineEvent> = rx.iter().collect();
    let summary = worker.join().unwrap().unwrap();

    let started: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::ProjectStarted { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec!["shop", "tool"]);

    assert!(out.join("shop.txt").exists());
    assert!(out.join("tool.zip").exists());
    assert!(out.join("shop").join("api").join("routes.js.txt").exists());
    assert!(!out.join("shop").join("vendor").exists());

    let manifest = fs::read_to_string(out.join("shop.txt")).unwrap();
    assert!(manifest.contains("``` shop/index.php\n<?php echo 1;\n```"));
    assert!(!manifest.contains("vendor"));

    assert_eq!(summary.files_processed, 3);
    assert_eq!(
        summary.projects.iter().map(|p| p.files).collect::<Vec<_>>(),
        vec![2, 1]
    );
    assert_eq!(
        summary.projects[1].archive,
        Some(PathBuf::from(out.join("tool.zip")))
    );

    let report = Reporter::new(ReportFormat::ConsoleTable).generate_report(&summary);
    assert!(report.contains("PROCESSING COMPLETE"));
    assert!(report.contains("shop"));
    assert!(report.contains("tool.zip"));
}
