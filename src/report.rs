/*!
 * Reporting functionality for srcbundle
 *
 * Renders the completion summary of a run as console tables using the
 * tabled library.
 */

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::RunSummary;
use crate::utils::format_file_size;

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for run summaries
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string for a finished run
    pub fn generate_report(&self, summary: &RunSummary) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(summary),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, summary: &RunSummary) {
        println!("\n{}", self.generate_report(summary));
    }

    fn style(table: &mut Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_projects_table(&self, summary: &RunSummary) -> String {
        #[derive(Tabled)]
        struct ProjectRow {
            #[tabled(rename = "Folder")]
            name: String,

            #[tabled(rename = "Files")]
            files: String,

            #[tabled(rename = "Size")]
            size: String,

            #[tabled(rename = "Time")]
            time: String,

            #[tabled(rename = "Warnings")]
            warnings: String,

            #[tabled(rename = "Archive")]
            archive: String,
        }

        let rows: Vec<ProjectRow> = summary
            .projects
            .iter()
            .map(|project| ProjectRow {
                name: project.name.clone(),
                files: self.format_number(project.files),
                size: format_file_size(project.bytes),
                time: format!("{:.2?}", project.elapsed),
                warnings: project.soft_failures.to_string(),
                archive: match &project.archive {
                    Some(path) => path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string(),
                    None => "failed".to_string(),
                },
            })
            .collect();

        Self::style(&mut Table::new(rows))
    }

    fn create_summary_table(&self, summary: &RunSummary) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📂 Output Folder".to_string(),
                value: summary.output_root.display().to_string(),
            },
            SummaryRow {
                key: "🕒 Started".to_string(),
                value: summary.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.2} s", summary.elapsed_seconds()),
            },
            SummaryRow {
                key: "📄 Files Processed".to_string(),
                value: self.format_number(summary.files_processed),
            },
            SummaryRow {
                key: "📦 Total Size".to_string(),
                value: format_file_size(summary.total_bytes),
            },
            SummaryRow {
                key: "⚠️ Warnings".to_string(),
                value: summary.failures.len().to_string(),
            },
        ];

        Self::style(&mut Table::new(rows))
    }

    fn generate_console_report(&self, summary: &RunSummary) -> String {
        let summary_table = self.create_summary_table(summary);
        let summary_title = if summary.has_failures() {
            "⚠️  COMPLETED WITH WARNINGS"
        } else {
            "✅  PROCESSING COMPLETE"
        };

        if summary.projects.is_empty() {
            return format!("{}\n{}", summary_title, summary_table);
        }

        format!(
            "📋  PROCESSED FOLDERS\n{}\n\n{}\n{}",
            self.create_projects_table(summary),
            summary_title,
            summary_table
        )
    }
}
