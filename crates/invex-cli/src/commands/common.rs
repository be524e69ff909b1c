//! Helpers shared by the extraction commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use invex_core::{BatchObserver, Document, InvexConfig, InvexError, Report, ReportWriter};

/// Expand a glob pattern to the PDF files it matches.
pub fn find_pdfs(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("pdf")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", pattern);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );
    Ok(files)
}

/// A document that never reached the pipeline, or failed in it.
pub struct Failure {
    pub filename: String,
    pub message: String,
}

/// Read every file; unreadable ones are reported as failures.
pub fn load_documents(files: &[PathBuf]) -> (Vec<Document>, Vec<Failure>) {
    let mut documents = Vec::with_capacity(files.len());
    let mut failures = Vec::new();

    for path in files {
        match Document::from_path(path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                failures.push(Failure {
                    filename: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    (documents, failures)
}

/// Progress bar driven by batch notifications.
pub struct ProgressObserver {
    bar: ProgressBar,
    show_text: bool,
}

impl ProgressObserver {
    /// Progress bar sized for `total` documents.
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self {
            bar,
            show_text: false,
        }
    }

    /// Print the cleaned text of each document above the bar.
    pub fn with_text(mut self, show_text: bool) -> Self {
        self.show_text = show_text;
        self
    }

    /// Clear the bar once the batch is done.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BatchObserver for ProgressObserver {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_document_start(&self, filename: &str) {
        self.bar.set_message(format!("Processing {}...", filename));
    }

    fn on_text_extracted(&self, filename: &str, text: &str) {
        if self.show_text {
            self.bar
                .println(format!("{} {}\n{}\n", style("ℹ").blue(), filename, text));
        }
    }

    fn on_document_complete(&self, _filename: &str) {
        self.bar.inc(1);
    }

    fn on_document_failed(&self, filename: &str, error: &InvexError) {
        debug!("{} failed: {}", filename, error);
        self.bar.inc(1);
    }
}

/// Write the report where the config (or `--output-dir`) says.
///
/// A failure is printed and swallowed; results were already shown.
pub fn write_report(report: &Report, config: &InvexConfig, output_dir: Option<&Path>) {
    let dir = output_dir.unwrap_or(config.report.output_dir.as_path());

    let written = std::fs::create_dir_all(dir)
        .map_err(anyhow::Error::from)
        .and_then(|_| {
            ReportWriter::new()
                .write_to_dir(report, dir, &config.report.file_prefix)
                .map_err(anyhow::Error::from)
        });

    match written {
        Ok(path) => println!(
            "{} Report with {} rows written to {}",
            style("✓").green(),
            report.len(),
            path.display()
        ),
        Err(e) => eprintln!("{} Failed to write report: {}", style("✗").red(), e),
    }
}

/// Final counts and the list of failed files.
pub fn print_summary(start: Instant, succeeded: usize, failures: &[Failure]) {
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        succeeded + failures.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(succeeded).green(),
        style(failures.len()).red()
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in failures {
            println!("  - {}: {}", failure.filename, failure.message);
        }
    }
}
