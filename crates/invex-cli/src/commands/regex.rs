//! Regex extraction over a batch of PDFs.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;

use invex_core::{Orchestrator, Report};

use super::common::{self, Failure, ProgressObserver};
use super::config;

/// Arguments for the regex command.
#[derive(Args)]
pub struct RegexArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Directory for the CSV report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Attach per-page layout notes to each result
    #[arg(long)]
    layout: bool,

    /// Do not write a CSV report
    #[arg(long)]
    no_report: bool,
}

pub async fn run(args: RegexArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = config::load(config_path)?;
    if let Some(jobs) = args.jobs {
        config.batch.regex_workers = jobs;
    }
    if args.layout {
        config.pdf.annotate_pages = true;
    }

    let files = common::find_pdfs(&args.input)?;
    let (documents, mut failures) = common::load_documents(&files);

    let orchestrator = Orchestrator::from_config(&config);
    let progress = ProgressObserver::new(documents.len());
    let outcome = orchestrator.run_regex(documents, &progress).await;
    progress.finish();

    for result in &outcome.results {
        println!("{} {}", style("✓").green(), result.filename);
        println!(
            "{}",
            serde_json::to_string_pretty(&result.value.fields.to_display_map())?
        );
        if let Some(notes) = &result.value.layout_notes {
            for line in notes.lines() {
                println!("  {}", style(line).dim());
            }
        }
    }

    failures.extend(outcome.failures.iter().map(|f| Failure {
        filename: f.filename.clone(),
        message: f.error.to_string(),
    }));

    if !args.no_report {
        let report = Report::from_field_results(&outcome.results);
        common::write_report(&report, &config, args.output_dir.as_deref());
    }

    common::print_summary(start, outcome.results.len(), &failures);
    Ok(())
}
