//! Model-assisted extraction over a batch of PDFs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::info;

use invex_core::error::ExtractionError;
use invex_core::{
    InvexError, OpenAiClient, Orchestrator, Report, RetryPolicy, StructuredExtractor,
};

use super::common::{self, Failure, ProgressObserver};
use super::config;

/// Arguments for the model command.
#[derive(Args)]
pub struct ModelArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Number of concurrent model calls
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Directory for the CSV report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Model identifier (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Print the cleaned text sent to the model
    #[arg(long)]
    show_text: bool,

    /// Do not write a CSV report
    #[arg(long)]
    no_report: bool,
}

pub async fn run(args: ModelArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = config::load(config_path)?;
    if let Some(jobs) = args.jobs {
        config.batch.model_workers = jobs;
    }
    if let Some(model) = args.model {
        config.model.model = model;
    }

    let client = OpenAiClient::from_config(&config.model)?;
    info!("Using model {}", client.model());
    let extractor = StructuredExtractor::new(Arc::new(client))
        .with_retry(RetryPolicy::from_config(&config.model));

    let files = common::find_pdfs(&args.input)?;
    let (documents, mut failures) = common::load_documents(&files);

    let orchestrator = Orchestrator::from_config(&config);
    let progress = ProgressObserver::new(documents.len()).with_text(args.show_text);
    let outcome = orchestrator.run_model(documents, &extractor, &progress).await;
    progress.finish();

    for result in &outcome.results {
        println!("{} {}", style("✓").green(), result.filename);
        println!("{}", serde_json::to_string_pretty(&result.value)?);
    }

    for failure in &outcome.failures {
        let message = failure_message(&failure.filename, &failure.error);
        eprintln!("{} {}", style("✗").red(), message);
        failures.push(Failure {
            filename: failure.filename.clone(),
            message: failure.error.to_string(),
        });
    }

    if !args.no_report {
        let report = Report::from_invoice_results(&outcome.results);
        common::write_report(&report, &config, args.output_dir.as_deref());
    }

    common::print_summary(start, outcome.results.len(), &failures);
    Ok(())
}

/// Inline message for a document with no invoice record.
fn failure_message(filename: &str, error: &InvexError) -> String {
    match error {
        InvexError::Extraction(ExtractionError::UnparseableOutput { .. }) => format!(
            "Failed to extract data from invoice {} after multiple attempts.",
            filename
        ),
        InvexError::Extraction(ExtractionError::Model(e)) => {
            format!("Model call failed for invoice {}: {}", filename, e)
        }
        other => format!("Failed to read {}: {}", filename, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invex_core::error::{LlmError, PdfError};

    #[test]
    fn test_failure_message() {
        let err = InvexError::Extraction(ExtractionError::UnparseableOutput {
            attempts: 3,
            detail: "expected value".to_string(),
        });
        assert_eq!(
            failure_message("a.pdf", &err),
            "Failed to extract data from invoice a.pdf after multiple attempts."
        );

        let err = InvexError::Extraction(ExtractionError::Model(LlmError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        }));
        assert_eq!(
            failure_message("c.pdf", &err),
            "Model call failed for invoice c.pdf: endpoint returned 401: invalid api key"
        );

        let err = InvexError::Pdf(PdfError::NoPages);
        assert_eq!(
            failure_message("b.pdf", &err),
            "Failed to read b.pdf: PDF error: PDF has no pages"
        );
    }
}
