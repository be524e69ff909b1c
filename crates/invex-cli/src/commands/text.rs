//! Print the text extracted from a single PDF.

use std::path::PathBuf;

use clap::Args;
use console::style;

use invex_core::{Document, PdfTextExtractor, TextExtractor, clean_text};

use super::config;

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Collapse whitespace as the model path does
    #[arg(long)]
    clean: bool,
}

pub async fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("File not found: {}", args.input.display());
    }

    let doc = Document::from_path(&args.input)?;
    let extractor = PdfTextExtractor::new().with_fallback(config.pdf.fallback_extractor);
    let extracted = extractor.extract(&doc.bytes)?;

    eprintln!(
        "{} {} ({} pages)",
        style("ℹ").blue(),
        doc.filename,
        extracted.page_count
    );

    if args.clean {
        println!("{}", clean_text(&extracted.text));
    } else {
        print!("{}", extracted.text);
    }
    Ok(())
}
