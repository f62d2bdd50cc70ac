//! Batch processing command for multiple OCR text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use rcpt_core::{ExtractedReceipt, ReceiptExtractor, ReceiptLedger, TextSource};

use super::extract::{build_extractor, format_receipt, OcrTextInput, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV and per-category totals
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Use keyword rules only, without the remote categorizer
    #[arg(long)]
    no_remote: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    receipt: Option<ExtractedReceipt>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let extractor = build_extractor(config_path, args.no_remote)?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("txt")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &extractor).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(receipt) => {
                if let Some(ref output_dir) = args.output_dir {
                    write_output(&path, &receipt, output_dir, args.format)?;
                }
                results.push(ProcessResult {
                    path,
                    receipt: Some(receipt),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        receipt: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    let succeeded = results.iter().filter(|r| r.receipt.is_some()).count();
    let failed = results.len() - succeeded;

    println!(
        "{} Processed {} files ({} ok, {} failed) in {:.1}s",
        style("✓").green(),
        results.len(),
        succeeded,
        failed,
        start.elapsed().as_secs_f64()
    );

    if args.summary {
        let summary_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let summary_path = summary_dir.join("summary.csv");
        write_summary(&results, &summary_path)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );

        print_category_totals(&results);
    }

    Ok(())
}

async fn process_single_file(path: &Path, extractor: &ReceiptExtractor) -> anyhow::Result<ExtractedReceipt> {
    let text = OcrTextInput::File(path.to_path_buf()).read_text()?;
    debug!("Read {} characters from {}", text.len(), path.display());

    Ok(extractor.extract(&text).await)
}

fn write_output(
    path: &Path,
    receipt: &ExtractedReceipt,
    output_dir: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    fs::write(&output_path, format_receipt(receipt, format)?)?;
    Ok(())
}

fn write_summary(results: &[ProcessResult], path: &Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "merchant",
        "date",
        "total",
        "category",
        "error",
        "processing_time_ms",
    ])?;

    for result in results {
        let file = result.path.display().to_string();
        let time = result.processing_time_ms.to_string();

        match &result.receipt {
            Some(r) => wtr.write_record([
                file.as_str(),
                "ok",
                r.merchant.as_str(),
                r.date.as_str(),
                r.total.as_str(),
                r.category.as_str(),
                "",
                time.as_str(),
            ])?,
            None => wtr.write_record([
                file.as_str(),
                "error",
                "",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
                time.as_str(),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

fn print_category_totals(results: &[ProcessResult]) {
    let mut ledger = ReceiptLedger::new();
    for receipt in results.iter().filter_map(|r| r.receipt.clone()) {
        ledger.save(receipt);
    }

    println!();
    println!("{}", style("Totals by category:").bold());
    for (category, total) in ledger.category_totals() {
        println!("  {:<20} {:>12.2}", category, total);
    }
    println!("  {:<20} {:>12.2}", "All", ledger.grand_total());
}
