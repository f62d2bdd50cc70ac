//! Extract command - extract fields from a single receipt's OCR text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rcpt_core::{ExtractedReceipt, RcptError, ReceiptExtractor, TextSource};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR text file, or "-" to read from stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use keyword rules only, without the remote categorizer
    #[arg(long)]
    no_remote: bool,

    /// Print extraction warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// OCR text read from a file or stdin.
pub enum OcrTextInput {
    File(PathBuf),
    Stdin,
}

impl TextSource for OcrTextInput {
    fn read_text(&self) -> rcpt_core::Result<String> {
        match self {
            OcrTextInput::File(path) => Ok(fs::read_to_string(path)?),
            OcrTextInput::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                if text.trim().is_empty() {
                    return Err(RcptError::Upstream("no text on stdin".to_string()));
                }
                Ok(text)
            }
        }
    }
}

/// Build an extractor from the loaded configuration.
pub fn build_extractor(config_path: Option<&str>, no_remote: bool) -> anyhow::Result<ReceiptExtractor> {
    let mut config = load_config(config_path)?;
    if no_remote {
        config.remote.enabled = false;
    }

    Ok(ReceiptExtractor::from_config(&config)?)
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let extractor = build_extractor(config_path, args.no_remote)?;

    let source = if args.input == "-" {
        OcrTextInput::Stdin
    } else {
        let path = PathBuf::from(&args.input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        info!("Processing file: {}", path.display());
        OcrTextInput::File(path)
    };

    let result = extractor.extract_from_source_detailed(&source).await;

    if args.show_warnings {
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
    }

    let output = format_receipt(&result.receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_receipt(receipt: &ExtractedReceipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
    }
}

fn format_csv(receipt: &ExtractedReceipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["merchant", "date", "total", "category"])?;
    wtr.write_record([
        &receipt.merchant,
        &receipt.date,
        &receipt.total,
        &receipt.category,
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &ExtractedReceipt) -> String {
    fn or_dash(value: &str) -> &str {
        if value.is_empty() { "-" } else { value }
    }

    let mut output = String::new();

    output.push_str(&format!("Merchant: {}\n", or_dash(&receipt.merchant)));
    output.push_str(&format!("Date:     {}\n", or_dash(&receipt.date)));
    output.push_str(&format!("Total:    {}\n", or_dash(&receipt.total)));
    output.push_str(&format!("Category: {}\n", receipt.category));

    output
}
