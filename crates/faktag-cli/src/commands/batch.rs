//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use faktag_core::{InvoiceRecord, ProcessingOutcome};

use super::Settings;
use super::process::{csv_row, format_record, is_text_file, process_file, OutputFormat, CSV_HEADER};

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

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

enum FileStatus {
    Completed(InvoiceRecord),
    /// Vendor could not be classified; holds the vendor name.
    NeedsClassification(String),
    Failed(String),
}

impl FileStatus {
    fn name(&self) -> &'static str {
        match self {
            FileStatus::Completed(_) => "completed",
            FileStatus::NeedsClassification(_) => "needs_classification",
            FileStatus::Failed(_) => "failed",
        }
    }
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    status: FileStatus,
    processing_time_ms: u64,
}

const SUPPORTED: &[&str] = &["pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp", "txt"];

pub async fn run(args: BatchArgs, settings: &Settings) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = settings.load_config()?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            SUPPORTED.contains(&ext.to_lowercase().as_str())
        })
        .collect();

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

    let needs_ocr = files.iter().any(|p| !is_text_file(p));
    let pipeline = settings.pipeline(&config, needs_ocr)?;

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Sequential on purpose: numbers are allocated in file order.
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let status = match process_file(&pipeline, &path).await {
            Ok(ProcessingOutcome::Completed(record)) => FileStatus::Completed(record),
            Ok(ProcessingOutcome::NeedsClassification(pending)) => {
                warn!("{} needs manual classification", path.display());
                FileStatus::NeedsClassification(pending.fields.vendor_name)
            }
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                FileStatus::Failed(error_msg)
            }
        };

        results.push(FileResult {
            path,
            status,
            processing_time_ms: file_start.elapsed().as_millis() as u64,
        });
        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let FileStatus::Completed(record) = &result.status {
                let output_path = output_path(output_dir, &result.path, args.format);
                fs::write(&output_path, format_record(record, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let count = |name: &str| results.iter().filter(|r| r.status.name() == name).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} completed, {} need classification, {} failed",
        style(count("completed")).green(),
        style(count("needs_classification")).yellow(),
        style(count("failed")).red()
    );

    for result in &results {
        match &result.status {
            FileStatus::Completed(record) => {
                println!("  {} {} -> {}", style("✓").green(), result.path.display(), record.label)
            }
            FileStatus::NeedsClassification(vendor) => println!(
                "  {} {}: classify vendor {} with `faktag process --mpk --group`",
                style("!").yellow(),
                result.path.display(),
                vendor
            ),
            FileStatus::Failed(msg) => {
                println!("  {} {}: {}", style("✗").red(), result.path.display(), msg)
            }
        }
    }

    Ok(())
}

fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("invoice");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["file", "status", "error", "processingTimeMs"];
    header.extend(CSV_HEADER);
    wtr.write_record(&header)?;

    for result in results {
        let mut row = vec![
            result.path.display().to_string(),
            result.status.name().to_string(),
            match &result.status {
                FileStatus::Failed(msg) => msg.clone(),
                _ => String::new(),
            },
            result.processing_time_ms.to_string(),
        ];
        match &result.status {
            FileStatus::Completed(record) => row.extend(csv_row(record)),
            FileStatus::NeedsClassification(vendor) => {
                let mut empty = vec![String::new(); CSV_HEADER.len()];
                empty[0] = vendor.clone();
                row.extend(empty);
            }
            FileStatus::Failed(_) => row.extend(vec![String::new(); CSV_HEADER.len()]),
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
