//! Process command - tag a single invoice file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use faktag_core::classify::catalog::{is_known_group, is_known_mpk};
use faktag_core::models::invoice::{CategoryCodes, InvoiceRecord};
use faktag_core::{InvoicePipeline, ProcessingOutcome, RawDocument};

use super::Settings;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// MPK code used when the vendor cannot be classified automatically
    #[arg(long, requires = "group")]
    mpk: Option<String>,

    /// Group code used when the vendor cannot be classified automatically
    #[arg(long, requires = "mpk")]
    group: Option<String>,

    /// Confirmed vendor name, remembered for the vendor NIP (with --mpk/--group)
    #[arg(long)]
    vendor_name: Option<String>,

    /// Client number appended to the label
    #[arg(long)]
    client_number: Option<String>,
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

pub async fn run(args: ProcessArgs, settings: &Settings) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = settings.load_config()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Processing...");

    let pipeline = settings.pipeline(&config, !is_text_file(&args.input))?;
    let outcome = process_file(&pipeline, &args.input).await;
    pb.finish_and_clear();

    let record = match outcome? {
        ProcessingOutcome::Completed(record) => record,
        ProcessingOutcome::NeedsClassification(pending) => {
            let (Some(mpk), Some(group)) = (args.mpk, args.group) else {
                eprintln!(
                    "{} Vendor {} could not be classified automatically",
                    style("!").yellow(),
                    pending.fields.vendor_name
                );
                if pending.suggestion.detected {
                    eprintln!(
                        "  Suggestion: {} {} - {} ({:.0}%)",
                        pending.suggestion.mpk_code,
                        pending.suggestion.group_code,
                        pending.suggestion.description,
                        pending.suggestion.confidence * 100.0
                    );
                }
                anyhow::bail!("Classification required: rerun with --mpk and --group");
            };

            if !is_known_mpk(&mpk) || !is_known_group(&group) {
                warn!("Codes {} {} are not in the catalog", mpk, group);
            }
            pipeline
                .complete_manual(pending, CategoryCodes::new(mpk, group), args.vendor_name)
                .await?
        }
    };

    let record = match args.client_number.as_deref() {
        Some(client) => pipeline.assign_client_number(record, client),
        None => record,
    };

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} written to {}",
            style("✓").green(),
            record.label,
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Run one file through the pipeline. Plain text files skip normalization.
pub async fn process_file(pipeline: &InvoicePipeline, path: &Path) -> anyhow::Result<ProcessingOutcome> {
    let file_name = path.file_name().and_then(|n| n.to_str());

    if is_text_file(path) {
        let text = fs::read_to_string(path)?;
        return Ok(pipeline.process_text(&text, file_name).await?);
    }

    let doc = RawDocument::from_path(path)?;
    Ok(pipeline.process(doc).await?)
}

/// Record columns in export order.
pub const CSV_HEADER: [&str; 15] = [
    "vendorName",
    "vendorNip",
    "buyerName",
    "buyerNip",
    "clientNumber",
    "invoiceNumber",
    "issueDate",
    "dueDate",
    "paymentMethod",
    "mpk",
    "group",
    "sequentialNumber",
    "label",
    "processedAt",
    "fileName",
];

pub fn csv_row(record: &InvoiceRecord) -> Vec<String> {
    vec![
        record.vendor_name.clone(),
        record.vendor_nip.clone().unwrap_or_default(),
        record.buyer_name.clone(),
        record.buyer_nip.clone(),
        record.client_number.clone().unwrap_or_default(),
        record.invoice_number.clone(),
        record.issue_date.clone().unwrap_or_default(),
        record.due_date.clone().unwrap_or_default(),
        record.payment_method.map(|m| m.label().to_string()).unwrap_or_default(),
        record.mpk.clone(),
        record.group.clone(),
        record.sequential_number.clone(),
        record.label.clone(),
        format_timestamp(record.processed_at),
        record.file_name.clone().unwrap_or_default(),
    ]
}

/// Render epoch milliseconds as RFC 3339 in UTC.
fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| millis.to_string())
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_row(record))?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Label: {}\n", record.label));
    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    if let Some(date) = &record.issue_date {
        output.push_str(&format!("Issued: {}\n", date));
    }
    output.push('\n');

    output.push_str("Vendor:\n");
    output.push_str(&format!("  {}\n", record.vendor_name));
    if let Some(nip) = &record.vendor_nip {
        output.push_str(&format!("  NIP: {}\n", nip));
    }
    output.push('\n');

    output.push_str("Buyer:\n");
    output.push_str(&format!("  {}\n", record.buyer_name));
    output.push_str(&format!("  NIP: {}\n", record.buyer_nip));
    output.push('\n');

    output.push_str(&format!("MPK:    {}\n", record.mpk));
    output.push_str(&format!("Group:  {}\n", record.group));
    output.push_str(&format!("Number: {}\n", record.sequential_number));

    if let Some(due) = &record.due_date {
        output.push_str(&format!("\nPayment due: {}\n", due));
    }
    if let Some(method) = record.payment_method {
        output.push_str(&format!("Payment method: {}\n", method));
    }
    output.push_str(&format!("Processed: {}\n", format_timestamp(record.processed_at)));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_timestamp(1_735_689_600_000), "2025-01-01T00:00:00Z");
    }

    #[test]
    fn test_text_file_detection() {
        assert!(is_text_file(Path::new("invoice.TXT")));
        assert!(!is_text_file(Path::new("invoice.pdf")));
    }
}
