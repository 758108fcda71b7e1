//! Classify command - dry-run vendor classification.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use faktag_core::Classifier;

use super::Settings;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Vendor name
    #[arg(required = true)]
    vendor: String,

    /// Invoice text file scored together with the vendor name
    #[arg(short, long)]
    text: Option<PathBuf>,

    /// Print the match as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ClassifyArgs, settings: &Settings) -> anyhow::Result<()> {
    let config = settings.load_config()?;
    let classifier = Classifier::new(&config.classification);

    let text = match &args.text {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };

    let result = classifier.detect(&args.vendor, &text);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.detected {
        println!("{} No category detected for {}", style("!").yellow(), args.vendor);
        return Ok(());
    }

    let decision = if classifier.is_confident(&result) {
        style("auto-assign").green()
    } else {
        style("needs confirmation").yellow()
    };

    println!("MPK:         {}", result.mpk_code);
    println!("Group:       {}", result.group_code);
    println!("Category:    {}", result.description);
    println!("Confidence:  {:.0}% ({})", result.confidence * 100.0, decision);

    Ok(())
}
