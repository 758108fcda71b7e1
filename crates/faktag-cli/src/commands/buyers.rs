//! Buyers command - remember confirmed buyers for NIP correction.

use clap::{Args, Subcommand};
use console::style;

use faktag_core::store::BuyerStore;
use faktag_core::InvoicePipeline;

use super::Settings;

/// Arguments for the buyers command.
#[derive(Args)]
pub struct BuyersArgs {
    #[command(subcommand)]
    command: BuyersCommand,
}

#[derive(Subcommand)]
enum BuyersCommand {
    /// List remembered buyers
    List,

    /// Remember a buyer
    Add {
        /// Buyer NIP
        nip: String,
        /// Buyer name as printed on invoices
        name: String,
        /// Buyer address
        #[arg(short, long, default_value = "")]
        address: String,
    },
}

pub async fn run(args: BuyersArgs, settings: &Settings) -> anyhow::Result<()> {
    let config = settings.load_config()?;
    let store = settings.open_store(&config)?;

    match args.command {
        BuyersCommand::List => {
            let buyers = store.list_buyers().await?;
            if buyers.is_empty() {
                println!("{} No buyers remembered yet", style("ℹ").blue());
            }
            for buyer in buyers {
                println!("{}  {}  {}", style(&buyer.nip).cyan(), buyer.name, buyer.address);
            }
        }
        BuyersCommand::Add { nip, name, address } => {
            let pipeline = InvoicePipeline::with_store(&config, store);
            pipeline.remember_buyer(&nip, &name, &address).await?;
            println!("{} Remembered {} as {}", style("✓").green(), name, nip);
        }
    }

    Ok(())
}
