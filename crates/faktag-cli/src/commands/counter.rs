//! Counter command - inspect and reset per-buyer sequential numbers.

use clap::{Args, Subcommand};
use console::style;

use faktag_core::SequenceAssigner;

use super::Settings;

/// Arguments for the counter command.
#[derive(Args)]
pub struct CounterArgs {
    #[command(subcommand)]
    command: CounterCommand,
}

#[derive(Subcommand)]
enum CounterCommand {
    /// Show the last allocated number of a buyer
    Show {
        /// Buyer NIP
        nip: String,
    },

    /// Set the last allocated number; the next invoice gets this plus one
    Reset {
        /// Buyer NIP
        nip: String,
        /// New last number
        #[arg(default_value = "0")]
        last_number: u32,
    },
}

pub async fn run(args: CounterArgs, settings: &Settings) -> anyhow::Result<()> {
    let config = settings.load_config()?;
    let store = settings.open_store(&config)?;
    let sequence = SequenceAssigner::new(store, &config.sequence);

    match args.command {
        CounterCommand::Show { nip } => match sequence.current(&nip).await? {
            Some(state) => println!(
                "Buyer {}: last number {} ({})",
                nip, state.last_number, state.year
            ),
            None => println!(
                "{} Buyer {} has no numbers allocated yet",
                style("ℹ").blue(),
                nip
            ),
        },
        CounterCommand::Reset { nip, last_number } => {
            sequence.reset_counter(&nip, last_number).await?;
            println!(
                "{} Counter for {} reset, next number is {}",
                style("✓").green(),
                nip,
                last_number + 1
            );
        }
    }

    Ok(())
}
