//! Categories command - list the catalog and selectable codes.

use clap::Args;
use console::style;

use faktag_core::classify::{CATEGORIES, CodeOption, GROUP_OPTIONS, MPK_OPTIONS};

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    /// List selectable MPK codes instead of categories
    #[arg(long, conflicts_with = "groups")]
    mpk: bool,

    /// List selectable group codes instead of categories
    #[arg(long)]
    groups: bool,

    /// Include keywords
    #[arg(short, long)]
    keywords: bool,
}

pub fn run(args: CategoriesArgs) -> anyhow::Result<()> {
    if args.mpk {
        print_options(MPK_OPTIONS);
        return Ok(());
    }
    if args.groups {
        print_options(GROUP_OPTIONS);
        return Ok(());
    }

    for category in CATEGORIES {
        println!(
            "{:<7} {:<5} {}",
            style(category.mpk).cyan(),
            category.group,
            category.name
        );
        if args.keywords {
            println!("              {}", style(category.keywords.join(", ")).dim());
        }
    }

    Ok(())
}

fn print_options(options: &[CodeOption]) {
    for option in options {
        println!("{:<7} {}", style(option.code).cyan(), option.description);
    }
}
