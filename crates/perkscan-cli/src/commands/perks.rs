//! Perks command - query the store from the terminal.

use clap::{Args, Subcommand};
use console::style;

use perkscan_store::{PerkStore, StoredPerk};

/// Arguments for the perks command.
#[derive(Args)]
pub struct PerksArgs {
    #[command(subcommand)]
    command: PerksCommand,

    /// Database URL (overrides config)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Output as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum PerksCommand {
    /// List all stored perks, newest first
    List,

    /// Show one perk by id
    Show {
        /// Perk id
        id: i64,
    },

    /// List perks for companies matching a name substring
    Company {
        /// Company name substring (case-insensitive)
        name: String,
    },

    /// Show aggregate statistics
    Stats,
}

pub async fn run(args: PerksArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let database_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| config.store.database_url.clone());

    let store = PerkStore::connect(&database_url).await?;

    match args.command {
        PerksCommand::List => {
            let perks = store.list_all().await?;
            print_perks(&perks, args.json)?;
        }
        PerksCommand::Show { id } => match store.get(id).await? {
            Some(perk) => print_perks(std::slice::from_ref(&perk), args.json)?,
            None => anyhow::bail!("Perk {} not found", id),
        },
        PerksCommand::Company { name } => {
            let perks = store.find_by_company(&name).await?;
            print_perks(&perks, args.json)?;
        }
        PerksCommand::Stats => {
            let stats = store.stats().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total perks:      {}", stats.total_perks);
                println!("Unique companies: {}", stats.unique_companies);
                for company in &stats.companies {
                    println!("  - {}", company);
                }
            }
        }
    }

    Ok(())
}

fn print_perks(perks: &[StoredPerk], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(perks)?);
        return Ok(());
    }

    if perks.is_empty() {
        println!("{} No perks found.", style("ℹ").blue());
        return Ok(());
    }

    for perk in perks {
        println!(
            "{} {} {}",
            style(format!("#{}", perk.id)).dim(),
            style(&perk.company_name).bold(),
            perk.offer_text
        );

        let mut fields = Vec::new();
        if let Some(pct) = perk.percentage_value {
            fields.push(format!("{}%", pct));
        }
        if let Some(spend) = perk.minimum_spend {
            fields.push(format!("min spend £{}", spend));
        }
        if let Some(back) = perk.money_back {
            fields.push(format!("£{} back", back));
        }
        if let Some(cap) = perk.cap_amount {
            fields.push(format!("cap £{}", cap));
        }
        if !fields.is_empty() {
            println!("    {}", fields.join(", "));
        }
        if let Some(expiry) = &perk.expiry_text {
            println!("    expires: {}", expiry);
        }
    }

    Ok(())
}
