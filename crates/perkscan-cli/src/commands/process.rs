//! Process command - extract perks from a single screenshot.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use perkscan_core::models::perk::ParsedPerkBatch;
use perkscan_extract::{OllamaExtractor, process_screenshot};
use perkscan_store::PerkStore;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input screenshot (PNG or JPEG)
    #[arg(required = true)]
    input: PathBuf,

    /// Model to extract with (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature, 0 = deterministic (overrides config)
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Upsert the extracted perks into the store
    #[arg(long)]
    save: bool,

    /// Show extraction confidence
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.extractor.model.clone());
    let temperature = args.temperature.unwrap_or(config.extractor.temperature);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Extracting perks with {}...", model));
    pb.enable_steady_tick(Duration::from_millis(100));

    let extractor = OllamaExtractor::new(&config.extractor.base_url);
    let batch = match process_screenshot(&extractor, &args.input, &model, temperature).await {
        Ok(batch) => batch,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    pb.finish_with_message("Done");

    // Format output
    let output = format_batch(&batch, args.format)?;

    // Write output
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

    if args.save {
        let store = PerkStore::connect(&config.store.database_url).await?;
        let summary = store.upsert_batch(&batch).await;
        println!(
            "{} Saved: {} inserted, {} updated",
            style("✓").green(),
            summary.inserted,
            summary.updated
        );
        if summary.failed > 0 {
            println!(
                "{} {} perks failed to save",
                style("⚠").yellow(),
                summary.failed
            );
        }
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Overall confidence: {:.1}%",
            style("ℹ").blue(),
            batch.overall_confidence * 100.0
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_batch(batch: &ParsedPerkBatch, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(batch)?),
        OutputFormat::Text => Ok(format_text(batch)),
    }
}

fn format_text(batch: &ParsedPerkBatch) -> String {
    let mut output = String::new();

    for perk in &batch.perks {
        output.push_str(&format!(
            "- {}: {}\n",
            perk.raw.company_name, perk.raw.offer_text
        ));

        let fields = &perk.fields;
        if let Some(pct) = fields.percentage_value {
            output.push_str(&format!("    percentage: {}%\n", pct));
        }
        if let Some(spend) = fields.minimum_spend {
            output.push_str(&format!("    minimum spend: £{}\n", spend));
        }
        if let Some(back) = fields.money_back {
            output.push_str(&format!("    money back: £{}\n", back));
        }
        if let Some(cap) = fields.cap_amount {
            output.push_str(&format!("    cap: £{}\n", cap));
        }
        if let Some(expiry) = &perk.raw.expiry_text {
            output.push_str(&format!("    expires: {}\n", expiry));
        }
    }

    if batch.perks.is_empty() {
        output.push_str("No perks found.\n");
    }

    output
}
