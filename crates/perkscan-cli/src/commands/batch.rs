//! Batch command - process multiple screenshots.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use perkscan_core::models::perk::ParsedPerkBatch;
use perkscan_extract::{OllamaExtractor, process_screenshot};
use perkscan_store::{PerkStore, UpsertSummary};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Model to extract with (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature, 0 = deterministic (overrides config)
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Output directory for per-file JSON results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Upsert all extracted perks into the store
    #[arg(long)]
    save: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single screenshot.
struct FileResult {
    path: PathBuf,
    batch: Option<ParsedPerkBatch>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg" | "webp")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} screenshots to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.extractor.model.clone());
    let temperature = args.temperature.unwrap_or(config.extractor.temperature);
    let extractor = OllamaExtractor::new(&config.extractor.base_url);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        match process_screenshot(&extractor, &path, &model, temperature).await {
            Ok(batch) => {
                results.push(FileResult {
                    path: path.clone(),
                    batch: Some(batch),
                    error: None,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path: path.clone(),
                        batch: None,
                        error: Some(error_msg),
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.batch.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    // Write per-file outputs
    if let Some(ref output_dir) = args.output_dir {
        for result in &successful {
            if let Some(batch) = &result.batch {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("perks");
                let output_path = output_dir.join(format!("{}.json", output_name));
                fs::write(&output_path, serde_json::to_string_pretty(batch)?)?;
            }
        }
    }

    // Save all extracted perks in one pass
    if args.save {
        let store = PerkStore::connect(&config.store.database_url).await?;
        let mut total = UpsertSummary::default();

        for result in &successful {
            if let Some(batch) = &result.batch {
                let summary = store.upsert_batch(batch).await;
                total.inserted += summary.inserted;
                total.updated += summary.updated;
                total.failed += summary.failed;
            }
        }

        println!(
            "{} Saved: {} inserted, {} updated",
            style("✓").green(),
            total.inserted,
            total.updated
        );
        if total.failed > 0 {
            println!(
                "{} {} perks failed to save",
                style("⚠").yellow(),
                total.failed
            );
        }
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} screenshots in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}
