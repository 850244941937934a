//! Screenshot extraction pipeline.

use std::path::Path;

use tracing::{debug, info};

use perkscan_core::models::perk::{ParsedPerk, ParsedPerkBatch, RawPerkBatch};

use crate::{ExtractError, PerkExtractor, Result};

/// Run one screenshot through the extractor and the field rule engine.
///
/// Fails fast if the image does not resolve, rejects the whole batch on
/// any schema violation, and stamps every perk with the screenshot name
/// as provenance. Persists nothing; storing the result is a separate
/// downstream step composed by the caller.
pub async fn process_screenshot(
    extractor: &dyn PerkExtractor,
    image_path: &Path,
    model: &str,
    temperature: f64,
) -> Result<ParsedPerkBatch> {
    if !image_path.is_file() {
        return Err(ExtractError::ImageNotFound(
            image_path.display().to_string(),
        ));
    }

    info!("processing {}", image_path.display());
    let json_text = extractor.extract(image_path, model, temperature).await?;
    debug!(raw = %json_text, "extractor response");

    let batch: RawPerkBatch = serde_json::from_str(&json_text)
        .map_err(|e| ExtractError::MalformedResponse(e.to_string()))?;

    let issues = batch.validate();
    if !issues.is_empty() {
        return Err(ExtractError::MalformedResponse(issues.join("; ")));
    }

    let source = image_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned);

    let overall_confidence = batch.overall_confidence;
    let perks = batch
        .perks
        .into_iter()
        .map(|raw| {
            let mut perk = ParsedPerk::from_raw(raw);
            perk.source = source.clone();
            perk
        })
        .collect();

    Ok(ParsedPerkBatch {
        perks,
        overall_confidence,
    })
}
