//! Perk offer data models.

use serde::{Deserialize, Serialize};

use crate::rules::{RuleKind, parse_offer_fields};

/// A single offer as captured by the vision model.
///
/// Deliberately carries no numeric fields: the extractor is only trusted
/// to transcribe text verbatim, and the rule engine derives every number
/// from that text afterwards. A non-conforming model response cannot
/// smuggle numbers past the parser because there is nowhere to put them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPerk {
    /// Brand/company name shown next to the offer.
    pub company_name: String,

    /// Exact offer headline text (verbatim).
    pub offer_text: String,

    /// Exact expiry text shown, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_text: Option<String>,

    /// Any other constraints shown (verbatim).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions_text: Option<String>,

    /// Capture confidence reported by the model (0.0 - 1.0).
    pub confidence: f64,
}

/// One extraction run over a single screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPerkBatch {
    /// Offers found in the screenshot.
    pub perks: Vec<RawPerk>,

    /// Batch-level confidence (0.0 - 1.0).
    pub overall_confidence: f64,
}

impl RawPerkBatch {
    /// Validate the batch against the schema constraints.
    ///
    /// Returns every violation found so a rejected response can be
    /// diagnosed in one pass. An empty result means the batch is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(0.0..=1.0).contains(&self.overall_confidence) {
            issues.push(format!(
                "overall_confidence out of range: {}",
                self.overall_confidence
            ));
        }

        for (i, perk) in self.perks.iter().enumerate() {
            if perk.company_name.trim().is_empty() {
                issues.push(format!("perk {}: empty company_name", i));
            }
            if perk.offer_text.trim().is_empty() {
                issues.push(format!("perk {}: empty offer_text", i));
            }
            if !(0.0..=1.0).contains(&perk.confidence) {
                issues.push(format!(
                    "perk {}: confidence out of range: {}",
                    i, perk.confidence
                ));
            }
        }

        issues
    }
}

/// Numeric fields derived from offer text by the rule engine.
///
/// At most the subset implied by the single rule that matched is
/// populated; an unmatched offer leaves all four absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferFields {
    /// Discount or cashback percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_value: Option<f64>,

    /// Spend threshold the offer requires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_spend: Option<f64>,

    /// Fixed cashback amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub money_back: Option<f64>,

    /// Upper bound on the cashback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_amount: Option<f64>,

    /// Which pattern rule produced these fields, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<RuleKind>,
}

impl OfferFields {
    /// True when no rule matched and all numeric fields are absent.
    pub fn is_empty(&self) -> bool {
        self.percentage_value.is_none()
            && self.minimum_spend.is_none()
            && self.money_back.is_none()
            && self.cap_amount.is_none()
    }
}

/// A perk with its numeric fields derived from the verbatim text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPerk {
    #[serde(flatten)]
    pub raw: RawPerk,

    #[serde(flatten)]
    pub fields: OfferFields,

    /// Provenance tag identifying the screenshot this came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ParsedPerk {
    /// Derive the numeric fields for a raw perk.
    pub fn from_raw(raw: RawPerk) -> Self {
        let fields = parse_offer_fields(&raw.offer_text, raw.conditions_text.as_deref());
        Self {
            raw,
            fields,
            source: None,
        }
    }

    /// Re-derive the numeric fields from the verbatim text.
    ///
    /// Always replaces the whole field set, so stale values from an
    /// earlier parse can never accumulate.
    pub fn reparse(&mut self) {
        self.fields = parse_offer_fields(&self.raw.offer_text, self.raw.conditions_text.as_deref());
    }
}

/// A fully parsed extraction run, ready for output or persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPerkBatch {
    pub perks: Vec<ParsedPerk>,
    pub overall_confidence: f64,
}
