//! Rule-based offer field parsing.
//!
//! Offer phrasing is matched against a precedence-ordered table of
//! pattern rules. Order encodes specificity: the structured multi-token
//! patterns run before the single-token fallbacks they contain, and the
//! first matching rule wins outright. Unmatched text is a normal
//! outcome, not an error.

pub mod patterns;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::perk::OfferFields;
use patterns::{
    CAPPED_PERCENTAGE, CASHBACK_AMOUNT, GENERIC_PERCENTAGE, SAVE_PERCENTAGE, SPEND_THRESHOLD,
};

/// Identifies which pattern rule produced a field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// "Spend £X or more, get £Y back"
    SpendThreshold,
    /// "Get X% back up to £Y"
    CappedPercentage,
    /// "SAVE X%"
    SavePercentage,
    /// Any bare percent mention.
    GenericPercentage,
    /// "Get £X back" without a spend threshold.
    CashbackAmount,
}

type RuleFn = fn(&str) -> Option<OfferFields>;

/// Precedence-ordered rule table. New phrasings slot in here without
/// touching the control flow below.
const RULE_TABLE: &[(RuleKind, RuleFn)] = &[
    (RuleKind::SpendThreshold, match_spend_threshold),
    (RuleKind::CappedPercentage, match_capped_percentage),
    (RuleKind::SavePercentage, match_save_percentage),
    (RuleKind::GenericPercentage, match_generic_percentage),
    (RuleKind::CashbackAmount, match_cashback_amount),
];

/// Collapse whitespace runs to a single space, trim, lowercase.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Strip thousands separators and convert a matched amount to f64.
fn to_amount(s: &str) -> Option<f64> {
    s.replace(',', "").trim().parse().ok()
}

/// Derive structured numeric fields from offer and condition text.
///
/// Pure and deterministic. Always builds a fresh field set, so running
/// it again over the same text can never accumulate stale values.
pub fn parse_offer_fields(offer_text: &str, conditions_text: Option<&str>) -> OfferFields {
    let offer = normalize(offer_text);
    let conds = normalize(conditions_text.unwrap_or(""));
    let buffer = format!("{offer} {conds}");
    let text = buffer.trim();

    for (kind, rule) in RULE_TABLE {
        if let Some(mut fields) = rule(text) {
            fields.matched_rule = Some(*kind);
            trace!(rule = ?kind, "offer pattern matched");
            return fields;
        }
    }

    OfferFields::default()
}

fn match_spend_threshold(text: &str) -> Option<OfferFields> {
    let caps = SPEND_THRESHOLD.captures(text)?;
    Some(OfferFields {
        minimum_spend: to_amount(&caps[1]),
        money_back: to_amount(&caps[2]),
        ..Default::default()
    })
}

fn match_capped_percentage(text: &str) -> Option<OfferFields> {
    let caps = CAPPED_PERCENTAGE.captures(text)?;
    Some(OfferFields {
        percentage_value: to_amount(&caps[1]),
        cap_amount: to_amount(&caps[2]),
        ..Default::default()
    })
}

fn match_save_percentage(text: &str) -> Option<OfferFields> {
    let caps = SAVE_PERCENTAGE.captures(text)?;
    Some(OfferFields {
        percentage_value: to_amount(&caps[1]),
        ..Default::default()
    })
}

fn match_generic_percentage(text: &str) -> Option<OfferFields> {
    let caps = GENERIC_PERCENTAGE.captures(text)?;
    Some(OfferFields {
        percentage_value: to_amount(&caps[1]),
        ..Default::default()
    })
}

fn match_cashback_amount(text: &str) -> Option<OfferFields> {
    let caps = CASHBACK_AMOUNT.captures(text)?;
    Some(OfferFields {
        money_back: to_amount(&caps[1]),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(offer: &str) -> OfferFields {
        parse_offer_fields(offer, None)
    }

    #[test]
    fn spend_threshold_cashback() {
        let fields = parse("Spend £100 or more, get £10 back");
        assert_eq!(fields.minimum_spend, Some(100.0));
        assert_eq!(fields.money_back, Some(10.0));
        assert_eq!(fields.percentage_value, None);
        assert_eq!(fields.cap_amount, None);
        assert_eq!(fields.matched_rule, Some(RuleKind::SpendThreshold));
    }

    #[test]
    fn capped_percentage_cashback() {
        let fields = parse("Get 20% back every time up to £200");
        assert_eq!(fields.percentage_value, Some(20.0));
        assert_eq!(fields.cap_amount, Some(200.0));
        assert_eq!(fields.minimum_spend, None);
        assert_eq!(fields.money_back, None);
        assert_eq!(fields.matched_rule, Some(RuleKind::CappedPercentage));
    }

    #[test]
    fn save_percentage() {
        let fields = parse("SAVE 9%");
        assert_eq!(fields.percentage_value, Some(9.0));
        assert_eq!(fields.minimum_spend, None);
        assert_eq!(fields.money_back, None);
        assert_eq!(fields.cap_amount, None);
        assert_eq!(fields.matched_rule, Some(RuleKind::SavePercentage));
    }

    #[test]
    fn generic_percentage_fallback() {
        let fields = parse("10% off your first order");
        assert_eq!(fields.percentage_value, Some(10.0));
        assert_eq!(fields.matched_rule, Some(RuleKind::GenericPercentage));
    }

    #[test]
    fn bare_cashback_amount() {
        let fields = parse("Get £10 back");
        assert_eq!(fields.money_back, Some(10.0));
        assert_eq!(fields.percentage_value, None);
        assert_eq!(fields.minimum_spend, None);
        assert_eq!(fields.cap_amount, None);
        assert_eq!(fields.matched_rule, Some(RuleKind::CashbackAmount));
    }

    #[test]
    fn no_pattern_is_a_valid_outcome() {
        let fields = parse("Earn rewards on purchases");
        assert!(fields.is_empty());
        assert_eq!(fields.matched_rule, None);
    }

    #[test]
    fn spend_threshold_wins_over_generic_percentage() {
        // Contains both a spend-threshold phrasing and a bare percent
        // mention; only rule A may fire.
        let fields = parse("Spend £50 or more, get £5 back plus 10% off accessories");
        assert_eq!(fields.matched_rule, Some(RuleKind::SpendThreshold));
        assert_eq!(fields.minimum_spend, Some(50.0));
        assert_eq!(fields.money_back, Some(5.0));
        assert_eq!(fields.percentage_value, None);
    }

    #[test]
    fn save_wins_over_generic_percentage() {
        let fields = parse("SAVE 9% plus 5% on top");
        assert_eq!(fields.matched_rule, Some(RuleKind::SavePercentage));
        assert_eq!(fields.percentage_value, Some(9.0));
    }

    #[test]
    fn thousands_separators_are_stripped() {
        let fields = parse("Get £1,200.50 back");
        assert_eq!(fields.money_back, Some(1200.50));
    }

    #[test]
    fn conditions_text_joins_the_search_buffer() {
        let fields = parse_offer_fields("Cashback offer", Some("Get 20% back up to £200"));
        assert_eq!(fields.percentage_value, Some(20.0));
        assert_eq!(fields.cap_amount, Some(200.0));
    }

    #[test]
    fn pattern_may_span_offer_and_conditions() {
        let fields = parse_offer_fields("Get 15% back", Some("up to £75 per quarter"));
        assert_eq!(fields.matched_rule, Some(RuleKind::CappedPercentage));
        assert_eq!(fields.percentage_value, Some(15.0));
        assert_eq!(fields.cap_amount, Some(75.0));
    }

    #[test]
    fn matching_is_case_and_whitespace_insensitive() {
        let a = parse("SPEND  £100   or more,\nget £10 back");
        let b = parse("spend £100 or more, get £10 back");
        assert_eq!(a, b);
    }

    #[test]
    fn parsing_is_deterministic() {
        let a = parse("Get 20% back every time up to £200");
        let b = parse("Get 20% back every time up to £200");
        assert_eq!(a, b);
    }

    #[test]
    fn fractional_percentages_parse() {
        let fields = parse("SAVE 9.5%");
        assert_eq!(fields.percentage_value, Some(9.5));
    }
}
