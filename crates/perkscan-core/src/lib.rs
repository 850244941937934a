//! Core library for perk screenshot extraction.
//!
//! This crate provides:
//! - Data models for raw (untrusted) and parsed perk offers
//! - Rule-based offer field parsing (percentages, spend thresholds, caps)
//! - Content fingerprinting for deduplication
//! - Pipeline configuration

pub mod fingerprint;
pub mod models;
pub mod rules;

pub use fingerprint::perk_fingerprint;
pub use models::config::PerkscanConfig;
pub use models::perk::{OfferFields, ParsedPerk, ParsedPerkBatch, RawPerk, RawPerkBatch};
pub use rules::{RuleKind, parse_offer_fields};
