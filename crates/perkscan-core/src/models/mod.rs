//! Data models for the perk extraction pipeline.

pub mod config;
pub mod perk;
