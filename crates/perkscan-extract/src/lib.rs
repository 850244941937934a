//! Vision-model extraction layer for perkscan.
//!
//! This crate provides:
//! - `PerkExtractor`, the seam over the vision-model invocation
//! - `OllamaExtractor`, a chat-API implementation of that seam
//! - `process_screenshot`, the pipeline orchestrating one image through
//!   extraction, validation, and the field rule engine

mod error;
mod extractor;
mod pipeline;

pub use error::{ExtractError, Result};
pub use extractor::{OllamaExtractor, PerkExtractor};
pub use pipeline::process_screenshot;
