//! VnLegal Core: errors, configuration, the legal block model and the LLM capability seam.

pub mod block;
pub mod capabilities;
pub mod config;
pub mod error;

pub use block::{
    is_valid_category, LegalBlock, CATEGORIES, DEFAULT_CATEGORY, DEFAULT_DEPARTMENT,
    TYPE_DATA_MARKDOWN,
};
pub use capabilities::{CategoryVerdict, ClassificationMethod, LlmCapability, NoopLlm};
pub use config::{DataPaths, SplitterSettings, VnLegalConfig};
pub use error::{Error, Result};
