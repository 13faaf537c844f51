//! # scholarlens
//!
//! Bibliometric classification engine for Scholar profiles.
//!
//! ## Modules
//!
//! - [`registry`] - Journal/conference → domain registry (bulk or fallback, plus overrides)
//! - [`resolver`] - Fuzzy venue → domain matching
//! - [`keywords`] - Title/venue keyword fallback classifier
//! - [`aggregate`] - Weighted domain distribution over a profile
//! - [`authorship`] - Owner author position and role statistics
//! - [`citations`] - h-index, i10-index and citation summaries
//! - [`enrichment`] - Optional Semantic Scholar field-of-study boosts
//! - [`analysis`] - Full profile report
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholarlens::{analysis::ProfileAnalyzer, config::EngineConfig, loader, publication};
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::load(None)?;
//!     let registry = Arc::new(loader::build_registry(&config.data, &config.matching));
//!     let profile = publication::load_profile("profile.json".as_ref(), None)?;
//!     let report = ProfileAnalyzer::new(registry, config).analyze(&profile);
//!     println!("Primary domain: {:?}", report.research_areas.primary);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod analysis;
pub mod authorship;
pub mod citations;
pub mod collaboration;
pub mod conferences;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod error;
pub mod keywords;
pub mod loader;
pub mod productivity;
pub mod publication;
pub mod registry;
pub mod resolver;
pub mod subjects;
pub mod venue_kind;

pub use error::{Result, ScholarError};
