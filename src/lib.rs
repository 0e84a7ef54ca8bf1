//! # Clinical Trials MCP
//!
//! A Model Context Protocol (MCP) server for fetching and searching clinical
//! trials from the EU CTIS registry (euclinicaltrials.eu) and
//! ClinicalTrials.gov, with model-assisted relevance ranking of search
//! results.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (NormalizedTrialRecord, TrialSearchRequest, etc.)
//! - [`registries`]: HTTP clients for the two upstream registries
//! - [`parsers`]: Record extraction and text rendering
//! - [`search`]: Relevance-ranking search orchestration
//! - [`llm`]: Anthropic Messages API call wrapper
//! - [`mcp`]: MCP protocol implementation and server
//! - [`utils`]: Shared HTTP client
//! - [`config`]: Configuration management

pub mod config;
pub mod llm;
pub mod mcp;
pub mod models;
pub mod parsers;
pub mod registries;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use models::{NormalizedTrialRecord, TrialSearchRequest};
pub use search::RelevanceSearch;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
