//! Registry clients for the two upstream trial databases.
//!
//! Each client is a thin HTTP wrapper returning raw [`serde_json::Value`]
//! payloads; all reshaping happens in [`crate::parsers`]. Base URLs are
//! overridable so tests can point a client at a mock server.

mod ctgov;
mod ctis;

pub use ctgov::{CtGovClient, CtGovPage, CtGovSearchParams, CTGOV_PAGE_SIZE};
pub use ctis::{CtisClient, CtisSearchCriteria, CTIS_PAGE_SIZE};

/// Errors that can occur when talking to a registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the registry
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Trial not found
    #[error("Trial not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Parse(format!("JSON: {}", err))
    }
}
