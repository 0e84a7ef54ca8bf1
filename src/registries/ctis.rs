//! EU CTIS public API client.
//!
//! The CTIS public endpoints require the consent cookie and an `origin`
//! header matching the public site; requests without them are rejected.
//! Search is a POST with a JSON criteria payload, paged by page number and
//! sorted by decision date, newest first.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::registries::RegistryError;
use crate::utils::HttpClient;

/// CTIS public API base URL
const CTIS_BASE_URL: &str = "https://euclinicaltrials.eu/ctis-public-api";

/// Origin header expected by the public API
const CTIS_ORIGIN: &str = "https://euclinicaltrials.eu";

/// Per-request timeout for CTIS endpoints
const CTIS_TIMEOUT: Duration = Duration::from_secs(10);

/// Page size used for all CTIS search requests
pub const CTIS_PAGE_SIZE: usize = 5;

/// Search criteria for the CTIS search endpoint.
///
/// Built once per search call and shared read-only across concurrent page
/// fetches. The endpoint has no location criterion.
#[derive(Debug, Clone)]
pub struct CtisSearchCriteria {
    pub contain_all: String,
    pub status: i64,
    pub medical_condition: Option<String>,
    pub sponsor: Option<String>,
}

impl CtisSearchCriteria {
    pub fn new(contain_all: impl Into<String>, status: i64) -> Self {
        Self {
            contain_all: contain_all.into(),
            status,
            medical_condition: None,
            sponsor: None,
        }
    }

    fn to_json(&self) -> Value {
        let mut criteria = json!({
            "containAll": self.contain_all,
            "status": [self.status],
        });
        if let Some(condition) = &self.medical_condition {
            criteria["medicalCondition"] = json!(condition);
        }
        if let Some(sponsor) = &self.sponsor {
            criteria["sponsor"] = json!(sponsor);
        }
        criteria
    }
}

/// EU CTIS registry client
#[derive(Debug, Clone)]
pub struct CtisClient {
    client: Arc<HttpClient>,
    base_url: String,
}

impl CtisClient {
    /// Create a client against the public CTIS API
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            client: Arc::new(HttpClient::new()?),
            base_url: CTIS_BASE_URL.to_string(),
        })
    }

    /// Create with a custom base URL (for testing)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch one full trial record by its `ctNumber`.
    pub async fn retrieve(&self, ct_number: &str) -> Result<Value, RegistryError> {
        let url = format!("{}/retrieve/{}", self.base_url, ct_number);

        let response = self
            .client
            .client()
            .get(&url)
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .header("origin", CTIS_ORIGIN)
            .header("Cookie", "accepted_cookie=true")
            .timeout(CTIS_TIMEOUT)
            .send()
            .await
            .map_err(|e| RegistryError::Network(format!("Failed to reach CTIS: {e}")))?;

        if !response.status().is_success() {
            return Err(RegistryError::Api(format!(
                "CTIS returned status: {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::Parse(format!("Failed to decode CTIS record: {e}")))
    }

    /// Fetch one page of search results (1-based page number).
    pub async fn search(
        &self,
        criteria: &CtisSearchCriteria,
        page: usize,
    ) -> Result<Value, RegistryError> {
        let url = format!("{}/search", self.base_url);
        let payload = json!({
            "pagination": {"page": page, "size": CTIS_PAGE_SIZE},
            "sort": {"property": "decisionDate", "direction": "DESC"},
            "searchCriteria": criteria.to_json(),
        });

        tracing::debug!("CTIS search page {page}: {}", criteria.contain_all);

        let response = self
            .client
            .client()
            .post(&url)
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .header("origin", CTIS_ORIGIN)
            .header("Cookie", "accepted_cookie=true")
            .timeout(CTIS_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RegistryError::Network(format!("Failed to reach CTIS: {e}")))?;

        if !response.status().is_success() {
            return Err(RegistryError::Api(format!(
                "CTIS search returned status: {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::Parse(format!("Failed to decode CTIS page: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_json_includes_only_set_filters() {
        let bare = CtisSearchCriteria::new("pembrolizumab", 8).to_json();
        assert_eq!(bare["containAll"], "pembrolizumab");
        assert_eq!(bare["status"], json!([8]));
        assert!(bare.get("medicalCondition").is_none());
        assert!(bare.get("sponsor").is_none());

        let mut criteria = CtisSearchCriteria::new("pembrolizumab", 4);
        criteria.medical_condition = Some("melanoma".to_string());
        criteria.sponsor = Some("Example Pharma".to_string());
        let full = criteria.to_json();
        assert_eq!(full["medicalCondition"], "melanoma");
        assert_eq!(full["sponsor"], "Example Pharma");
        assert_eq!(full["status"], json!([4]));
    }
}
