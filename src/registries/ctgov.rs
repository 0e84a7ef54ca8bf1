//! ClinicalTrials.gov v2 API client.
//!
//! Lookup is by NCT id; search uses cursor pagination via `pageToken`.
//! Query strings are built by hand so the `query.term` value keeps its
//! `+`-joined form.

use std::sync::Arc;

use serde_json::Value;

use crate::parsers::value::{list, lookup, u64_or};
use crate::registries::RegistryError;
use crate::utils::HttpClient;

/// ClinicalTrials.gov API base URL
const CTGOV_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";

/// Page size used for all ClinicalTrials.gov search requests
pub const CTGOV_PAGE_SIZE: usize = 5;

/// Search parameters for the `studies` endpoint.
#[derive(Debug, Clone)]
pub struct CtGovSearchParams {
    pub query_term: String,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub sponsor: Option<String>,
}

impl CtGovSearchParams {
    pub fn new(query_term: impl Into<String>) -> Self {
        Self {
            query_term: query_term.into(),
            condition: None,
            location: None,
            sponsor: None,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct CtGovPage {
    pub studies: Vec<Value>,
    pub total_count: u64,
    pub next_page_token: Option<String>,
}

/// ClinicalTrials.gov registry client
#[derive(Debug, Clone)]
pub struct CtGovClient {
    client: Arc<HttpClient>,
    base_url: String,
}

impl CtGovClient {
    /// Create a client against the public API
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            client: Arc::new(HttpClient::new()?),
            base_url: CTGOV_BASE_URL.to_string(),
        })
    }

    /// Create with a custom base URL (for testing)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the query string for a search request
    fn build_search_query(&self, params: &CtGovSearchParams, page_token: Option<&str>) -> String {
        let mut pairs = vec![
            ("format".to_string(), "json".to_string()),
            ("markupFormat".to_string(), "markdown".to_string()),
            (
                "query.term".to_string(),
                params.query_term.replace(' ', "+"),
            ),
            ("filter.overallStatus".to_string(), "COMPLETED".to_string()),
            ("pageSize".to_string(), CTGOV_PAGE_SIZE.to_string()),
        ];

        if let Some(condition) = &params.condition {
            pairs.push(("query.cond".to_string(), condition.clone()));
        }
        if let Some(location) = &params.location {
            pairs.push(("query.locn".to_string(), location.clone()));
        }
        if let Some(sponsor) = &params.sponsor {
            pairs.push(("query.spons".to_string(), sponsor.clone()));
        }
        if let Some(token) = page_token {
            pairs.push(("pageToken".to_string(), token.to_string()));
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Fetch one full study by NCT id.
    pub async fn study(&self, nct_id: &str) -> Result<Value, RegistryError> {
        let url = format!(
            "{}/studies/{}?format=json&markupFormat=markdown",
            self.base_url, nct_id
        );

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::Network(format!("Failed to reach ClinicalTrials.gov: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(nct_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(RegistryError::Api(format!(
                "ClinicalTrials.gov returned status: {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::Parse(format!("Failed to decode study: {e}")))
    }

    /// Fetch one page of search results, optionally continuing from a
    /// previous page's token.
    pub async fn search(
        &self,
        params: &CtGovSearchParams,
        page_token: Option<&str>,
    ) -> Result<CtGovPage, RegistryError> {
        let url = format!(
            "{}/studies?{}",
            self.base_url,
            self.build_search_query(params, page_token)
        );

        tracing::debug!("ClinicalTrials.gov search: {}", params.query_term);

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::Network(format!("Failed to reach ClinicalTrials.gov: {e}")))?;

        if !response.status().is_success() {
            return Err(RegistryError::Api(format!(
                "ClinicalTrials.gov search returned status: {}",
                response.status()
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::Parse(format!("Failed to decode search page: {e}")))?;

        let studies = list(&body, &["studies"])
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let total_count = u64_or(&body, &["totalCount"], 0);
        let next_page_token = lookup(&body, &["nextPageToken"])
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|t| !t.is_empty());

        Ok(CtGovPage {
            studies,
            total_count,
            next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CtGovClient {
        CtGovClient::new().unwrap()
    }

    #[test]
    fn search_query_folds_spaces_into_plus() {
        let params = CtGovSearchParams::new("advanced melanoma treatment");
        let query = client().build_search_query(&params, None);

        assert!(query.contains("query.term=advanced%2Bmelanoma%2Btreatment"));
        assert!(query.contains("format=json"));
        assert!(query.contains("filter.overallStatus=COMPLETED"));
        assert!(query.contains("pageSize=5"));
        assert!(!query.contains("pageToken"));
    }

    #[test]
    fn search_query_includes_optional_filters() {
        let mut params = CtGovSearchParams::new("pembrolizumab");
        params.condition = Some("melanoma".to_string());
        params.location = Some("Boston, MA".to_string());
        params.sponsor = Some("Example Pharma".to_string());

        let query = client().build_search_query(&params, Some("NF0g5JGBlPY"));
        assert!(query.contains("query.cond=melanoma"));
        assert!(query.contains("query.locn=Boston%2C%20MA"));
        assert!(query.contains("query.spons=Example%20Pharma"));
        assert!(query.contains("pageToken=NF0g5JGBlPY"));
    }
}
