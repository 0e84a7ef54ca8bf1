//! Handlers behind the two trial tools.
//!
//! All user-input validation lives here, before any network call: an id
//! conflict, a malformed NCT id, or missing search parameters each return a
//! descriptive message without touching a registry.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::tools::ToolHandler;
use crate::models::{TrialSearchRequest, DEFAULT_STATUS_CODE, DEFAULT_TRIAL_COUNT};
use crate::parsers::{render_study, trial_summary};
use crate::registries::{CtGovClient, CtisClient};
use crate::search::RelevanceSearch;

/// Bound on the raw-payload preview in a degraded fetch response.
const RAW_PREVIEW_LIMIT: usize = 5000;

/// An NCT id is "NCT" followed by exactly 8 digits.
fn nct_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^NCT\d{8}$").expect("static NCT pattern compiles"))
}

/// Read an optional string argument, treating empty strings as absent.
fn string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Handler for fetching one trial by registry id
#[derive(Debug)]
pub struct FetchTrialHandler {
    pub ctis: CtisClient,
    pub ctgov: CtGovClient,
}

#[async_trait::async_trait]
impl ToolHandler for FetchTrialHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let eu_ct_id = string_arg(&args, "eu_ct_id");
        let trial_ct_id = string_arg(&args, "trial_ct_id");

        let text = match (eu_ct_id, trial_ct_id) {
            (Some(eu_id), Some(nct_id)) => format!(
                "Both EU trial ID ({eu_id}) and ClinicalTrials.gov ID ({nct_id}) were provided. \
                 Only one ID can be processed at a time. Please run this tool again with a \
                 single ID to fetch that trial."
            ),
            (None, Some(nct_id)) => self.fetch_ctgov(&nct_id).await,
            (Some(eu_id), None) => self.fetch_ctis(&eu_id).await,
            (None, None) => {
                "Please provide either an EU clinical trial ID or a ClinicalTrials.gov NCT ID."
                    .to_string()
            }
        };

        Ok(Value::String(text))
    }
}

impl FetchTrialHandler {
    async fn fetch_ctgov(&self, nct_id: &str) -> String {
        if !nct_id_pattern().is_match(nct_id) {
            return format!(
                "Invalid NCT ID format: {nct_id}. IDs should start with 'NCT' followed by 8 digits."
            );
        }

        match self.ctgov.study(nct_id).await {
            Ok(study) => render_study(&study),
            Err(err) => format!("Error fetching study with ID {nct_id}: {err}"),
        }
    }

    async fn fetch_ctis(&self, eu_id: &str) -> String {
        let raw = match self.ctis.retrieve(eu_id).await {
            Ok(raw) => raw,
            Err(err) => return format!("Error querying EU Clinical Trials: {err}"),
        };

        // Rendering must never surface a fault to the caller; an unexpected
        // payload shape degrades to an error message with a bounded preview
        // of the raw response.
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| trial_summary(&raw))) {
            Ok(summary) => summary,
            Err(_) => {
                let serialized = serde_json::to_string_pretty(&raw).unwrap_or_default();
                let preview: String = serialized.chars().take(RAW_PREVIEW_LIMIT).collect();
                format!("Error formatting trial details for {eu_id}.\n\nRaw data:\n{preview}...")
            }
        }
    }
}

/// Handler for the batched relevance search
#[derive(Debug)]
pub struct SearchBatchTrialsHandler {
    pub search: RelevanceSearch,
}

#[async_trait::async_trait]
impl ToolHandler for SearchBatchTrialsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let status = args
            .get("status")
            .and_then(|v| {
                v.as_i64()
                    .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
            })
            .unwrap_or(DEFAULT_STATUS_CODE);

        let no_of_trials = args
            .get("no_of_trials")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TRIAL_COUNT as u64) as usize;

        let request = TrialSearchRequest {
            user_request: string_arg(&args, "user_request").unwrap_or_default(),
            search_terms: string_arg(&args, "search_terms").unwrap_or_default(),
            condition: string_arg(&args, "condition"),
            location: string_arg(&args, "location"),
            sponsor: string_arg(&args, "sponsor"),
            status,
            no_of_trials,
        };

        Ok(Value::String(self.search.run(&request).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nct_pattern_requires_exactly_eight_digits() {
        let pattern = nct_id_pattern();
        assert!(pattern.is_match("NCT01234567"));
        assert!(!pattern.is_match("NCT1234"));
        assert!(!pattern.is_match("NCT012345678"));
        assert!(!pattern.is_match("nct01234567"));
        assert!(!pattern.is_match("NCT0123456a"));
    }

    #[test]
    fn string_arg_treats_empty_as_absent() {
        let args = serde_json::json!({"a": "", "b": "value", "c": 3});
        assert_eq!(string_arg(&args, "a"), None);
        assert_eq!(string_arg(&args, "b").as_deref(), Some("value"));
        assert_eq!(string_arg(&args, "c"), None);
        assert_eq!(string_arg(&args, "missing"), None);
    }
}
