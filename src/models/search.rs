//! Request models for the trial tools.

use serde::{Deserialize, Serialize};

/// EU registry trial-status filter codes.
///
/// The registry's search endpoint takes these as bare integers; the named
/// variants cover the codes the tools expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Authorised,
    Recruiting,
    RecruitmentEnded,
    Ended,
}

impl TrialStatus {
    /// The integer code the EU registry expects.
    pub fn code(&self) -> i64 {
        match self {
            TrialStatus::Authorised => 1,
            TrialStatus::Recruiting => 4,
            TrialStatus::RecruitmentEnded => 5,
            TrialStatus::Ended => 8,
        }
    }

    /// Map a registry code back to a named status, if it is one we name.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(TrialStatus::Authorised),
            4 => Some(TrialStatus::Recruiting),
            5 => Some(TrialStatus::RecruitmentEnded),
            8 => Some(TrialStatus::Ended),
            _ => None,
        }
    }
}

/// Default EU status filter: ended trials.
pub const DEFAULT_STATUS_CODE: i64 = 8;

/// Default number of trials to pull from each registry.
pub const DEFAULT_TRIAL_COUNT: usize = 10;

/// Parameters for one batched relevance search across both registries.
///
/// Constructed once per search call and shared read-only by every
/// concurrent page fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSearchRequest {
    /// The user's free-text request, passed to the relevance model.
    pub user_request: String,

    /// Keywords searched in both registries.
    pub search_terms: String,

    /// Condition or disease filter.
    pub condition: Option<String>,

    /// Location filter (ClinicalTrials.gov only; the EU endpoint has no
    /// location criterion).
    pub location: Option<String>,

    /// Sponsor filter.
    pub sponsor: Option<String>,

    /// EU status code; arbitrary codes are passed through unchanged.
    pub status: i64,

    /// Number of trials to fetch from each registry.
    pub no_of_trials: usize,
}

impl Default for TrialSearchRequest {
    fn default() -> Self {
        Self {
            user_request: String::new(),
            search_terms: String::new(),
            condition: None,
            location: None,
            sponsor: None,
            status: DEFAULT_STATUS_CODE,
            no_of_trials: DEFAULT_TRIAL_COUNT,
        }
    }
}

impl TrialSearchRequest {
    /// Create a request from the two required parameters.
    pub fn new(user_request: impl Into<String>, search_terms: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            search_terms: search_terms.into(),
            ..Default::default()
        }
    }

    /// Set the condition filter.
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set the location filter.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the sponsor filter.
    pub fn sponsor(mut self, sponsor: impl Into<String>) -> Self {
        self.sponsor = Some(sponsor.into());
        self
    }

    /// Set the EU status code.
    pub fn status(mut self, status: i64) -> Self {
        self.status = status;
        self
    }

    /// Set the per-registry trial budget.
    pub fn no_of_trials(mut self, count: usize) -> Self {
        self.no_of_trials = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [
            TrialStatus::Authorised,
            TrialStatus::Recruiting,
            TrialStatus::RecruitmentEnded,
            TrialStatus::Ended,
        ] {
            assert_eq!(TrialStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(TrialStatus::from_code(99), None);
        assert_eq!(TrialStatus::Ended.code(), DEFAULT_STATUS_CODE);
    }

    #[test]
    fn request_builder_defaults() {
        let request = TrialSearchRequest::new("find oncology trials", "pembrolizumab")
            .condition("melanoma")
            .no_of_trials(15);

        assert_eq!(request.user_request, "find oncology trials");
        assert_eq!(request.search_terms, "pembrolizumab");
        assert_eq!(request.condition.as_deref(), Some("melanoma"));
        assert_eq!(request.location, None);
        assert_eq!(request.status, DEFAULT_STATUS_CODE);
        assert_eq!(request.no_of_trials, 15);
    }
}
