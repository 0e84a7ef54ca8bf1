//! Relevance-ranking search across both registries.
//!
//! One search call pages both registries up to the requested trial count,
//! formats each page into a batch, asks the model to judge each batch
//! against the user's request, and assembles one combined report. Page
//! fetches within a registry and per-batch model calls run concurrently;
//! every concurrent unit carries its batch index so the report always
//! reflects submission order regardless of completion order.
//!
//! Fault policy differs from the per-record renderers: any registry fault
//! during discovery or paging aborts the whole search with an `error:`
//! string instead of degrading to a partial report. Model faults never
//! abort; a batch whose analysis fails simply contributes nothing.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::llm::ModelClient;
use crate::models::TrialSearchRequest;
use crate::parsers::value::{bool_or, list, lookup};
use crate::parsers::{format_search_summary, format_study_batch};
use crate::registries::{
    CtGovClient, CtGovSearchParams, CtisClient, CtisSearchCriteria, RegistryError,
    CTGOV_PAGE_SIZE,
};

/// Error text returned when either required parameter is missing.
const MISSING_PARAMS: &str =
    "error: Missing required parameters. Please provide a search term and user request.";

/// Batched relevance search over both registries.
#[derive(Debug, Clone)]
pub struct RelevanceSearch {
    ctis: CtisClient,
    ctgov: CtGovClient,
    model: Arc<ModelClient>,
}

impl RelevanceSearch {
    pub fn new(ctis: CtisClient, ctgov: CtGovClient, model: Arc<ModelClient>) -> Self {
        Self { ctis, ctgov, model }
    }

    /// Run one search and return the combined report.
    ///
    /// Always returns text: parameter problems and registry faults come
    /// back as `error:`-prefixed strings rather than errors.
    pub async fn run(&self, request: &TrialSearchRequest) -> String {
        if request.search_terms.trim().is_empty() || request.user_request.trim().is_empty() {
            return MISSING_PARAMS.to_string();
        }

        match self.execute(request).await {
            Ok(report) => report,
            Err(err) => format!("error: Error searching clinical trials: {err}"),
        }
    }

    async fn execute(&self, request: &TrialSearchRequest) -> Result<String, RegistryError> {
        let criteria = CtisSearchCriteria {
            contain_all: request.search_terms.clone(),
            status: request.status,
            medical_condition: request.condition.clone(),
            sponsor: request.sponsor.clone(),
        };

        // EU discovery: walk pages sequentially to learn how many pages the
        // trial budget spans, then re-fetch that span concurrently.
        let eu_page_count = self.discover_eu_pages(&criteria, request.no_of_trials).await?;

        let eu_fetches = join_all((1..=eu_page_count).map(|page| {
            let ctis = self.ctis.clone();
            let criteria = criteria.clone();
            async move { ctis.search(&criteria, page).await }
        }))
        .await;

        let mut eu_batches: Vec<String> = Vec::new();
        for page in eu_fetches {
            let page = page?;
            let summary = format_search_summary(&page);
            if !summary.is_empty() {
                eu_batches.push(summary);
            }
        }

        // US side: the first page reveals the total count and the cursor;
        // later pages follow the cursor from each previous response.
        let params = CtGovSearchParams {
            query_term: request.search_terms.clone(),
            condition: request.condition.clone(),
            location: request.location.clone(),
            sponsor: request.sponsor.clone(),
        };

        let first = self.ctgov.search(&params, None).await?;
        let total = (first.total_count as usize).min(request.no_of_trials);
        let page_budget = total.div_ceil(CTGOV_PAGE_SIZE);

        let mut us_batches: Vec<String> = Vec::new();
        let mut processed = first.studies.len();
        if !first.studies.is_empty() {
            us_batches.push(format_study_batch(&first.studies));
        }

        let mut token = first.next_page_token;
        let mut pages_fetched = 1;
        while let Some(page_token) = token {
            if pages_fetched >= page_budget || processed >= request.no_of_trials {
                break;
            }
            let page = self.ctgov.search(&params, Some(&page_token)).await?;
            processed += page.studies.len();
            pages_fetched += 1;
            if !page.studies.is_empty() {
                us_batches.push(format_study_batch(&page.studies));
            }
            token = page.next_page_token;
        }

        tracing::info!(
            "search '{}': {} EU batches, {} ClinicalTrials.gov batches",
            request.search_terms,
            eu_batches.len(),
            us_batches.len()
        );

        let eu_analyses = self
            .analyze_batches(&request.user_request, &eu_batches, eu_relevance_prompt)
            .await;
        let us_analyses = self
            .analyze_batches(&request.user_request, &us_batches, ctgov_relevance_prompt)
            .await;

        Ok(assemble_report(
            &request.search_terms,
            eu_page_count > 0,
            &eu_analyses,
            &us_analyses,
        ))
    }

    /// Sequential EU paging pass: collect trial ids until the budget is met
    /// or the registry reports no further page. Returns the page count the
    /// budget spans.
    async fn discover_eu_pages(
        &self,
        criteria: &CtisSearchCriteria,
        no_of_trials: usize,
    ) -> Result<usize, RegistryError> {
        let mut trial_ids: Vec<String> = Vec::new();
        let mut page_count = 0;
        let mut current_page = 1;

        loop {
            let page = self.ctis.search(criteria, current_page).await?;

            for trial in list(&page, &["data"]) {
                if let Some(id) = lookup(trial, &["ctNumber"]).and_then(|v| v.as_str()) {
                    trial_ids.push(id.to_string());
                    if trial_ids.len() >= no_of_trials {
                        break;
                    }
                }
            }

            page_count += 1;
            let has_next = bool_or(&page, &["pagination", "nextPage"], false);
            if !has_next || trial_ids.len() >= no_of_trials {
                break;
            }
            current_page += 1;
        }

        tracing::debug!("EU discovery: {} trials over {} pages", trial_ids.len(), page_count);
        Ok(page_count)
    }

    /// Submit every batch to the model concurrently, each future tagged
    /// with its batch index, and reassemble responses in submission order.
    async fn analyze_batches(
        &self,
        user_request: &str,
        batches: &[String],
        prompt_for: fn(&str, &str) -> String,
    ) -> Vec<String> {
        let calls = batches.iter().enumerate().map(|(index, batch)| {
            let model = Arc::clone(&self.model);
            let prompt = prompt_for(user_request, batch);
            async move { (index, model.call(prompt).await) }
        });

        collect_in_order(join_all(calls).await)
    }
}

/// Sort index-tagged model responses back into submission order, dropping
/// batches that yielded no analysis.
fn collect_in_order(mut results: Vec<(usize, Option<String>)>) -> Vec<String> {
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().filter_map(|(_, text)| text).collect()
}

fn eu_relevance_prompt(user_request: &str, summary: &str) -> String {
    format!(
        "The user is looking for information about: \"{user_request}\"\n\n\
         Below are some EU clinical trial summaries. Identify which (if any) of these trials\n\
         are relevant to the user's request. Prefer complete or ongoing trials. Prefer trials from pharmaceutical companies or trials that have results.\n\
         For each relevant trial, provide:\n\
         1. The Trial ID (ctNumber)\n\
         2. A brief explanation of why it's relevant\n\n\
         If none are relevant, state that clearly.\n\
         Be succinct.\n\n\
         {summary}"
    )
}

fn ctgov_relevance_prompt(user_request: &str, batch: &str) -> String {
    format!(
        "The user is looking for information about: \"{user_request}\"\n\n\
         Below are some clinical trial summaries from ClinicalTrials.gov. Identify which (if any) of these trials\n\
         are relevant to the user's request. Prefer complete or ongoing trials. Prefer trials from pharmaceutical companies or trials that have results.\n\
         For each relevant trial, provide:\n\
         1. The NCT ID\n\
         2. A brief explanation of why it's relevant\n\n\
         If none are relevant, state that clearly.\n\
         Be succinct.\n\n\
         {batch}"
    )
}

/// Compose the final report from per-registry analyses.
fn assemble_report(
    query: &str,
    eu_pages_fetched: bool,
    eu_analyses: &[String],
    us_analyses: &[String],
) -> String {
    let mut result = format!("# Clinical Trials Search Results for: {query}\n\n");

    if eu_pages_fetched {
        result.push_str("## EU Clinical Trials Results\n\n");
        if !eu_analyses.is_empty() {
            result.push_str("### EU Trials Analysis\n\n");
            for (index, analysis) in eu_analyses.iter().enumerate() {
                result.push_str(&format!("#### Batch {} Analysis\n{}\n\n", index + 1, analysis));
            }
        } else {
            result.push_str("No EU trials were analyzed for relevance.\n\n");
        }
    }

    result.push_str("## ClinicalTrials.gov Results\n\n");
    if !us_analyses.is_empty() {
        result.push_str(&format!("Found further clinical trials matching: {query}\n\n"));
        result.push_str("### ClinicalTrials.gov Analysis\n\n");
        for (index, analysis) in us_analyses.iter().enumerate() {
            result.push_str(&format!("#### Batch {} Analysis\n{}\n\n", index + 1, analysis));
        }
    } else {
        result.push_str("No relevant trials were found on ClinicalTrials.gov or analysis failed.\n\n");
    }

    result.push_str("## Summary of Most Relevant Trials\n\n");
    result.push_str(
        "Based on the analysis above, these trials appear most relevant to your query. \
         Consider using the fetch_trial tool to get complete details on specific trials of interest.\n\n",
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_order_completions_reassemble_by_index() {
        // Completion order 2, 0, 1 — batch numbering must follow
        // submission order.
        let results = vec![
            (2, Some("third".to_string())),
            (0, Some("first".to_string())),
            (1, Some("second".to_string())),
        ];
        assert_eq!(collect_in_order(results), vec!["first", "second", "third"]);
    }

    #[test]
    fn failed_batches_are_dropped_without_gaps() {
        let results = vec![
            (1, None),
            (2, Some("kept".to_string())),
            (0, Some("lead".to_string())),
        ];
        assert_eq!(collect_in_order(results), vec!["lead", "kept"]);
    }

    #[test]
    fn report_numbers_batches_in_submission_order() {
        let eu = vec!["eu analysis one".to_string(), "eu analysis two".to_string()];
        let us = vec!["us analysis".to_string()];
        let report = assemble_report("melanoma", true, &eu, &us);

        assert!(report.starts_with("# Clinical Trials Search Results for: melanoma"));
        let batch1 = report.find("#### Batch 1 Analysis\neu analysis one").unwrap();
        let batch2 = report.find("#### Batch 2 Analysis\neu analysis two").unwrap();
        assert!(batch1 < batch2);
        assert!(report.contains("Found further clinical trials matching: melanoma"));
        assert!(report.contains("#### Batch 1 Analysis\nus analysis"));
        assert!(report.ends_with("details on specific trials of interest.\n\n"));
    }

    #[test]
    fn report_notes_missing_analyses() {
        let report = assemble_report("melanoma", true, &[], &[]);
        assert!(report.contains("No EU trials were analyzed for relevance."));
        assert!(report.contains(
            "No relevant trials were found on ClinicalTrials.gov or analysis failed."
        ));
        assert!(report.contains("## Summary of Most Relevant Trials"));
    }

    #[test]
    fn report_omits_eu_section_when_no_pages_fetched() {
        let report = assemble_report("melanoma", false, &[], &[]);
        assert!(!report.contains("## EU Clinical Trials Results"));
        assert!(report.contains("## ClinicalTrials.gov Results"));
    }

    #[test]
    fn prompts_cite_the_registry_identifier() {
        let eu = eu_relevance_prompt("immunotherapy options", "SUMMARY");
        assert!(eu.contains("immunotherapy options"));
        assert!(eu.contains("The Trial ID (ctNumber)"));
        assert!(eu.contains("Prefer complete or ongoing trials."));
        assert!(eu.ends_with("SUMMARY"));

        let us = ctgov_relevance_prompt("immunotherapy options", "BATCH");
        assert!(us.contains("The NCT ID"));
        assert!(us.contains("ClinicalTrials.gov"));
        assert!(us.ends_with("BATCH"));
    }
}
