//! ClinicalTrials.gov study rendering.
//!
//! Studies arrive as a `protocolSection` plus an optional `resultsSection`.
//! [`render_study`] turns one study into a markdown report; its entire body
//! runs behind a single failure boundary, so callers always receive
//! renderable text — on any fault the report degrades to an error message
//! plus a bounded preview of the raw payload.

use std::fmt::Write;

use serde_json::Value;

use super::value::{list, lookup, str_or, string_list, u64_or};

/// Bound on the raw-payload preview embedded in a degraded report.
const RAW_PREVIEW_LIMIT: usize = 5000;

/// Outcome measures rendered in full before collapsing the remainder.
const OUTCOME_DISPLAY_LIMIT: usize = 3;

/// Render one study as a markdown report. Never fails: a rendering fault
/// yields an error message with the first [`RAW_PREVIEW_LIMIT`] characters
/// of the raw study serialized as text.
pub fn render_study(study: &Value) -> String {
    match try_render(study) {
        Ok(report) => report,
        Err(err) => {
            let raw = serde_json::to_string_pretty(study)
                .unwrap_or_else(|e| format!("<unserializable payload: {e}>"));
            let preview: String = raw.chars().take(RAW_PREVIEW_LIMIT).collect();
            format!("Error formatting trial details: {err}\n\nRaw data:\n{preview}...")
        }
    }
}

/// A module sub-object, present only if it exists and is a non-empty object.
fn module<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    lookup(root, path).filter(|v| v.as_object().map(|o| !o.is_empty()).unwrap_or(false))
}

/// Find a group's title by id within a `groups` list, falling back to the id.
fn group_title(groups: &[&Value], group_id: &str) -> String {
    groups
        .iter()
        .find(|g| str_or(g, &["id"], "") == group_id)
        .map(|g| str_or(g, &["title"], group_id))
        .unwrap_or_else(|| group_id.to_string())
}

fn try_render(study: &Value) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    let protocol = lookup(study, &["protocolSection"]).cloned().unwrap_or(Value::Null);
    let results = lookup(study, &["resultsSection"]);

    let nct_id = str_or(&protocol, &["identificationModule", "nctId"], "Unknown ID");
    writeln!(out, "# Clinical Trial Details: {nct_id}\n")?;

    writeln!(out, "## Trial Identification and Status\n")?;
    writeln!(
        out,
        "**Trial ID**: {}",
        str_or(&protocol, &["identificationModule", "nctId"], "Not provided")
    )?;
    let official = lookup(&protocol, &["identificationModule", "officialTitle"])
        .and_then(Value::as_str)
        .map(str::to_string);
    let title = official.unwrap_or_else(|| {
        str_or(&protocol, &["identificationModule", "briefTitle"], "Not provided")
    });
    writeln!(out, "**Title**: {title}")?;
    writeln!(
        out,
        "**Status**: {}",
        str_or(&protocol, &["statusModule", "overallStatus"], "Not provided")
    )?;
    writeln!(
        out,
        "**Started**: {}",
        str_or(&protocol, &["statusModule", "startDateStruct", "date"], "Not provided")
    )?;
    writeln!(
        out,
        "**Primary Completion**: {}",
        str_or(
            &protocol,
            &["statusModule", "primaryCompletionDateStruct", "date"],
            "Not provided"
        )
    )?;

    writeln!(out, "\n## Sponsor and Collaborator Information\n")?;
    writeln!(
        out,
        "**Lead Sponsor**: {} ({})",
        str_or(
            &protocol,
            &["sponsorCollaboratorsModule", "leadSponsor", "name"],
            "Not provided"
        ),
        str_or(
            &protocol,
            &["sponsorCollaboratorsModule", "leadSponsor", "class"],
            "Unknown"
        )
    )?;

    if module(&protocol, &["conditionsModule"]).is_some() {
        writeln!(out, "\n## Conditions and Keywords\n")?;
        let conditions = string_list(&protocol, &["conditionsModule", "conditions"]);
        if !conditions.is_empty() {
            writeln!(out, "**Conditions**: {}", conditions.join(", "))?;
        }
    }

    writeln!(out, "\n## Study Design\n")?;
    if let Some(design) = module(&protocol, &["designModule"]) {
        let study_type = str_or(design, &["studyType"], "Not provided");
        writeln!(out, "**Study Type**: {study_type}")?;
        let phases = string_list(design, &["phases"]);
        if !phases.is_empty() {
            writeln!(out, "**Phase**: {}", phases.join(", "))?;
        }

        if let Some(design_info) = lookup(design, &["designInfo"]).and_then(Value::as_object) {
            for (key, value) in design_info {
                // Scalar fields only; composite entries (masking details
                // etc.) have their own rendering below where they matter.
                let rendered = match value {
                    Value::String(s) if !s.is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                };
                if let Some(v) = rendered {
                    writeln!(out, "**{}**: {v}", capitalize(key))?;
                }
            }
        }

        writeln!(
            out,
            "**Target Duration**: {}",
            str_or(design, &["targetDuration"], "Not specified")
        )?;
        writeln!(
            out,
            "**Enrollment**: {} ({})",
            str_or(design, &["enrollmentInfo", "count"], "Not specified"),
            str_or(design, &["enrollmentInfo", "type"], "Not specified")
        )?;

        if study_type == "OBSERVATIONAL" {
            writeln!(
                out,
                "**Observational Model**: {}",
                str_or(design, &["designInfo", "observationalModel"], "Not specified")
            )?;
            writeln!(
                out,
                "**Time Perspective**: {}",
                str_or(design, &["designInfo", "timePerspective"], "Not specified")
            )?;
        }
    }

    if let Some(arms_module) = module(&protocol, &["armsInterventionsModule"]) {
        writeln!(out, "\n## Arms and Interventions\n")?;
        for arm in list(arms_module, &["arms"]) {
            writeln!(out, "### Arm: {}", str_or(arm, &["label"], "Unnamed Arm"))?;
            writeln!(out, "**Type**: {}", str_or(arm, &["type"], "Not specified"))?;
            writeln!(
                out,
                "**Description**: {}",
                str_or(arm, &["description"], "No description provided")
            )?;
            let interventions = string_list(arm, &["interventionNames"]);
            if !interventions.is_empty() {
                writeln!(out, "**Interventions**: {}\n", interventions.join(", "))?;
            }
        }

        let interventions = list(arms_module, &["interventions"]);
        if !interventions.is_empty() {
            writeln!(out, "### Detailed Interventions\n")?;
            for intervention in interventions {
                writeln!(
                    out,
                    "**{}**: {}",
                    str_or(intervention, &["type"], "Unknown Type"),
                    str_or(intervention, &["name"], "Unnamed")
                )?;
                writeln!(
                    out,
                    "**Description**: {}",
                    str_or(intervention, &["description"], "No description provided")
                )?;
                let arm_labels = string_list(intervention, &["armGroupLabels"]);
                if !arm_labels.is_empty() {
                    writeln!(out, "**Arms**: {}\n", arm_labels.join(", "))?;
                }
            }
        }
    }

    if let Some(outcomes) = module(&protocol, &["outcomesModule"]) {
        writeln!(out, "\n## Outcome Measures\n")?;
        for (key, heading) in [
            ("primaryOutcomes", "### Primary Outcomes\n"),
            ("secondaryOutcomes", "### Secondary Outcomes\n"),
        ] {
            let entries = list(outcomes, &[key]);
            if entries.is_empty() {
                continue;
            }
            writeln!(out, "{heading}")?;
            for outcome in entries {
                writeln!(
                    out,
                    "- **Measure**: {}",
                    str_or(outcome, &["measure"], "Not specified")
                )?;
                writeln!(
                    out,
                    "  **Time Frame**: {}",
                    str_or(outcome, &["timeFrame"], "Not specified")
                )?;
                if let Some(description) = lookup(outcome, &["description"]).and_then(Value::as_str)
                {
                    writeln!(out, "  **Description**: {description}")?;
                }
                writeln!(out)?;
            }
        }
    }

    if let Some(eligibility) = module(&protocol, &["eligibilityModule"]) {
        writeln!(out, "\n## Eligibility\n")?;
        writeln!(
            out,
            "**Minimum Age**: {}",
            str_or(eligibility, &["minimumAge"], "Not specified")
        )?;
        writeln!(
            out,
            "**Maximum Age**: {}",
            str_or(eligibility, &["maximumAge"], "Not specified")
        )?;
        writeln!(out, "**Sex**: {}", str_or(eligibility, &["sex"], "Not specified"))?;
        writeln!(
            out,
            "**Gender**: {}",
            str_or(eligibility, &["gender"], "Not specified")
        )?;

        let std_ages = string_list(eligibility, &["stdAges"]);
        if !std_ages.is_empty() {
            writeln!(out, "**Standard Ages**: {}", std_ages.join(", "))?;
        }

        if let Some(Value::Bool(healthy)) = lookup(eligibility, &["healthyVolunteers"]) {
            writeln!(
                out,
                "**Accepts Healthy Volunteers**: {}",
                if *healthy { "Yes" } else { "No" }
            )?;
        }

        if let Some(population) = lookup(eligibility, &["studyPopulation"]).and_then(Value::as_str)
        {
            writeln!(out, "**Study Population**: {population}")?;
        }
        if let Some(method) = lookup(eligibility, &["samplingMethod"]).and_then(Value::as_str) {
            writeln!(out, "**Sampling Method**: {method}")?;
        }
        if lookup(eligibility, &["criteria"]).is_some() {
            writeln!(out, "\n### Inclusion/Exclusion Criteria\n")?;
            writeln!(out, "{}", str_or(eligibility, &["criteria"], "Not provided"))?;
        }
    }

    if let Some(description) = module(&protocol, &["descriptionModule"]) {
        writeln!(out, "\n## Study Description\n")?;
        if let Some(brief) = lookup(description, &["briefSummary"]).and_then(Value::as_str) {
            writeln!(out, "### Brief Summary\n")?;
            writeln!(out, "{brief}\n")?;
        }
        if let Some(detailed) = lookup(description, &["detailedDescription"]).and_then(Value::as_str)
        {
            writeln!(out, "### Detailed Description\n")?;
            writeln!(out, "{detailed}\n")?;
        }
    }

    if let Some(results) = results.filter(|v| v.as_object().map(|o| !o.is_empty()).unwrap_or(false))
    {
        writeln!(out, "\n# Study Results\n")?;
        render_participant_flow(&mut out, results)?;
        render_outcome_results(&mut out, results)?;
        render_adverse_events(&mut out, results)?;
    }

    Ok(out)
}

fn render_participant_flow(out: &mut String, results: &Value) -> Result<(), std::fmt::Error> {
    let Some(flow) = module(results, &["participantFlowModule"]) else {
        return Ok(());
    };

    writeln!(out, "## Participant Flow\n")?;

    if let Some(details) = lookup(flow, &["preAssignmentDetails"]).and_then(Value::as_str) {
        writeln!(out, "**Pre-assignment Details**: {details}\n")?;
    }
    if let Some(details) = lookup(flow, &["recruitmentDetails"]).and_then(Value::as_str) {
        writeln!(out, "**Recruitment Details**: {details}\n")?;
    }

    let groups = list(flow, &["groups"]);
    if !groups.is_empty() {
        writeln!(out, "### Study Groups\n")?;
        for group in &groups {
            writeln!(
                out,
                "- **{}**: {}",
                str_or(group, &["title"], "Unnamed"),
                str_or(group, &["description"], "No description")
            )?;
        }
        writeln!(out)?;
    }

    let periods = list(flow, &["periods"]);
    if !periods.is_empty() {
        writeln!(out, "### Flow Periods\n")?;
        for period in periods {
            writeln!(out, "**{}**:\n", str_or(period, &["title"], "Unnamed Period"))?;

            let milestones = list(period, &["milestones"]);
            if !milestones.is_empty() {
                writeln!(out, "**Milestones**:\n")?;
                for milestone in milestones {
                    write!(out, "- {}: ", str_or(milestone, &["type"], "Unnamed"))?;
                    let achievements: Vec<String> = list(milestone, &["achievements"])
                        .into_iter()
                        .map(|achievement| {
                            let group_id = str_or(achievement, &["groupId"], "");
                            format!(
                                "{}: {}",
                                group_title(&groups, &group_id),
                                str_or(achievement, &["numSubjects"], "0")
                            )
                        })
                        .collect();
                    writeln!(out, "{}", achievements.join(", "))?;
                }
                writeln!(out)?;
            }

            let dropouts = list(period, &["dropWithdraws"]);
            if !dropouts.is_empty() {
                writeln!(out, "**Dropouts/Withdrawals**:\n")?;
                for dropout in dropouts {
                    write!(out, "- {}: ", str_or(dropout, &["type"], "Unnamed"))?;
                    let reasons: Vec<String> = list(dropout, &["reasons"])
                        .into_iter()
                        .map(|reason| {
                            let group_id = str_or(reason, &["groupId"], "");
                            format!(
                                "{}: {}",
                                group_title(&groups, &group_id),
                                str_or(reason, &["numSubjects"], "0")
                            )
                        })
                        .collect();
                    writeln!(out, "{}", reasons.join(", "))?;
                }
                writeln!(out)?;
            }
        }
    }

    Ok(())
}

fn render_outcome_results(out: &mut String, results: &Value) -> Result<(), std::fmt::Error> {
    let measures = list(results, &["outcomeMeasuresModule", "outcomeMeasures"]);
    if measures.is_empty() {
        return Ok(());
    }

    writeln!(out, "## Outcome Results\n")?;

    for (index, outcome) in measures.iter().enumerate() {
        if index >= OUTCOME_DISPLAY_LIMIT {
            writeln!(out, "*(Additional outcome measures available but not shown)*\n")?;
            break;
        }

        writeln!(
            out,
            "### {} Outcome: {}\n",
            str_or(outcome, &["type"], "Outcome"),
            str_or(outcome, &["title"], "Unnamed")
        )?;

        if let Some(description) = lookup(outcome, &["description"]).and_then(Value::as_str) {
            writeln!(out, "**Description**: {description}")?;
        }
        if let Some(time_frame) = lookup(outcome, &["timeFrame"]).and_then(Value::as_str) {
            writeln!(out, "**Time Frame**: {time_frame}")?;
        }

        let groups = list(outcome, &["groups"]);
        let classes = list(outcome, &["classes"]);
        if !classes.is_empty() {
            writeln!(out, "\n**Results**:\n")?;
            let unit = str_or(outcome, &["unitOfMeasure"], "");
            for class in classes {
                for category in list(class, &["categories"]) {
                    for measurement in list(category, &["measurements"]) {
                        let group_id = str_or(measurement, &["groupId"], "");
                        writeln!(
                            out,
                            "- {}: {} {}",
                            group_title(&groups, &group_id),
                            str_or(measurement, &["value"], ""),
                            unit
                        )?;
                    }
                }
            }
            writeln!(out)?;
        }

        let analyses = list(outcome, &["analyses"]);
        if !analyses.is_empty() {
            writeln!(out, "**Statistical Analysis**:\n")?;
            for analysis in analyses {
                writeln!(
                    out,
                    "- Method: {}",
                    str_or(analysis, &["statisticalMethod"], "")
                )?;
                writeln!(
                    out,
                    "  {}: {}",
                    str_or(analysis, &["paramType"], ""),
                    str_or(analysis, &["paramValue"], "")
                )?;
                let p_value = str_or(analysis, &["pValue"], "");
                if !p_value.is_empty() {
                    writeln!(out, "  p-value: {p_value}")?;
                }
                if lookup(analysis, &["ciPctValue"]).is_some() {
                    writeln!(
                        out,
                        "  {}% CI: [{}, {}]",
                        str_or(analysis, &["ciPctValue"], ""),
                        str_or(analysis, &["ciLowerLimit"], ""),
                        str_or(analysis, &["ciUpperLimit"], "")
                    )?;
                }
                writeln!(out)?;
            }
        }
    }

    Ok(())
}

fn render_adverse_events(out: &mut String, results: &Value) -> Result<(), std::fmt::Error> {
    let Some(adverse) = module(results, &["adverseEventsModule"]) else {
        return Ok(());
    };

    writeln!(out, "## Adverse Events Summary\n")?;

    if let Some(description) = lookup(adverse, &["description"]).and_then(Value::as_str) {
        writeln!(out, "**Description**: {description}\n")?;
    }

    let groups = list(adverse, &["eventGroups"]);
    if !groups.is_empty() {
        writeln!(out, "### Event Groups\n")?;
        for group in groups {
            writeln!(out, "- **{}**:", str_or(group, &["title"], "Unnamed"))?;

            let serious_at_risk = u64_or(group, &["seriousNumAtRisk"], 0);
            if serious_at_risk != 0 {
                writeln!(
                    out,
                    "  Serious Events: {}/{} participants",
                    u64_or(group, &["seriousNumAffected"], 0),
                    serious_at_risk
                )?;
            }

            let other_at_risk = u64_or(group, &["otherNumAtRisk"], 0);
            if other_at_risk != 0 {
                writeln!(
                    out,
                    "  Other Events: {}/{} participants",
                    u64_or(group, &["otherNumAffected"], 0),
                    other_at_risk
                )?;
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

/// First character uppercased, remainder lowercased.
fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Compact per-study block used inside search batches.
fn format_study_summary(study: &Value) -> String {
    let protocol = lookup(study, &["protocolSection"]).cloned().unwrap_or(Value::Null);
    let conditions = string_list(&protocol, &["conditionsModule", "conditions"]);

    format!(
        "NCT ID: {}\nTitle: {}\nStatus: {}\nConditions: {}\nSummary: {}\n",
        str_or(&protocol, &["identificationModule", "nctId"], ""),
        str_or(&protocol, &["identificationModule", "briefTitle"], ""),
        str_or(&protocol, &["statusModule", "overallStatus"], ""),
        conditions.join(", "),
        str_or(&protocol, &["descriptionModule", "briefSummary"], ""),
    )
}

/// Format one page of search hits for relevance judging. Every study in the
/// page is rendered; no truncation.
pub fn format_study_batch(studies: &[Value]) -> String {
    if studies.is_empty() {
        return "No studies found.".to_string();
    }

    let mut result = "### Clinical Trial Search Results\n\n".to_string();
    for (index, study) in studies.iter().enumerate() {
        result.push_str(&format!("## Study {}\n", index + 1));
        result.push_str(&format_study_summary(study));
        result.push_str("\n\n");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn protocol_study() -> Value {
        json!({
            "protocolSection": {
                "identificationModule": {
                    "nctId": "NCT01234567",
                    "briefTitle": "Brief title",
                    "officialTitle": "Official title of the study"
                },
                "statusModule": {
                    "overallStatus": "COMPLETED",
                    "startDateStruct": {"date": "2020-01-15"},
                    "primaryCompletionDateStruct": {"date": "2022-06-01"}
                },
                "sponsorCollaboratorsModule": {
                    "leadSponsor": {"name": "Example Pharma", "class": "INDUSTRY"}
                },
                "conditionsModule": {"conditions": ["Melanoma", "Skin Cancer"]},
                "designModule": {
                    "studyType": "INTERVENTIONAL",
                    "phases": ["PHASE3"],
                    "designInfo": {"allocation": "RANDOMIZED", "primaryPurpose": "TREATMENT"},
                    "enrollmentInfo": {"count": 412, "type": "ACTUAL"}
                },
                "armsInterventionsModule": {
                    "arms": [{
                        "label": "Active",
                        "type": "EXPERIMENTAL",
                        "description": "Receives drug",
                        "interventionNames": ["Drug: Trialozumab"]
                    }],
                    "interventions": [{
                        "type": "DRUG",
                        "name": "Trialozumab",
                        "description": "Monoclonal antibody",
                        "armGroupLabels": ["Active"]
                    }]
                },
                "outcomesModule": {
                    "primaryOutcomes": [{
                        "measure": "Overall survival",
                        "timeFrame": "36 months",
                        "description": "Time to death from any cause"
                    }],
                    "secondaryOutcomes": [{"measure": "PFS", "timeFrame": "24 months"}]
                },
                "eligibilityModule": {
                    "minimumAge": "18 Years",
                    "sex": "ALL",
                    "stdAges": ["ADULT", "OLDER_ADULT"],
                    "healthyVolunteers": false,
                    "criteria": "Inclusion: ...\nExclusion: ..."
                },
                "descriptionModule": {
                    "briefSummary": "Short summary.",
                    "detailedDescription": "Long description."
                }
            }
        })
    }

    fn results_section() -> Value {
        json!({
            "participantFlowModule": {
                "recruitmentDetails": "Recruited at 12 centers",
                "groups": [
                    {"id": "FG000", "title": "Active", "description": "Drug arm"},
                    {"id": "FG001", "title": "Placebo", "description": "Control arm"}
                ],
                "periods": [{
                    "title": "Overall Study",
                    "milestones": [{
                        "type": "STARTED",
                        "achievements": [
                            {"groupId": "FG000", "numSubjects": "206"},
                            {"groupId": "FG001", "numSubjects": "206"}
                        ]
                    }],
                    "dropWithdraws": [{
                        "type": "Withdrawal by Subject",
                        "reasons": [{"groupId": "FG000", "numSubjects": "4"}]
                    }]
                }]
            },
            "outcomeMeasuresModule": {
                "outcomeMeasures": (0..5).map(|i| json!({
                    "type": "PRIMARY",
                    "title": format!("Outcome {i}"),
                    "unitOfMeasure": "months",
                    "groups": [{"id": "OG000", "title": "Active"}],
                    "classes": [{
                        "categories": [{
                            "measurements": [{"groupId": "OG000", "value": "24.1"}]
                        }]
                    }],
                    "analyses": [{
                        "statisticalMethod": "Log Rank",
                        "paramType": "Hazard Ratio",
                        "paramValue": "0.65",
                        "pValue": "0.002",
                        "ciPctValue": "95",
                        "ciLowerLimit": "0.51",
                        "ciUpperLimit": "0.83"
                    }]
                })).collect::<Vec<_>>()
            },
            "adverseEventsModule": {
                "eventGroups": [{
                    "title": "Active",
                    "seriousNumAffected": 12,
                    "seriousNumAtRisk": 206,
                    "otherNumAffected": 150,
                    "otherNumAtRisk": 206
                }]
            }
        })
    }

    #[test]
    fn renders_protocol_sections() {
        let report = render_study(&protocol_study());

        assert!(report.contains("# Clinical Trial Details: NCT01234567"));
        assert!(report.contains("**Title**: Official title of the study"));
        assert!(report.contains("**Lead Sponsor**: Example Pharma (INDUSTRY)"));
        assert!(report.contains("**Conditions**: Melanoma, Skin Cancer"));
        assert!(report.contains("**Phase**: PHASE3"));
        assert!(report.contains("**Allocation**: RANDOMIZED"));
        assert!(report.contains("**Enrollment**: 412 (ACTUAL)"));
        assert!(report.contains("### Arm: Active"));
        assert!(report.contains("### Detailed Interventions"));
        assert!(report.contains("- **Measure**: Overall survival"));
        assert!(report.contains("**Accepts Healthy Volunteers**: No"));
        assert!(report.contains("### Inclusion/Exclusion Criteria"));
        assert!(report.contains("### Brief Summary"));
    }

    #[test]
    fn omits_results_section_when_absent() {
        let report = render_study(&protocol_study());
        assert!(!report.contains("# Study Results"));
        assert!(!report.contains("## Participant Flow"));
        assert!(!report.contains("## Adverse Events Summary"));
    }

    #[test]
    fn renders_results_when_present() {
        let mut study = protocol_study();
        study["resultsSection"] = results_section();
        let report = render_study(&study);

        assert!(report.contains("# Study Results"));
        assert!(report.contains("**Recruitment Details**: Recruited at 12 centers"));
        // Milestone counts are attributed to group titles, not raw ids.
        assert!(report.contains("- STARTED: Active: 206, Placebo: 206"));
        assert!(report.contains("- Withdrawal by Subject: Active: 4"));
        assert!(report.contains("- Active: 24.1 months"));
        assert!(report.contains("  Hazard Ratio: 0.65"));
        assert!(report.contains("  p-value: 0.002"));
        assert!(report.contains("  95% CI: [0.51, 0.83]"));
        assert!(report.contains("  Serious Events: 12/206 participants"));
    }

    #[test]
    fn collapses_outcomes_beyond_three() {
        let mut study = protocol_study();
        study["resultsSection"] = results_section();
        let report = render_study(&study);

        assert!(report.contains("Outcome 0"));
        assert!(report.contains("Outcome 2"));
        assert!(!report.contains("Outcome 3"));
        assert!(report.contains("*(Additional outcome measures available but not shown)*"));
    }

    #[test]
    fn unknown_flow_group_falls_back_to_id() {
        let mut study = protocol_study();
        study["resultsSection"] = json!({
            "participantFlowModule": {
                "groups": [{"id": "FG000", "title": "Active"}],
                "periods": [{
                    "title": "Overall",
                    "milestones": [{
                        "type": "STARTED",
                        "achievements": [{"groupId": "FG999", "numSubjects": "3"}]
                    }]
                }]
            }
        });
        let report = render_study(&study);
        assert!(report.contains("- STARTED: FG999: 3"));
    }

    #[test]
    fn empty_study_still_renders_header() {
        let report = render_study(&json!({}));
        assert!(report.contains("# Clinical Trial Details: Unknown ID"));
        assert!(report.contains("**Trial ID**: Not provided"));
        assert!(!report.contains("## Eligibility"));
    }

    #[test]
    fn batch_formatter_numbers_studies() {
        let studies = vec![protocol_study(), protocol_study()];
        let batch = format_study_batch(&studies);
        assert!(batch.starts_with("### Clinical Trial Search Results"));
        assert!(batch.contains("## Study 1"));
        assert!(batch.contains("## Study 2"));
        assert!(batch.contains("NCT ID: NCT01234567"));
    }

    #[test]
    fn empty_batch_reports_no_studies() {
        assert_eq!(format_study_batch(&[]), "No studies found.");
    }

    #[test]
    fn capitalize_lowercases_tail() {
        assert_eq!(capitalize("primaryPurpose"), "Primarypurpose");
        assert_eq!(capitalize(""), "");
    }
}
