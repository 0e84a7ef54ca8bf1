//! EU CTIS record extraction and text rendering.
//!
//! The registry's `retrieve/{ctNumber}` payload nests trial data several
//! levels deep under `authorizedApplication`. [`extract_trial_record`]
//! flattens one raw record into a [`NormalizedTrialRecord`] with every leaf
//! defaulted, and [`render_trial_record`] turns that record into the
//! sectioned text report returned by the fetch tool. Extraction always
//! succeeds; partial or malformed payloads degrade to sentinel values.

use serde_json::Value;

use super::value::{list, lookup, str_or, string_list};
use crate::models::{
    AuthorizedPart, BasicInfo, CategoryDetails, Contact, Document, Dosage, Endpoints,
    EventsAndDocuments, NormalizedTrialRecord, Product, ProductInfo, ProductRole, Sponsor,
    TherapeuticArea, ThirdParty, TrialDetails, TrialEvent, TrialObjective, TrialSite,
    NOT_SPECIFIED, NO_EMAIL, UNKNOWN,
};

/// How many trial sites and documents the renderer shows before collapsing
/// the remainder into a count marker.
const DISPLAY_LIMIT: usize = 5;

/// Flatten one raw EU registry record. Never fails; any missing nested path
/// yields a placeholder value.
pub fn extract_trial_record(raw: &Value) -> NormalizedTrialRecord {
    NormalizedTrialRecord {
        basic_info: extract_basic_info(raw),
        countries: extract_countries(raw),
        products: extract_products(raw),
        trial_details: extract_trial_details(raw),
        sponsors: extract_sponsors(raw),
        category_details: extract_category_details(raw),
        authorized_parts: extract_authorized_parts(raw),
        events_and_documents: extract_events_and_documents(raw),
    }
}

/// Extract and render in one step. This is what the fetch tool returns.
pub fn trial_summary(raw: &Value) -> String {
    render_trial_record(&extract_trial_record(raw))
}

fn extract_basic_info(raw: &Value) -> BasicInfo {
    BasicInfo {
        trial_id: str_or(raw, &["ctNumber"], NOT_SPECIFIED),
        trial_status: str_or(raw, &["ctStatus"], NOT_SPECIFIED),
        start_date: str_or(raw, &["startDateEU"], NOT_SPECIFIED),
        decision_date: str_or(raw, &["decisionDate"], NOT_SPECIFIED),
        publish_date: str_or(raw, &["publishDate"], NOT_SPECIFIED),
        public_status_code: str_or(raw, &["ctPublicStatusCode"], NOT_SPECIFIED),
    }
}

fn extract_countries(raw: &Value) -> Vec<String> {
    list(
        raw,
        &["authorizedApplication", "authorizedPartI", "rowCountriesInfo"],
    )
    .into_iter()
    .map(|country| str_or(country, &["name"], NOT_SPECIFIED))
    .collect()
}

fn extract_products(raw: &Value) -> Vec<Product> {
    list(raw, &["authorizedApplication", "authorizedPartI", "products"])
        .into_iter()
        .map(|product| Product {
            id: str_or(product, &["id"], NOT_SPECIFIED),
            product_info: ProductInfo {
                product_pk: str_or(product, &["productDictionaryInfo", "productPk"], NOT_SPECIFIED),
                product_pharm_form: str_or(
                    product,
                    &["productDictionaryInfo", "productPharmForm"],
                    NOT_SPECIFIED,
                ),
                auth_status: str_or(
                    product,
                    &["productDictionaryInfo", "prodAuthStatus"],
                    NOT_SPECIFIED,
                ),
                product_name: str_or(product, &["productDictionaryInfo", "prodName"], NOT_SPECIFIED),
                pharm_form: str_or(product, &["productDictionaryInfo", "pharmForm"], NOT_SPECIFIED),
                active_substance_name: str_or(
                    product,
                    &["productDictionaryInfo", "activeSubstanceName"],
                    NOT_SPECIFIED,
                ),
            },
            substances_product_pk: str_or(
                product,
                &["productDictionaryInfo", "productSubstances"],
                NOT_SPECIFIED,
            ),
            is_paediatric: str_or(product, &["isPaediatricFormulation"], NOT_SPECIFIED),
            mp_role_in_trial: str_or(product, &["mpRoleInTrial"], NOT_SPECIFIED),
            orphan_drug: str_or(product, &["orphanDrugEdit"], NOT_SPECIFIED),
            dosage: Dosage {
                dose_uom: str_or(product, &["doseUom"], NOT_SPECIFIED),
                max_daily_dose: str_or(product, &["maxDailyDoseAmount"], NOT_SPECIFIED),
                dose_uom_total: str_or(product, &["doseUomTotal"], NOT_SPECIFIED),
                max_total_dose: str_or(product, &["maxTotalDoseAmount"], NOT_SPECIFIED),
                max_treatment_period: str_or(product, &["maxTreatmentPeriod"], NOT_SPECIFIED),
                time_unit_code: str_or(product, &["timeUnitCode"], NOT_SPECIFIED),
            },
            other_medicinal_product: str_or(product, &["otherMedicinalProduct"], NOT_SPECIFIED),
            devices: string_list(product, &["devices"]),
            characteristics: string_list(product, &["characteristics"]),
            routes: string_list(product, &["routes"]),
            all_substances_chemicals: str_or(product, &["allSubstancesChemicals"], NOT_SPECIFIED),
            product_display_name: str_or(product, &["productName"], NOT_SPECIFIED),
            json_active_substance_names: str_or(
                product,
                &["jsonActiveSubstanceNames"],
                NOT_SPECIFIED,
            ),
            pharmaceutical_form_display: str_or(
                product,
                &["pharmaceuticalFormDisplay"],
                NOT_SPECIFIED,
            ),
        })
        .collect()
}

fn extract_trial_details(raw: &Value) -> TrialDetails {
    let base = lookup(
        raw,
        &["authorizedApplication", "authorizedPartI", "trialDetails"],
    )
    .cloned()
    .unwrap_or(Value::Null);

    let conditions = list(
        &base,
        &["trialInformation", "medicalCondition", "partIMedicalConditions"],
    );
    let scopes = list(&base, &["trialInformation", "trialObjective", "trialScopes"]);

    TrialDetails {
        full_title: str_or(&base, &["clinicalTrialIdentifiers", "fullTitle"], NOT_SPECIFIED),
        trial_category: str_or(&base, &["trialInformation", "trialCategory"], NOT_SPECIFIED),
        medical_conditions: conditions
            .into_iter()
            .map(|condition| str_or(condition, &["medicalCondition"], NOT_SPECIFIED))
            .collect(),
        meddra_terms: string_list(
            &base,
            &["trialInformation", "medicalCondition", "meddraConditionTerms"],
        ),
        objective: TrialObjective {
            main_objective: str_or(
                &base,
                &["trialInformation", "trialObjective", "mainObjective"],
                NOT_SPECIFIED,
            ),
            secondary_objectives: list(
                &base,
                &["trialInformation", "trialObjective", "secondaryObjectives"],
            )
            .into_iter()
            .map(|obj| str_or(obj, &["secondaryObjective"], NOT_SPECIFIED))
            .collect(),
            trial_scopes: scopes
                .into_iter()
                .map(|scope| str_or(scope, &["code"], NOT_SPECIFIED))
                .collect(),
        },
        inclusion_criteria: list(
            &base,
            &["trialInformation", "eligibilityCriteria", "principalInclusionCriteria"],
        )
        .into_iter()
        .map(|crit| str_or(crit, &["principalInclusionCriteria"], NOT_SPECIFIED))
        .collect(),
        exclusion_criteria: list(
            &base,
            &["trialInformation", "eligibilityCriteria", "principalExclusionCriteria"],
        )
        .into_iter()
        .map(|crit| str_or(crit, &["principalExclusionCriteria"], NOT_SPECIFIED))
        .collect(),
        endpoints: Endpoints {
            primary: list(&base, &["trialInformation", "endPoint", "primaryEndPoints"])
                .into_iter()
                .map(|ep| str_or(ep, &["endPoint"], NOT_SPECIFIED))
                .collect(),
            secondary: list(&base, &["trialInformation", "endPoint", "secondaryEndPoints"])
                .into_iter()
                .map(|ep| str_or(ep, &["endPoint"], NOT_SPECIFIED))
                .collect(),
        },
        trial_duration: str_or(&base, &["trialInformation", "trialDuration"], NOT_SPECIFIED),
        population: str_or(
            &base,
            &["trialInformation", "populationOfTrialSubjects"],
            NOT_SPECIFIED,
        ),
        participant_data: str_or(
            &base,
            &["trialInformation", "individualParticipantData"],
            NOT_SPECIFIED,
        ),
        protocol_info: str_or(&base, &["protocolInformation"], NOT_SPECIFIED),
        scientific_advice: str_or(&base, &["scientificAdviceAndPip"], NOT_SPECIFIED),
    }
}

fn extract_sponsors(raw: &Value) -> Vec<Sponsor> {
    list(raw, &["authorizedApplication", "authorizedPartI", "sponsors"])
        .into_iter()
        .map(|sponsor| Sponsor {
            name: str_or(sponsor, &["organisation", "name"], NOT_SPECIFIED),
            public_contacts: extract_contacts(sponsor, "publicContacts"),
            scientific_contacts: extract_contacts(sponsor, "scientificContacts"),
            third_parties: list(sponsor, &["thirdParties"])
                .into_iter()
                .map(|party| ThirdParty {
                    org_type: str_or(
                        party,
                        &["organisationAddress", "organisation", "type"],
                        UNKNOWN,
                    ),
                    org_name: str_or(
                        party,
                        &["organisationAddress", "organisation", "name"],
                        UNKNOWN,
                    ),
                    email: str_or(party, &["organisationAddress", "email"], NO_EMAIL),
                })
                .collect(),
        })
        .collect()
}

fn extract_contacts(sponsor: &Value, key: &str) -> Vec<Contact> {
    list(sponsor, &[key])
        .into_iter()
        .map(|contact| Contact {
            org_name: str_or(contact, &["organisation", "name"], UNKNOWN),
            email: str_or(contact, &["functionalEmailAddress"], NO_EMAIL),
        })
        .collect()
}

fn extract_category_details(raw: &Value) -> CategoryDetails {
    let base = lookup(raw, &["authorizedApplication", "authorizedPartI"])
        .cloned()
        .unwrap_or(Value::Null);

    CategoryDetails {
        category_code: str_or(&base, &["trialCategoryCode"], NOT_SPECIFIED),
        justification: str_or(&base, &["trialCategoryJustificationComment"], NOT_SPECIFIED),
        therapeutic_areas: list(&base, &["partOneTherapeuticAreas"])
            .into_iter()
            .map(|area| TherapeuticArea {
                code: str_or(area, &["therapeuticArea", "code"], "No code"),
                name: str_or(area, &["therapeuticArea", "name"], UNKNOWN),
            })
            .collect(),
        product_roles: list(&base, &["productRoleGroupInfos"])
            .into_iter()
            .map(|role| ProductRole {
                code: str_or(role, &["productRoleCode"], "No code"),
                name: str_or(role, &["productRoleName"], UNKNOWN),
                comment: lookup(role, &["comments"])
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
            .collect(),
    }
}

fn extract_authorized_parts(raw: &Value) -> Vec<AuthorizedPart> {
    list(raw, &["authorizedApplication", "authorizedPartsII"])
        .into_iter()
        .map(|part| AuthorizedPart {
            member_state: str_or(part, &["mscInfo", "mscName"], NOT_SPECIFIED),
            trial_status: str_or(part, &["mscInfo", "trialStatus"], NOT_SPECIFIED),
            recruitment_started: str_or(part, &["mscInfo", "hasRecruitmentStarted"], NOT_SPECIFIED),
            decision_date: str_or(part, &["decisionDate"], NOT_SPECIFIED),
            subject_count: str_or(part, &["recruitmentSubjectCount"], NOT_SPECIFIED),
            trial_sites: list(part, &["trialSites"])
                .into_iter()
                .map(|site| TrialSite {
                    org_name: str_or(
                        site,
                        &["organisationAddressInfo", "organisation", "name"],
                        UNKNOWN,
                    ),
                    country: str_or(
                        site,
                        &["organisationAddressInfo", "address", "countryName"],
                        UNKNOWN,
                    ),
                    email: str_or(site, &["organisationAddressInfo", "email"], NO_EMAIL),
                })
                .collect(),
        })
        .collect()
}

fn extract_events_and_documents(raw: &Value) -> EventsAndDocuments {
    EventsAndDocuments {
        trial_events: list(raw, &["events", "trialEvents"])
            .into_iter()
            .map(|event| TrialEvent {
                member_state: str_or(event, &["mscName"], UNKNOWN),
                events: str_or(event, &["events"], "No events"),
            })
            .collect(),
        documents: list(raw, &["documents"])
            .into_iter()
            .map(|doc| Document {
                title: str_or(doc, &["title"], UNKNOWN),
                uuid: str_or(doc, &["uuid"], "No UUID"),
            })
            .collect(),
    }
}

/// Render a normalized record as a sectioned text report. Section headers
/// appear only when the corresponding section carries data.
pub fn render_trial_record(record: &NormalizedTrialRecord) -> String {
    let mut parts: Vec<String> = Vec::new();

    let basic = &record.basic_info;
    if !basic.is_empty() {
        parts.push("=== BASIC TRIAL INFORMATION ===".to_string());
        parts.push(format!("Clinical Trial ID: {}", basic.trial_id));
        parts.push(format!("Status: {}", basic.trial_status));
        parts.push(format!("Start Date: {}", basic.start_date));
        parts.push(format!("Decision Date: {}", basic.decision_date));
        parts.push(format!("Publish Date: {}", basic.publish_date));
    }

    let details = &record.trial_details;
    if !details.is_empty() {
        parts.push("=== TRIAL DETAILS ===".to_string());
        parts.push(format!("Title: {}", details.full_title));
        parts.push(format!("Category: {}", details.trial_category));
        parts.push("\nTrial Objectives:".to_string());
        parts.push(format!("Main Objective: {}", details.objective.main_objective));
        parts.push("\nSecondary Objectives:".to_string());
        parts.extend(details.objective.secondary_objectives.iter().map(|obj| format!("- {obj}")));
        parts.push("\nTrial Scopes:".to_string());
        parts.extend(details.objective.trial_scopes.iter().map(|scope| format!("- {scope}")));
        parts.push("\nMedical Information:".to_string());
        parts.push("\nMedical Conditions:".to_string());
        parts.extend(details.medical_conditions.iter().map(|cond| format!("- {cond}")));
        parts.push("\nMedDRA Terms:".to_string());
        parts.extend(details.meddra_terms.iter().map(|term| format!("- {term}")));
        parts.push("\nCriteria:".to_string());
        parts.push("\nInclusion Criteria:".to_string());
        parts.extend(details.inclusion_criteria.iter().map(|crit| format!("- {crit}")));
        parts.push("\nExclusion Criteria:".to_string());
        parts.extend(details.exclusion_criteria.iter().map(|crit| format!("- {crit}")));
        parts.push("\nEndpoints:".to_string());
        parts.push("\nPrimary Endpoints:".to_string());
        parts.extend(details.endpoints.primary.iter().map(|ep| format!("- {ep}")));
        parts.push("\nSecondary Endpoints:".to_string());
        parts.extend(details.endpoints.secondary.iter().map(|ep| format!("- {ep}")));
        parts.push("\nTrial Population Information:".to_string());
        parts.push(format!("Duration: {}", details.trial_duration));
        parts.push(format!("Population Details: {}", details.population));
        parts.push(format!("Individual Participant Data: {}", details.participant_data));
        parts.push("\nAdditional Information:".to_string());
        parts.push(format!("Protocol Information: {}", details.protocol_info));
        parts.push(format!("Scientific Advice: {}", details.scientific_advice));
    }

    if !record.products.is_empty() {
        parts.push("\n=== INVESTIGATIONAL PRODUCTS ===".to_string());
        for product in &record.products {
            let info = &product.product_info;
            parts.push(format!("\nProduct ID: {}", product.id));
            parts.push(format!("Product Name: {}", info.product_name));
            parts.push(format!("Display Name: {}", product.product_display_name));
            parts.push(format!("Product PK: {}", info.product_pk));
            parts.push(format!("Pharmaceutical Form: {}", info.product_pharm_form));
            parts.push(format!(
                "Pharmaceutical Form Display: {}",
                product.pharmaceutical_form_display
            ));
            parts.push(format!("Other Form: {}", info.pharm_form));
            parts.push(format!("Authorization Status: {}", info.auth_status));
            parts.push(format!("Active Substance: {}", info.active_substance_name));
            parts.push(format!(
                "All Substances/Chemicals: {}",
                product.all_substances_chemicals
            ));
            parts.push(format!(
                "JSON Active Substances: {}",
                product.json_active_substance_names
            ));
            parts.push(format!("Substances Product PK: {}", product.substances_product_pk));
            parts.push(format!("Pediatric Formulation: {}", product.is_paediatric));
            parts.push(format!("Role in Trial: {}", product.mp_role_in_trial));
            parts.push(format!("Orphan Drug: {}", product.orphan_drug));
            parts.push("\nDosage Information:".to_string());
            parts.push(format!("- Max Daily Dose: {}", product.dosage.max_daily_dose));
            parts.push(format!("- Dose UOM: {}", product.dosage.dose_uom));
            parts.push(format!("- Max Total Dose: {}", product.dosage.max_total_dose));
            parts.push(format!("- Total Dose UOM: {}", product.dosage.dose_uom_total));
            parts.push(format!("- Treatment Period: {}", product.dosage.max_treatment_period));
            parts.push(format!("- Time Unit: {}", product.dosage.time_unit_code));
            parts.push("\nAdditional Information:".to_string());
            parts.push(format!(
                "- Other Medicinal Product: {}",
                product.other_medicinal_product
            ));
            parts.push("\nDevices:".to_string());
            parts.extend(product.devices.iter().map(|device| format!("- {device}")));
            parts.push("\nCharacteristics:".to_string());
            parts.extend(product.characteristics.iter().map(|c| format!("- {c}")));
            parts.push("\nRoutes:".to_string());
            parts.extend(product.routes.iter().map(|route| format!("- {route}")));
        }
    }

    if !record.sponsors.is_empty() {
        parts.push("\n=== SPONSORS AND CONTACTS ===".to_string());
        for sponsor in &record.sponsors {
            parts.push(format!("\nSponsor: {}", sponsor.name));
            parts.push("\nPublic Contacts:".to_string());
            parts.extend(
                sponsor
                    .public_contacts
                    .iter()
                    .map(|c| format!("- {}: {}", c.org_name, c.email)),
            );
            parts.push("\nScientific Contacts:".to_string());
            parts.extend(
                sponsor
                    .scientific_contacts
                    .iter()
                    .map(|c| format!("- {}: {}", c.org_name, c.email)),
            );
            parts.push("\nThird Parties:".to_string());
            parts.extend(
                sponsor
                    .third_parties
                    .iter()
                    .map(|tp| format!("- {} ({}): {}", tp.org_name, tp.org_type, tp.email)),
            );
        }
    }

    let category = &record.category_details;
    if !category.is_empty() {
        parts.push("\n=== CATEGORY DETAILS ===".to_string());
        parts.push(format!("Trial Category Code: {}", category.category_code));
        parts.push(format!("Trial Category Justification: {}", category.justification));
        parts.push("\nTherapeutic Areas:".to_string());
        parts.extend(
            category
                .therapeutic_areas
                .iter()
                .map(|area| format!("- {} ({})", area.name, area.code)),
        );
        parts.push("\nProduct Roles:".to_string());
        parts.extend(category.product_roles.iter().map(|role| {
            let comment = role
                .comment
                .as_ref()
                .map(|c| format!(": {c}"))
                .unwrap_or_default();
            format!("- {} ({}){}", role.name, role.code, comment)
        }));
    }

    if !record.authorized_parts.is_empty() {
        parts.push("\n=== TRIAL SITES AND STATUS ===".to_string());
        for part in &record.authorized_parts {
            parts.push(format!("\nMember State: {}", part.member_state));
            parts.push(format!("Trial Status: {}", part.trial_status));
            parts.push(format!("Recruitment Started: {}", part.recruitment_started));
            parts.push(format!("Decision Date: {}", part.decision_date));
            parts.push(format!("Subject Count: {}", part.subject_count));
            parts.push("\nTrial Sites:".to_string());
            parts.extend(part.trial_sites.iter().take(DISPLAY_LIMIT).map(|site| {
                format!("- {} ({})(Email: {})", site.org_name, site.country, site.email)
            }));
            if part.trial_sites.len() > DISPLAY_LIMIT {
                parts.push(format!(
                    "\n[{} more sites not shown]",
                    part.trial_sites.len() - DISPLAY_LIMIT
                ));
            }
        }
    }

    let events_docs = &record.events_and_documents;
    if !events_docs.is_empty() {
        parts.push("\n=== EVENTS AND DOCUMENTS ===".to_string());
        parts.push("\nTrial Events:".to_string());
        parts.extend(
            events_docs
                .trial_events
                .iter()
                .map(|event| format!("- {}: {}", event.member_state, event.events)),
        );
        parts.push("\nDocuments:".to_string());
        parts.extend(
            events_docs
                .documents
                .iter()
                .take(DISPLAY_LIMIT)
                .map(|doc| format!("- {} (UUID: {})", doc.title, doc.uuid)),
        );
        if events_docs.documents.len() > DISPLAY_LIMIT {
            parts.push(format!(
                "\n[{} more documents not shown]",
                events_docs.documents.len() - DISPLAY_LIMIT
            ));
        }
    }

    parts.join("\n")
}

/// Format one page of EU search results for relevance judging.
///
/// Renders pagination metadata followed by one block per hit. Every hit in
/// the page is rendered; missing fields default to "N/A".
pub fn format_search_summary(data: &Value) -> String {
    let total_records = str_or(data, &["pagination", "totalRecords"], "0");
    let current_page = str_or(data, &["pagination", "currentPage"], "1");
    let total_pages = str_or(data, &["pagination", "totalPages"], "1");
    let has_next = super::value::bool_or(data, &["pagination", "nextPage"], false);

    let mut summary = format!(
        "\nSearch Results Summary:\nTotal Records: {total_records}\nCurrent Page: {current_page} of {total_pages}\nMore Pages Available: {}\n\nTrial Details:\n",
        if has_next { "Yes" } else { "No" }
    );

    for trial in list(data, &["data"]) {
        let countries: Vec<String> = string_list(trial, &["trialCountries"])
            .into_iter()
            .map(|c| c.split(':').next().unwrap_or_default().to_string())
            .collect();
        let therapeutic_areas = string_list(trial, &["therapeuticAreas"]);

        summary.push_str(&format!(
            "\n----------------------------------------\n\
             Trial ID: {}\n\
             Status: {}\n\
             Title: {}\n\
             Short Title: {}\n\
             Start Date: {}\n\
             Sponsor: {} ({})\n\
             Condition: {}\n\
             Phase: {}\n\
             Countries: {}\n\
             Population: {}, {}\n\
             Enrollment: {} participants\n\
             Results Available: {}\n\
             Last Updated: {}\n\
             \n\
             Primary Endpoint: {}\n\
             Other Endpoints: {}\n\
             Products: {}\n\
             Therapeutic Areas: {}\n\
             ----------------------------------------\n",
            str_or(trial, &["ctNumber"], "N/A"),
            str_or(trial, &["ctStatus"], "N/A"),
            str_or(trial, &["ctTitle"], "N/A"),
            str_or(trial, &["shortTitle"], "N/A"),
            str_or(trial, &["startDateEU"], "N/A"),
            str_or(trial, &["sponsor"], "N/A"),
            str_or(trial, &["sponsorType"], "N/A"),
            str_or(trial, &["conditions"], "N/A"),
            str_or(trial, &["trialPhase"], "N/A"),
            countries.join(", "),
            str_or(trial, &["ageGroup"], "N/A"),
            str_or(trial, &["gender"], "N/A"),
            str_or(trial, &["totalNumberEnrolled"], "N/A"),
            str_or(trial, &["resultsFirstReceived"], "No"),
            str_or(trial, &["lastUpdated"], "N/A"),
            str_or(trial, &["primaryEndPoint"], "N/A"),
            str_or(trial, &["endPoint"], "N/A"),
            str_or(trial, &["product"], "N/A"),
            therapeutic_areas.join(", "),
        ));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Value {
        json!({
            "ctNumber": "2023-501234-12-00",
            "ctStatus": "Ended",
            "startDateEU": "2023-04-01",
            "decisionDate": "2023-03-15",
            "publishDate": "2023-03-20",
            "ctPublicStatusCode": "8",
            "authorizedApplication": {
                "authorizedPartI": {
                    "rowCountriesInfo": [{"name": "Germany"}, {"name": "France"}],
                    "products": [{
                        "id": 101,
                        "productDictionaryInfo": {
                            "prodName": "Trialozumab",
                            "activeSubstanceName": "trialozumab",
                            "prodAuthStatus": "Authorised"
                        },
                        "maxDailyDoseAmount": "200",
                        "doseUom": "mg",
                        "routes": ["Intravenous use"]
                    }],
                    "trialDetails": {
                        "clinicalTrialIdentifiers": {"fullTitle": "A Phase 3 Study of Trialozumab"},
                        "trialInformation": {
                            "trialCategory": "Category 3",
                            "medicalCondition": {
                                "partIMedicalConditions": [{"medicalCondition": "Melanoma"}],
                                "meddraConditionTerms": ["10025650"]
                            },
                            "trialObjective": {
                                "mainObjective": "Assess overall survival",
                                "secondaryObjectives": [{"secondaryObjective": "Assess safety"}],
                                "trialScopes": [{"code": "Therapy"}]
                            },
                            "eligibilityCriteria": {
                                "principalInclusionCriteria": [
                                    {"principalInclusionCriteria": "Age >= 18"}
                                ],
                                "principalExclusionCriteria": [
                                    {"principalExclusionCriteria": "Prior immunotherapy"}
                                ]
                            },
                            "endPoint": {
                                "primaryEndPoints": [{"endPoint": "Overall survival"}],
                                "secondaryEndPoints": [{"endPoint": "Progression-free survival"}]
                            },
                            "trialDuration": "36 months",
                            "populationOfTrialSubjects": "Adults"
                        }
                    },
                    "sponsors": [{
                        "organisation": {"name": "Example Pharma AG"},
                        "publicContacts": [{
                            "functionalEmailAddress": "info@example-pharma.test",
                            "organisation": {"name": "Example Pharma AG"}
                        }],
                        "thirdParties": [{
                            "organisationAddress": {
                                "organisation": {"name": "CRO Partners", "type": "CRO"},
                                "email": "cro@partners.test"
                            }
                        }]
                    }],
                    "trialCategoryCode": "3",
                    "partOneTherapeuticAreas": [
                        {"therapeuticArea": {"code": "TA-17", "name": "Oncology"}}
                    ],
                    "productRoleGroupInfos": [
                        {"productRoleCode": "T", "productRoleName": "Test", "comments": "primary IMP"}
                    ]
                },
                "authorizedPartsII": [{
                    "mscInfo": {
                        "mscName": "Germany",
                        "trialStatus": "Ended",
                        "hasRecruitmentStarted": true
                    },
                    "decisionDate": "2023-03-15",
                    "recruitmentSubjectCount": 240,
                    "trialSites": (0..7).map(|i| json!({
                        "organisationAddressInfo": {
                            "organisation": {"name": format!("Site {i}")},
                            "address": {"countryName": "Germany"},
                            "email": format!("site{i}@hospital.test")
                        }
                    })).collect::<Vec<_>>()
                }]
            },
            "events": {
                "trialEvents": [{"mscName": "Germany", "events": "Trial ended"}]
            },
            "documents": (0..6).map(|i| json!({
                "title": format!("Protocol v{i}"),
                "uuid": format!("uuid-{i}")
            })).collect::<Vec<_>>()
        })
    }

    #[test]
    fn extracts_basic_info_and_products() {
        let record = extract_trial_record(&sample_record());

        assert_eq!(record.basic_info.trial_id, "2023-501234-12-00");
        assert_eq!(record.basic_info.public_status_code, "8");
        assert_eq!(record.countries, vec!["Germany", "France"]);

        assert_eq!(record.products.len(), 1);
        let product = &record.products[0];
        assert_eq!(product.id, "101");
        assert_eq!(product.product_info.product_name, "Trialozumab");
        assert_eq!(product.dosage.max_daily_dose, "200");
        // Leaves absent from the payload are still shaped, just defaulted.
        assert_eq!(product.orphan_drug, NOT_SPECIFIED);
        assert_eq!(product.dosage.time_unit_code, NOT_SPECIFIED);
        assert!(product.devices.is_empty());
    }

    #[test]
    fn extracts_nested_trial_details() {
        let record = extract_trial_record(&sample_record());
        let details = &record.trial_details;

        assert_eq!(details.full_title, "A Phase 3 Study of Trialozumab");
        assert_eq!(details.medical_conditions, vec!["Melanoma"]);
        assert_eq!(details.meddra_terms, vec!["10025650"]);
        assert_eq!(details.objective.main_objective, "Assess overall survival");
        assert_eq!(details.objective.secondary_objectives, vec!["Assess safety"]);
        assert_eq!(details.objective.trial_scopes, vec!["Therapy"]);
        assert_eq!(details.inclusion_criteria, vec!["Age >= 18"]);
        assert_eq!(details.endpoints.primary, vec!["Overall survival"]);
        assert_eq!(details.participant_data, NOT_SPECIFIED);
    }

    #[test]
    fn extracts_sponsors_and_category() {
        let record = extract_trial_record(&sample_record());

        assert_eq!(record.sponsors.len(), 1);
        let sponsor = &record.sponsors[0];
        assert_eq!(sponsor.name, "Example Pharma AG");
        assert_eq!(sponsor.public_contacts[0].email, "info@example-pharma.test");
        assert!(sponsor.scientific_contacts.is_empty());
        assert_eq!(sponsor.third_parties[0].org_type, "CRO");

        let category = &record.category_details;
        assert_eq!(category.category_code, "3");
        assert_eq!(category.therapeutic_areas[0].name, "Oncology");
        assert_eq!(category.product_roles[0].comment.as_deref(), Some("primary IMP"));
    }

    #[test]
    fn empty_payload_extracts_to_empty_sections() {
        let record = extract_trial_record(&json!({}));
        assert!(record.basic_info.is_empty());
        assert!(record.trial_details.is_empty());
        assert!(record.category_details.is_empty());
        assert!(record.events_and_documents.is_empty());
        assert!(record.products.is_empty());
        assert!(record.sponsors.is_empty());
        assert!(record.authorized_parts.is_empty());
    }

    #[test]
    fn section_headers_present_iff_section_non_empty() {
        let full = render_trial_record(&extract_trial_record(&sample_record()));
        for header in [
            "=== BASIC TRIAL INFORMATION ===",
            "=== TRIAL DETAILS ===",
            "=== INVESTIGATIONAL PRODUCTS ===",
            "=== SPONSORS AND CONTACTS ===",
            "=== CATEGORY DETAILS ===",
            "=== TRIAL SITES AND STATUS ===",
            "=== EVENTS AND DOCUMENTS ===",
        ] {
            assert!(full.contains(header), "missing header {header}");
        }

        // A record with only basic info renders only that section.
        let sparse = extract_trial_record(&json!({"ctNumber": "2024-500001-11-00"}));
        let rendered = render_trial_record(&sparse);
        assert!(rendered.contains("=== BASIC TRIAL INFORMATION ==="));
        assert!(!rendered.contains("=== TRIAL DETAILS ==="));
        assert!(!rendered.contains("=== INVESTIGATIONAL PRODUCTS ==="));
        assert!(!rendered.contains("=== SPONSORS AND CONTACTS ==="));
        assert!(!rendered.contains("=== CATEGORY DETAILS ==="));
        assert!(!rendered.contains("=== TRIAL SITES AND STATUS ==="));
        assert!(!rendered.contains("=== EVENTS AND DOCUMENTS ==="));
    }

    #[test]
    fn sites_truncate_to_five_with_remainder() {
        let rendered = render_trial_record(&extract_trial_record(&sample_record()));

        for i in 0..5 {
            assert!(rendered.contains(&format!("Site {i}")));
        }
        assert!(!rendered.contains("Site 5"));
        assert!(!rendered.contains("Site 6"));
        assert!(rendered.contains("[2 more sites not shown]"));
    }

    #[test]
    fn documents_truncate_to_five_with_remainder() {
        let rendered = render_trial_record(&extract_trial_record(&sample_record()));

        assert!(rendered.contains("Protocol v4 (UUID: uuid-4)"));
        assert!(!rendered.contains("Protocol v5"));
        assert!(rendered.contains("[1 more documents not shown]"));
    }

    #[test]
    fn exactly_five_sites_show_no_marker() {
        let mut record = extract_trial_record(&sample_record());
        record.authorized_parts[0].trial_sites.truncate(5);
        let rendered = render_trial_record(&record);
        assert!(rendered.contains("Site 4"));
        assert!(!rendered.contains("more sites not shown"));
    }

    #[test]
    fn search_summary_renders_pagination_and_hits() {
        let page = json!({
            "pagination": {
                "totalRecords": 12,
                "currentPage": 2,
                "totalPages": 3,
                "nextPage": true
            },
            "data": [{
                "ctNumber": "2023-501234-12-00",
                "ctStatus": "Ended",
                "ctTitle": "A Phase 3 Study of Trialozumab",
                "trialCountries": ["Germany: 10 sites", "France: 4 sites"],
                "therapeuticAreas": ["Oncology"],
                "totalNumberEnrolled": 240
            }]
        });

        let summary = format_search_summary(&page);
        assert!(summary.contains("Total Records: 12"));
        assert!(summary.contains("Current Page: 2 of 3"));
        assert!(summary.contains("More Pages Available: Yes"));
        assert!(summary.contains("Trial ID: 2023-501234-12-00"));
        assert!(summary.contains("Countries: Germany, France"));
        assert!(summary.contains("Enrollment: 240 participants"));
        // Missing fields default rather than vanish.
        assert!(summary.contains("Sponsor: N/A (N/A)"));
        assert!(summary.contains("Results Available: No"));
    }

    #[test]
    fn search_summary_of_empty_page_has_no_trial_blocks() {
        let summary = format_search_summary(&json!({"pagination": {}, "data": []}));
        assert!(summary.contains("Total Records: 0"));
        assert!(!summary.contains("Trial ID:"));
    }
}
