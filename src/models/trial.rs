//! Normalized trial record produced by the EU extractor.
//!
//! The extractor always succeeds: every leaf field carries a sentinel value
//! (["Not specified"](NOT_SPECIFIED) for free text, dedicated placeholders
//! for contact fields) instead of being absent, and every list defaults to
//! empty. Renderers therefore only check emptiness at the section level and
//! never branch on individual missing fields.

use serde::{Deserialize, Serialize};

/// Sentinel for an absent free-text field.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Sentinel for an absent organisation name in contact lists.
pub const UNKNOWN: &str = "Unknown";

/// Sentinel for an absent contact email.
pub const NO_EMAIL: &str = "No email";

/// Identification and status fields read from the top level of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    pub trial_id: String,
    pub trial_status: String,
    pub start_date: String,
    pub decision_date: String,
    pub publish_date: String,
    pub public_status_code: String,
}

impl Default for BasicInfo {
    fn default() -> Self {
        Self {
            trial_id: NOT_SPECIFIED.to_string(),
            trial_status: NOT_SPECIFIED.to_string(),
            start_date: NOT_SPECIFIED.to_string(),
            decision_date: NOT_SPECIFIED.to_string(),
            publish_date: NOT_SPECIFIED.to_string(),
            public_status_code: NOT_SPECIFIED.to_string(),
        }
    }
}

impl BasicInfo {
    pub fn is_empty(&self) -> bool {
        [
            &self.trial_id,
            &self.trial_status,
            &self.start_date,
            &self.decision_date,
            &self.publish_date,
            &self.public_status_code,
        ]
        .iter()
        .all(|f| *f == NOT_SPECIFIED)
    }
}

/// Product fields read from the registry's product dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_pk: String,
    pub product_pharm_form: String,
    pub auth_status: String,
    pub product_name: String,
    pub pharm_form: String,
    pub active_substance_name: String,
}

impl Default for ProductInfo {
    fn default() -> Self {
        Self {
            product_pk: NOT_SPECIFIED.to_string(),
            product_pharm_form: NOT_SPECIFIED.to_string(),
            auth_status: NOT_SPECIFIED.to_string(),
            product_name: NOT_SPECIFIED.to_string(),
            pharm_form: NOT_SPECIFIED.to_string(),
            active_substance_name: NOT_SPECIFIED.to_string(),
        }
    }
}

/// Dosing fields for one investigational product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dosage {
    pub dose_uom: String,
    pub max_daily_dose: String,
    pub dose_uom_total: String,
    pub max_total_dose: String,
    pub max_treatment_period: String,
    pub time_unit_code: String,
}

impl Default for Dosage {
    fn default() -> Self {
        Self {
            dose_uom: NOT_SPECIFIED.to_string(),
            max_daily_dose: NOT_SPECIFIED.to_string(),
            dose_uom_total: NOT_SPECIFIED.to_string(),
            max_total_dose: NOT_SPECIFIED.to_string(),
            max_treatment_period: NOT_SPECIFIED.to_string(),
            time_unit_code: NOT_SPECIFIED.to_string(),
        }
    }
}

/// One investigational product. Products with no sub-fields in the raw
/// payload still produce a fully-shaped record with defaulted leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub product_info: ProductInfo,
    pub substances_product_pk: String,
    pub is_paediatric: String,
    pub mp_role_in_trial: String,
    pub orphan_drug: String,
    pub dosage: Dosage,
    pub other_medicinal_product: String,
    pub devices: Vec<String>,
    pub characteristics: Vec<String>,
    pub routes: Vec<String>,
    pub all_substances_chemicals: String,
    pub product_display_name: String,
    pub json_active_substance_names: String,
    pub pharmaceutical_form_display: String,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: NOT_SPECIFIED.to_string(),
            product_info: ProductInfo::default(),
            substances_product_pk: NOT_SPECIFIED.to_string(),
            is_paediatric: NOT_SPECIFIED.to_string(),
            mp_role_in_trial: NOT_SPECIFIED.to_string(),
            orphan_drug: NOT_SPECIFIED.to_string(),
            dosage: Dosage::default(),
            other_medicinal_product: NOT_SPECIFIED.to_string(),
            devices: Vec::new(),
            characteristics: Vec::new(),
            routes: Vec::new(),
            all_substances_chemicals: NOT_SPECIFIED.to_string(),
            product_display_name: NOT_SPECIFIED.to_string(),
            json_active_substance_names: NOT_SPECIFIED.to_string(),
            pharmaceutical_form_display: NOT_SPECIFIED.to_string(),
        }
    }
}

/// Trial objectives: one main objective plus secondary objectives and the
/// registry's trial-scope codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialObjective {
    pub main_objective: String,
    pub secondary_objectives: Vec<String>,
    pub trial_scopes: Vec<String>,
}

impl Default for TrialObjective {
    fn default() -> Self {
        Self {
            main_objective: NOT_SPECIFIED.to_string(),
            secondary_objectives: Vec::new(),
            trial_scopes: Vec::new(),
        }
    }
}

/// Primary and secondary endpoint texts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoints {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

/// The deeply nested `trialDetails` object, flattened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialDetails {
    pub full_title: String,
    pub trial_category: String,
    pub medical_conditions: Vec<String>,
    pub meddra_terms: Vec<String>,
    pub objective: TrialObjective,
    pub inclusion_criteria: Vec<String>,
    pub exclusion_criteria: Vec<String>,
    pub endpoints: Endpoints,
    pub trial_duration: String,
    pub population: String,
    pub participant_data: String,
    pub protocol_info: String,
    pub scientific_advice: String,
}

impl Default for TrialDetails {
    fn default() -> Self {
        Self {
            full_title: NOT_SPECIFIED.to_string(),
            trial_category: NOT_SPECIFIED.to_string(),
            medical_conditions: Vec::new(),
            meddra_terms: Vec::new(),
            objective: TrialObjective::default(),
            inclusion_criteria: Vec::new(),
            exclusion_criteria: Vec::new(),
            endpoints: Endpoints::default(),
            trial_duration: NOT_SPECIFIED.to_string(),
            population: NOT_SPECIFIED.to_string(),
            participant_data: NOT_SPECIFIED.to_string(),
            protocol_info: NOT_SPECIFIED.to_string(),
            scientific_advice: NOT_SPECIFIED.to_string(),
        }
    }
}

impl TrialDetails {
    pub fn is_empty(&self) -> bool {
        self.full_title == NOT_SPECIFIED
            && self.trial_category == NOT_SPECIFIED
            && self.medical_conditions.is_empty()
            && self.meddra_terms.is_empty()
            && self.objective.main_objective == NOT_SPECIFIED
            && self.objective.secondary_objectives.is_empty()
            && self.objective.trial_scopes.is_empty()
            && self.inclusion_criteria.is_empty()
            && self.exclusion_criteria.is_empty()
            && self.endpoints.primary.is_empty()
            && self.endpoints.secondary.is_empty()
            && self.trial_duration == NOT_SPECIFIED
            && self.population == NOT_SPECIFIED
            && self.participant_data == NOT_SPECIFIED
            && self.protocol_info == NOT_SPECIFIED
            && self.scientific_advice == NOT_SPECIFIED
    }
}

/// A sponsor contact (public or scientific).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub org_name: String,
    pub email: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            org_name: UNKNOWN.to_string(),
            email: NO_EMAIL.to_string(),
        }
    }
}

/// A third party acting for a sponsor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThirdParty {
    pub org_type: String,
    pub org_name: String,
    pub email: String,
}

impl Default for ThirdParty {
    fn default() -> Self {
        Self {
            org_type: UNKNOWN.to_string(),
            org_name: UNKNOWN.to_string(),
            email: NO_EMAIL.to_string(),
        }
    }
}

/// One sponsor with its contact lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
    pub public_contacts: Vec<Contact>,
    pub scientific_contacts: Vec<Contact>,
    pub third_parties: Vec<ThirdParty>,
}

impl Default for Sponsor {
    fn default() -> Self {
        Self {
            name: NOT_SPECIFIED.to_string(),
            public_contacts: Vec::new(),
            scientific_contacts: Vec::new(),
            third_parties: Vec::new(),
        }
    }
}

/// A therapeutic-area (code, name) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapeuticArea {
    pub code: String,
    pub name: String,
}

/// A product-role descriptor with an optional free-text comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRole {
    pub code: String,
    pub name: String,
    pub comment: Option<String>,
}

/// Trial category code, justification, and classification lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDetails {
    pub category_code: String,
    pub justification: String,
    pub therapeutic_areas: Vec<TherapeuticArea>,
    pub product_roles: Vec<ProductRole>,
}

impl Default for CategoryDetails {
    fn default() -> Self {
        Self {
            category_code: NOT_SPECIFIED.to_string(),
            justification: NOT_SPECIFIED.to_string(),
            therapeutic_areas: Vec::new(),
            product_roles: Vec::new(),
        }
    }
}

impl CategoryDetails {
    pub fn is_empty(&self) -> bool {
        self.category_code == NOT_SPECIFIED
            && self.justification == NOT_SPECIFIED
            && self.therapeutic_areas.is_empty()
            && self.product_roles.is_empty()
    }
}

/// A trial site within one member state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSite {
    pub org_name: String,
    pub country: String,
    pub email: String,
}

impl Default for TrialSite {
    fn default() -> Self {
        Self {
            org_name: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            email: NO_EMAIL.to_string(),
        }
    }
}

/// Per-member-state authorization status. Sites are stored unbounded; the
/// renderer truncates display to the first 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedPart {
    pub member_state: String,
    pub trial_status: String,
    pub recruitment_started: String,
    pub decision_date: String,
    pub subject_count: String,
    pub trial_sites: Vec<TrialSite>,
}

impl Default for AuthorizedPart {
    fn default() -> Self {
        Self {
            member_state: NOT_SPECIFIED.to_string(),
            trial_status: NOT_SPECIFIED.to_string(),
            recruitment_started: NOT_SPECIFIED.to_string(),
            decision_date: NOT_SPECIFIED.to_string(),
            subject_count: NOT_SPECIFIED.to_string(),
            trial_sites: Vec::new(),
        }
    }
}

/// A trial event reported by one member state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialEvent {
    pub member_state: String,
    pub events: String,
}

/// A published document attached to the trial record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub uuid: String,
}

/// Events and documents; documents are stored unbounded and truncated to 5
/// at display time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsAndDocuments {
    pub trial_events: Vec<TrialEvent>,
    pub documents: Vec<Document>,
}

impl EventsAndDocuments {
    pub fn is_empty(&self) -> bool {
        self.trial_events.is_empty() && self.documents.is_empty()
    }
}

/// The registry-agnostic intermediate record produced by the EU extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedTrialRecord {
    pub basic_info: BasicInfo,
    pub countries: Vec<String>,
    pub products: Vec<Product>,
    pub trial_details: TrialDetails,
    pub sponsors: Vec<Sponsor>,
    pub category_details: CategoryDetails,
    pub authorized_parts: Vec<AuthorizedPart>,
    pub events_and_documents: EventsAndDocuments,
}
