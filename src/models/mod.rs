//! Core data structures: the normalized trial record and tool requests.

mod search;
mod trial;

pub use search::{TrialSearchRequest, TrialStatus, DEFAULT_STATUS_CODE, DEFAULT_TRIAL_COUNT};
pub use trial::{
    AuthorizedPart, BasicInfo, CategoryDetails, Contact, Document, Dosage, Endpoints,
    EventsAndDocuments, NormalizedTrialRecord, Product, ProductInfo, ProductRole, Sponsor,
    TherapeuticArea, ThirdParty, TrialDetails, TrialEvent, TrialObjective, TrialSite,
    NOT_SPECIFIED, NO_EMAIL, UNKNOWN,
};
