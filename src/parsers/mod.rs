//! Registry-record normalization: safe JSON traversal, the EU extractor,
//! and the text renderers for both registries.

pub mod ctgov;
pub mod ctis;
pub mod value;

pub use ctgov::{format_study_batch, render_study};
pub use ctis::{extract_trial_record, format_search_summary, render_trial_record, trial_summary};
