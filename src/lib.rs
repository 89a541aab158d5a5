pub mod data;
pub mod error;
pub mod report;

use std::path::Path;

use data::clean::{clean, CleaningRules};
use data::loader::load_csv;
use data::schema::normalize;
use data::working_set::WorkingSet;
use error::PipelineError;
use report::{standard_reports, Report};

/// Run the whole pipeline over one source file and return the standard
/// report set.
///
/// Load → normalize → clean → snapshot → aggregate, strictly forward.
pub fn run(path: &Path) -> Result<Vec<Report>, PipelineError> {
    // An inconsistent rule set must fail before any row is processed.
    let rules = CleaningRules::standard()?;

    let raw = load_csv(path)?;
    let staged = normalize(&raw)?;
    let cleaned = clean(staged, &rules);
    let working_set = WorkingSet::snapshot(cleaned);

    Ok(standard_reports(&working_set))
}
