use std::collections::BTreeMap;

use log::{info, warn};

use super::model::StagingTable;
use crate::error::PipelineError;

/// Minimum plausible working age; experience exceeding `age - 16` marks a
/// record as implausible.
pub const MIN_WORKING_AGE: i32 = 16;

/// Salaries below this floor are sentinel/garbage values, nulled out.
pub const SALARY_FLOOR: i64 = 10_000;

/// Salaries above this are logged for inspection but kept.
pub const SALARY_INSPECT_CEILING: i64 = 500_000;

// ---------------------------------------------------------------------------
// Rewrite maps
// ---------------------------------------------------------------------------

/// An exact-string category rewrite map (raw variant → canonical label).
///
/// Validated on construction: duplicate keys, identity entries, and keys that
/// are themselves another entry's target are rejected, since any of them
/// would make a second application differ from the first.
#[derive(Debug, Clone)]
pub struct RewriteMap {
    name: &'static str,
    entries: BTreeMap<String, String>,
}

impl RewriteMap {
    pub fn new(
        name: &'static str,
        pairs: &[(&str, &str)],
    ) -> Result<Self, PipelineError> {
        let mut entries = BTreeMap::new();
        for (from, to) in pairs {
            if from == to {
                return Err(PipelineError::Configuration(format!(
                    "{name}: identity entry '{from}'"
                )));
            }
            if entries.insert(from.to_string(), to.to_string()).is_some() {
                return Err(PipelineError::Configuration(format!(
                    "{name}: duplicate key '{from}'"
                )));
            }
        }
        // A target that is also a key would be rewritten again on a rerun.
        for to in entries.values() {
            if entries.contains_key(to) {
                return Err(PipelineError::Configuration(format!(
                    "{name}: target '{to}' is also a key"
                )));
            }
        }
        Ok(RewriteMap { name, entries })
    }

    /// Canonical label for `value`, or `value` itself when unmapped.
    /// Unmapped variants deliberately pass through verbatim.
    pub fn apply(&self, value: &str) -> Option<&str> {
        self.entries.get(value).map(|s| s.as_str())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

// ---------------------------------------------------------------------------
// Cleaning rules
// ---------------------------------------------------------------------------

/// The full cleaning rule set, validated before any row is touched.
#[derive(Debug, Clone)]
pub struct CleaningRules {
    pub education: RewriteMap,
    pub job_title: RewriteMap,
}

impl CleaningRules {
    /// The standard rule set for the salary dataset.
    pub fn standard() -> Result<Self, PipelineError> {
        Ok(CleaningRules {
            education: RewriteMap::new(
                "education_level rewrites",
                &[
                    ("Bachelor's Degree", "Bachelor's"),
                    ("Master's Degree", "Master's"),
                    ("phD", "PhD"),
                ],
            )?,
            job_title: RewriteMap::new(
                "job_title rewrites",
                &[
                    ("Juniour HR Coordinator", "Junior HR Coordinator"),
                    ("Juniour HR Generalist", "Junior HR Generalist"),
                    ("Social M", "Social Media Specialist"),
                ],
            )?,
        })
    }
}

// ---------------------------------------------------------------------------
// Cleaning steps
// ---------------------------------------------------------------------------
//
// Order matters: later steps assume earlier ones ran. Each step consumes the
// table and returns it, so the pipeline reads as one chain and no stage sees
// a half-cleaned table. Every step is idempotent.

impl StagingTable {
    /// Step 1: string fields whose trimmed value is empty become null.
    fn normalize_blanks(mut self) -> Self {
        for rec in &mut self.records {
            for field in [&mut rec.education_level, &mut rec.job_title] {
                if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
                    *field = None;
                }
            }
        }
        self
    }

    /// Step 2: unify education-level variants.
    fn unify_education(mut self, map: &RewriteMap) -> Self {
        let mut rewritten = 0usize;
        for rec in &mut self.records {
            rewritten += rewrite_field(&mut rec.education_level, map);
        }
        if rewritten > 0 {
            info!("{}: rewrote {rewritten} values", map.name());
        }
        self
    }

    /// Step 3: trim leading/trailing whitespace on job titles.
    fn trim_job_titles(mut self) -> Self {
        for rec in &mut self.records {
            if let Some(title) = &rec.job_title {
                let trimmed = title.trim();
                if trimmed.len() != title.len() {
                    rec.job_title = Some(trimmed.to_string());
                }
            }
        }
        self
    }

    /// Step 4: unify known job-title typos/variants. Runs after trimming so
    /// the map only needs exact canonical-whitespace keys.
    fn unify_job_titles(mut self, map: &RewriteMap) -> Self {
        let mut rewritten = 0usize;
        for rec in &mut self.records {
            rewritten += rewrite_field(&mut rec.job_title, map);
        }
        if rewritten > 0 {
            info!("{}: rewrote {rewritten} values", map.name());
        }
        self
    }

    /// Step 5: hard-delete records whose experience predates the minimum
    /// working age. Deleted `row_id`s are never reassigned.
    fn drop_implausible_experience(mut self) -> Self {
        let before = self.records.len();
        self.records.retain(|rec| {
            rec.years_of_experience
                .map_or(true, |exp| exp <= rec.age - MIN_WORKING_AGE)
        });
        let dropped = before - self.records.len();
        if dropped > 0 {
            info!("dropped {dropped} records with implausible experience");
        }
        self
    }

    /// Step 6: null out sub-floor salaries; the record itself is kept since
    /// its other fields remain usable. High salaries are only inspected.
    fn suppress_salary_outliers(mut self) -> Self {
        let mut suppressed = 0usize;
        for rec in &mut self.records {
            match rec.salary {
                Some(s) if s < SALARY_FLOOR => {
                    rec.salary = None;
                    suppressed += 1;
                }
                Some(s) if s > SALARY_INSPECT_CEILING => {
                    warn!(
                        "row {}: salary {s} above inspection ceiling, keeping",
                        rec.row_id
                    );
                }
                _ => {}
            }
        }
        if suppressed > 0 {
            info!("suppressed {suppressed} sub-floor salaries");
        }
        self
    }
}

/// Apply a rewrite map to one nullable string field; returns 1 if rewritten.
fn rewrite_field(field: &mut Option<String>, map: &RewriteMap) -> usize {
    if let Some(value) = field.as_deref() {
        if let Some(canonical) = map.apply(value) {
            *field = Some(canonical.to_string());
            return 1;
        }
    }
    0
}

/// Run the full cleaning sequence over a normalized table.
///
/// Individual bad rows never abort the run; they are nulled, unified, or
/// deleted per the rules above. The only fatal condition is an inconsistent
/// rule set, which [`RewriteMap::new`] rejects before cleaning starts.
pub fn clean(table: StagingTable, rules: &CleaningRules) -> StagingTable {
    let cleaned = table
        .normalize_blanks()
        .unify_education(&rules.education)
        .trim_job_titles()
        .unify_job_titles(&rules.job_title)
        .drop_implausible_experience()
        .suppress_salary_outliers();
    info!("{} records after cleaning", cleaned.len());
    cleaned
}
