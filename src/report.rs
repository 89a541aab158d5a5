use std::collections::BTreeMap;
use std::io::Write;

use log::debug;
use serde::Serialize;

use crate::data::model::Record;
use crate::data::working_set::WorkingSet;

// ---------------------------------------------------------------------------
// Age banding
// ---------------------------------------------------------------------------

/// A fixed age band: display label plus a sort key (the band's minimum age)
/// so bands order numerically, not by label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBand {
    pub label: &'static str,
    pub sort_key: i32,
}

/// Map an age to its band. Total over all inputs; ages below the plausible
/// range fall into a catch-all bottom band.
pub fn age_band(age: i32) -> AgeBand {
    let (label, sort_key) = match age {
        i32::MIN..=17 => ("under 18", 0),
        18..=24 => ("18-24", 18),
        25..=34 => ("25-34", 25),
        35..=44 => ("35-44", 35),
        45..=54 => ("45-54", 45),
        55..=64 => ("55-64", 55),
        _ => ("65+", 65),
    };
    AgeBand { label, sort_key }
}

// ---------------------------------------------------------------------------
// Group specification
// ---------------------------------------------------------------------------

/// A grouping key extracted from one record: one part per key column, plus
/// an optional numeric sort key for bucketed keys.
#[derive(Debug, Clone)]
pub struct GroupKey {
    pub parts: Vec<String>,
    pub sort_key: Option<i64>,
}

impl GroupKey {
    pub fn single(part: impl Into<String>) -> Self {
        GroupKey {
            parts: vec![part.into()],
            sort_key: None,
        }
    }
}

/// How a report's groups are ordered.
#[derive(Debug, Clone)]
pub enum GroupOrder {
    /// Lexicographic on the key parts (default).
    KeyAscending,
    /// Explicit label order for categorical keys with a natural
    /// non-alphabetical order; unlisted labels sort after listed ones.
    Explicit(Vec<String>),
    /// By the key's numeric sort key (bucketed keys such as age bands).
    BySortKey,
    /// By mean salary descending; enables dense ranking.
    MeanDescending,
}

/// One grouped report specification: key extractor, optional row filter,
/// minimum group size, ordering, and optional top-N truncation for ranked
/// reports.
pub struct GroupSpec {
    pub title: &'static str,
    pub key_columns: Vec<&'static str>,
    pub key: Box<dyn Fn(&Record) -> Option<GroupKey>>,
    pub filter: Option<Box<dyn Fn(&Record) -> bool>>,
    /// Groups with fewer rows are excluded from the report entirely.
    pub min_count: Option<usize>,
    pub order: GroupOrder,
    pub top_n: Option<usize>,
}

impl GroupSpec {
    pub fn new(
        title: &'static str,
        key_columns: Vec<&'static str>,
        key: impl Fn(&Record) -> Option<GroupKey> + 'static,
    ) -> Self {
        GroupSpec {
            title,
            key_columns,
            key: Box::new(key),
            filter: None,
            min_count: None,
            order: GroupOrder::KeyAscending,
            top_n: None,
        }
    }

    pub fn filter(mut self, f: impl Fn(&Record) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(f));
        self
    }

    pub fn min_count(mut self, n: usize) -> Self {
        self.min_count = Some(n);
        self
    }

    pub fn order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }
}

// ---------------------------------------------------------------------------
// Report output
// ---------------------------------------------------------------------------

/// One row of a report table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportRow {
    pub keys: Vec<String>,
    pub employee_count: usize,
    pub avg_salary: i64,
    pub salary_std: i64,
    pub min_salary: i64,
    pub max_salary: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_salary_rank: Option<u32>,
}

/// A finished report, exposable as plain CSV or JSON for the BI tool.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: &'static str,
    pub key_columns: Vec<&'static str>,
    pub ranked: bool,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = self.key_columns.clone();
        header.extend([
            "employee_count",
            "avg_salary",
            "salary_std",
            "min_salary",
            "max_salary",
        ]);
        if self.ranked {
            header.push("avg_salary_rank");
        }
        out.write_record(&header)?;

        for row in &self.rows {
            let mut cells: Vec<String> = row.keys.clone();
            cells.push(row.employee_count.to_string());
            cells.push(row.avg_salary.to_string());
            cells.push(row.salary_std.to_string());
            cells.push(row.min_salary.to_string());
            cells.push(row.max_salary.to_string());
            if self.ranked {
                cells.push(
                    row.avg_salary_rank
                        .map(|r| r.to_string())
                        .unwrap_or_default(),
                );
            }
            out.write_record(&cells)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

struct GroupAccum {
    salaries: Vec<i64>,
    rows: usize,
    sort_key: Option<i64>,
}

/// Compute one grouped report over the working set.
pub fn aggregate(working_set: &WorkingSet, spec: &GroupSpec) -> Report {
    let mut groups: BTreeMap<Vec<String>, GroupAccum> = BTreeMap::new();

    for rec in working_set.records() {
        if let Some(f) = &spec.filter {
            if !f(rec) {
                continue;
            }
        }
        // Records without a key value are skipped, not bucketed.
        let Some(GroupKey { parts, sort_key }) = (spec.key)(rec) else {
            continue;
        };

        let accum = groups.entry(parts).or_insert_with(|| GroupAccum {
            salaries: Vec::new(),
            rows: 0,
            sort_key,
        });
        accum.rows += 1;
        if let Some(s) = rec.salary {
            accum.salaries.push(s);
        }
    }

    let mut rows: Vec<(Option<i64>, f64, ReportRow)> = Vec::new();
    for (parts, accum) in groups {
        if let Some(min) = spec.min_count {
            if accum.rows < min {
                continue;
            }
        }
        if accum.salaries.is_empty() {
            debug!("{}: group {parts:?} has no salaries, skipped", spec.title);
            continue;
        }

        let mean = mean(&accum.salaries);
        rows.push((
            accum.sort_key,
            mean,
            ReportRow {
                keys: parts,
                employee_count: accum.rows,
                avg_salary: mean.round() as i64,
                salary_std: sample_std(&accum.salaries, mean).round() as i64,
                min_salary: *accum.salaries.iter().min().unwrap(),
                max_salary: *accum.salaries.iter().max().unwrap(),
                avg_salary_rank: None,
            },
        ));
    }

    let ranked = matches!(spec.order, GroupOrder::MeanDescending);
    order_rows(&mut rows, &spec.order);
    let mut rows: Vec<ReportRow> = rows.into_iter().map(|(_, _, row)| row).collect();

    if ranked {
        assign_dense_ranks(&mut rows);
        if let Some(n) = spec.top_n {
            rows.truncate(n);
        }
    }

    Report {
        title: spec.title,
        key_columns: spec.key_columns.clone(),
        ranked,
        rows,
    }
}

fn mean(values: &[i64]) -> f64 {
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

/// Sample standard deviation (ddof = 1); zero for singleton groups.
fn sample_std(values: &[i64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

fn order_rows(rows: &mut [(Option<i64>, f64, ReportRow)], order: &GroupOrder) {
    match order {
        // BTreeMap iteration already yielded key-ascending order.
        GroupOrder::KeyAscending => {}
        GroupOrder::Explicit(labels) => {
            rows.sort_by_key(|(_, _, row)| {
                let label = row.keys.first().map(String::as_str).unwrap_or("");
                labels
                    .iter()
                    .position(|l| l == label)
                    .unwrap_or(labels.len())
            });
        }
        GroupOrder::BySortKey => {
            rows.sort_by_key(|(sort_key, _, _)| sort_key.unwrap_or(i64::MAX));
        }
        GroupOrder::MeanDescending => {
            rows.sort_by(|(_, a, _), (_, b, _)| b.total_cmp(a));
        }
    }
}

/// Dense ranking on rounded mean salary: ties share a rank and the next
/// distinct value takes the next integer (90k, 90k, 80k → 1, 1, 2).
fn assign_dense_ranks(rows: &mut [ReportRow]) {
    let mut rank = 0u32;
    let mut prev: Option<i64> = None;
    for row in rows.iter_mut() {
        if prev != Some(row.avg_salary) {
            rank += 1;
            prev = Some(row.avg_salary);
        }
        row.avg_salary_rank = Some(rank);
    }
}

// ---------------------------------------------------------------------------
// Standard report set
// ---------------------------------------------------------------------------

/// Natural ordering for the unified education levels.
pub const EDUCATION_ORDER: &[&str] = &["High School", "Bachelor's", "Master's", "PhD"];

fn has_salary(rec: &Record) -> bool {
    rec.salary.is_some()
}

/// The fixed set of reports the pipeline produces for the BI tool.
pub fn standard_reports(working_set: &WorkingSet) -> Vec<Report> {
    let specs = vec![
        GroupSpec::new("salary_by_gender", vec!["gender"], |r| {
            Some(GroupKey::single(r.gender.clone()))
        })
        .filter(has_salary),
        GroupSpec::new("salary_by_education", vec!["education_level"], |r| {
            r.education_level.clone().map(GroupKey::single)
        })
        .filter(has_salary)
        .order(GroupOrder::Explicit(
            EDUCATION_ORDER.iter().map(|s| s.to_string()).collect(),
        )),
        GroupSpec::new("salary_by_age_band", vec!["age_band"], |r| {
            let band = age_band(r.age);
            Some(GroupKey {
                parts: vec![band.label.to_string()],
                sort_key: Some(band.sort_key as i64),
            })
        })
        .filter(has_salary)
        .order(GroupOrder::BySortKey),
        GroupSpec::new(
            "salary_by_gender_education",
            vec!["gender", "education_level"],
            |r| {
                let edu = r.education_level.clone()?;
                Some(GroupKey {
                    parts: vec![r.gender.clone(), edu],
                    sort_key: None,
                })
            },
        )
        .filter(has_salary),
        // Only titles held by more than 20 employees, best-paid first.
        GroupSpec::new("top_job_titles", vec!["job_title"], |r| {
            r.job_title.clone().map(GroupKey::single)
        })
        .filter(has_salary)
        .min_count(21)
        .order(GroupOrder::MeanDescending)
        .top_n(15),
    ];

    specs
        .iter()
        .map(|spec| aggregate(working_set, spec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, StagingTable};

    fn rec(row_id: u32, gender: &str, edu: Option<&str>, salary: Option<i64>) -> Record {
        Record {
            row_id,
            age: 30,
            gender: gender.to_string(),
            education_level: edu.map(String::from),
            job_title: Some("Engineer".to_string()),
            years_of_experience: Some(5),
            salary,
        }
    }

    fn working_set(records: Vec<Record>) -> WorkingSet {
        WorkingSet::snapshot(StagingTable::new(records))
    }

    #[test]
    fn age_bands_have_numeric_sort_keys() {
        assert_eq!(age_band(18).label, "18-24");
        assert_eq!(age_band(24).label, "18-24");
        assert_eq!(age_band(25).label, "25-34");
        assert_eq!(age_band(70).label, "65+");
        assert!(age_band(22).sort_key < age_band(55).sort_key);
    }

    #[test]
    fn computes_count_mean_std_min_max() {
        let ws = working_set(vec![
            rec(1, "Female", None, Some(50_000)),
            rec(2, "Female", None, Some(70_000)),
            rec(3, "Male", None, Some(60_000)),
        ]);
        let spec = GroupSpec::new("by_gender", vec!["gender"], |r| {
            Some(GroupKey::single(r.gender.clone()))
        })
        .filter(has_salary);
        let report = aggregate(&ws, &spec);

        assert_eq!(report.rows.len(), 2);
        let female = &report.rows[0];
        assert_eq!(female.keys, vec!["Female"]);
        assert_eq!(female.employee_count, 2);
        assert_eq!(female.avg_salary, 60_000);
        // sample std of {50000, 70000} = 14142.13…
        assert_eq!(female.salary_std, 14_142);
        assert_eq!(female.min_salary, 50_000);
        assert_eq!(female.max_salary, 70_000);
    }

    #[test]
    fn null_salary_rows_are_filtered_out() {
        let ws = working_set(vec![
            rec(1, "Male", None, Some(60_000)),
            rec(2, "Male", None, None),
        ]);
        let spec = GroupSpec::new("by_gender", vec!["gender"], |r| {
            Some(GroupKey::single(r.gender.clone()))
        })
        .filter(has_salary);
        let report = aggregate(&ws, &spec);
        assert_eq!(report.rows[0].employee_count, 1);
    }

    #[test]
    fn null_key_rows_are_skipped_not_bucketed() {
        let ws = working_set(vec![
            rec(1, "Male", Some("PhD"), Some(60_000)),
            rec(2, "Male", None, Some(70_000)),
        ]);
        let spec = GroupSpec::new("by_education", vec!["education_level"], |r| {
            r.education_level.clone().map(GroupKey::single)
        });
        let report = aggregate(&ws, &spec);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].keys, vec!["PhD"]);
    }

    #[test]
    fn min_count_threshold_is_strict() {
        let mut records = Vec::new();
        let mut id = 0;
        for _ in 0..20 {
            id += 1;
            records.push(rec(id, "Excluded", None, Some(50_000)));
        }
        for _ in 0..21 {
            id += 1;
            records.push(rec(id, "Included", None, Some(50_000)));
        }
        let spec = GroupSpec::new("by_gender", vec!["gender"], |r| {
            Some(GroupKey::single(r.gender.clone()))
        })
        .min_count(21);
        let report = aggregate(&working_set(records), &spec);

        // "more than 20 employees": a group of exactly 20 is excluded.
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].keys, vec!["Included"]);
        assert_eq!(report.rows[0].employee_count, 21);
    }

    #[test]
    fn ties_share_a_dense_rank() {
        let ws = working_set(vec![
            rec(1, "A", None, Some(90_000)),
            rec(2, "B", None, Some(90_000)),
            rec(3, "C", None, Some(80_000)),
        ]);
        let spec = GroupSpec::new("ranked", vec!["gender"], |r| {
            Some(GroupKey::single(r.gender.clone()))
        })
        .order(GroupOrder::MeanDescending);
        let report = aggregate(&ws, &spec);

        let ranks: Vec<u32> = report
            .rows
            .iter()
            .map(|r| r.avg_salary_rank.unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 1, 2]);
    }

    #[test]
    fn explicit_order_beats_alphabetical() {
        let ws = working_set(vec![
            rec(1, "Male", Some("PhD"), Some(90_000)),
            rec(2, "Male", Some("Bachelor's"), Some(60_000)),
            rec(3, "Male", Some("High School"), Some(40_000)),
            rec(4, "Male", Some("Master's"), Some(75_000)),
        ]);
        let spec = GroupSpec::new("by_education", vec!["education_level"], |r| {
            r.education_level.clone().map(GroupKey::single)
        })
        .order(GroupOrder::Explicit(
            EDUCATION_ORDER.iter().map(|s| s.to_string()).collect(),
        ));
        let report = aggregate(&ws, &spec);

        let labels: Vec<&str> = report
            .rows
            .iter()
            .map(|r| r.keys[0].as_str())
            .collect();
        assert_eq!(labels, vec!["High School", "Bachelor's", "Master's", "PhD"]);
    }

    #[test]
    fn age_band_report_orders_by_band_minimum() {
        let mut ws_records = Vec::new();
        for (i, age) in [67, 19, 40].into_iter().enumerate() {
            let mut r = rec(i as u32 + 1, "Male", None, Some(50_000));
            r.age = age;
            ws_records.push(r);
        }
        let reports = standard_reports(&working_set(ws_records));
        let by_band = reports
            .iter()
            .find(|r| r.title == "salary_by_age_band")
            .unwrap();
        let labels: Vec<&str> = by_band.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(labels, vec!["18-24", "35-44", "65+"]);
    }

    #[test]
    fn csv_output_has_rank_column_only_when_ranked() {
        let ws = working_set(vec![rec(1, "A", None, Some(90_000))]);
        let plain = aggregate(
            &ws,
            &GroupSpec::new("plain", vec!["gender"], |r| {
                Some(GroupKey::single(r.gender.clone()))
            }),
        );
        let mut buf = Vec::new();
        plain.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(
            "gender,employee_count,avg_salary,salary_std,min_salary,max_salary\n"
        ));
        assert!(!text.contains("avg_salary_rank"));

        let ranked = aggregate(
            &ws,
            &GroupSpec::new("ranked", vec!["gender"], |r| {
                Some(GroupKey::single(r.gender.clone()))
            })
            .order(GroupOrder::MeanDescending),
        );
        let mut buf = Vec::new();
        ranked.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("avg_salary_rank"));
        assert!(text.lines().nth(1).unwrap().ends_with(",1"));
    }
}
