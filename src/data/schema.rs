use log::info;

use super::model::{RawTable, Record, StagingTable};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

/// Fixed rename lookup: raw header (after BOM stripping and trimming) to
/// canonical lowercase, underscore-separated name.
const RENAMES: &[(&str, &str)] = &[
    ("Age", "age"),
    ("Gender", "gender"),
    ("Education Level", "education_level"),
    ("Job Title", "job_title"),
    ("Years of Experience", "years_of_experience"),
    ("Salary", "salary"),
];

/// Column positions of the six logical fields within a raw row.
struct ColumnIndex {
    age: usize,
    gender: usize,
    education_level: usize,
    job_title: usize,
    years_of_experience: usize,
    salary: usize,
}

fn resolve_columns(raw: &RawTable) -> Result<ColumnIndex, PipelineError> {
    let mut positions: [Option<usize>; 6] = [None; 6];

    for (pos, header) in raw.headers().iter().enumerate() {
        let canonical = RENAMES
            .iter()
            .find(|(from, _)| *from == header.trim())
            .map(|(_, to)| *to);
        match canonical {
            Some(name) => {
                let slot = RENAMES.iter().position(|(_, to)| *to == name).unwrap();
                if positions[slot].is_some() {
                    return Err(PipelineError::load(
                        raw.source(),
                        format!("duplicate column '{header}'"),
                    ));
                }
                positions[slot] = Some(pos);
            }
            None => {
                return Err(PipelineError::load(
                    raw.source(),
                    format!("unexpected column '{header}'"),
                ));
            }
        }
    }

    for (slot, pos) in positions.iter().enumerate() {
        if pos.is_none() {
            return Err(PipelineError::load(
                raw.source(),
                format!("missing column '{}'", RENAMES[slot].0),
            ));
        }
    }

    Ok(ColumnIndex {
        age: positions[0].unwrap(),
        gender: positions[1].unwrap(),
        education_level: positions[2].unwrap(),
        job_title: positions[3].unwrap(),
        years_of_experience: positions[4].unwrap(),
        salary: positions[5].unwrap(),
    })
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Parse an integer cell that may carry a float rendering ("32.0" → 32).
fn parse_integer(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(i) = cell.parse::<i64>() {
        return Some(i);
    }
    // Exports from float-typed columns render whole numbers as "32.0".
    match cell.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
        _ => None,
    }
}

fn required_int(
    cell: &str,
    row: usize,
    column: &'static str,
) -> Result<i64, PipelineError> {
    parse_integer(cell).ok_or_else(|| PipelineError::TypeCoercion {
        row,
        column,
        value: cell.to_string(),
    })
}

fn optional_int(
    cell: &str,
    row: usize,
    column: &'static str,
) -> Result<Option<i64>, PipelineError> {
    if cell.trim().is_empty() {
        return Ok(None);
    }
    required_int(cell, row, column).map(Some)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Produce the normalized staging table from the raw load.
///
/// Renames columns to the canonical scheme, coerces every cell to its
/// declared type, and assigns `row_id` = 1..=n in source row order. The raw
/// table is never mutated. String cells are kept verbatim here; blank-to-null
/// normalization is the cleaner's first step.
pub fn normalize(raw: &RawTable) -> Result<StagingTable, PipelineError> {
    let cols = resolve_columns(raw)?;

    let mut records = Vec::with_capacity(raw.len());
    for (i, row) in raw.rows().iter().enumerate() {
        let row_no = i + 1;

        let age = required_int(&row[cols.age], row_no, "age")? as i32;
        let gender = row[cols.gender].trim().to_string();
        if gender.is_empty() {
            return Err(PipelineError::TypeCoercion {
                row: row_no,
                column: "gender",
                value: row[cols.gender].clone(),
            });
        }

        records.push(Record {
            row_id: row_no as u32,
            age,
            gender,
            education_level: Some(row[cols.education_level].clone()),
            job_title: Some(row[cols.job_title].clone()),
            years_of_experience: optional_int(
                &row[cols.years_of_experience],
                row_no,
                "years_of_experience",
            )?
            .map(|v| v as i32),
            salary: optional_int(&row[cols.salary], row_no, "salary")?,
        });
    }

    info!("normalized {} records", records.len());
    Ok(StagingTable::new(records))
}
