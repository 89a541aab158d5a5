use std::path::Path;

use log::info;

use super::model::RawTable;
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the raw salary dataset from a delimited file.
///
/// Cells are kept as verbatim strings; typing happens in the schema
/// normalizer. Fails with [`PipelineError::Load`] on an unreadable file, an
/// empty header row, or a row whose field count disagrees with the header.
pub fn load_csv(path: &Path) -> Result<RawTable, PipelineError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| PipelineError::load(path, e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::load(path, format!("reading header row: {e}")))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            // Exported files sometimes carry a byte-order mark glued onto the
            // first header name; strip it so the column is still recognized.
            if i == 0 {
                strip_bom(h).to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(PipelineError::load(path, "empty header row"));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        // The csv reader rejects ragged rows itself (UnequalLengths).
        let record = result
            .map_err(|e| PipelineError::load(path, format!("row {}: {e}", row_no + 1)))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    info!("loaded {} raw rows from {}", rows.len(), path.display());
    Ok(RawTable::new(path, headers, rows))
}

fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn strips_bom_from_first_header() {
        let f = write_temp(
            "\u{feff}Age,Gender,Education Level,Job Title,Years of Experience,Salary\n\
             32,Male,Bachelor's,Software Engineer,5,90000\n",
        );
        let table = load_csv(f.path()).unwrap();
        assert_eq!(table.headers()[0], "Age");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn ragged_row_is_a_load_error() {
        let f = write_temp("Age,Gender\n32,Male,extra\n");
        let err = load_csv(f.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_csv(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
    }
}
