// ---------------------------------------------------------------------------
// Record – one employee row after schema normalization
// ---------------------------------------------------------------------------

/// A single employee record (one row of the normalized table).
///
/// Nullable fields use `Option`; `salary: None` means suppressed/invalid,
/// never a true zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Surrogate key: dense, strictly increasing, assigned in source row
    /// order starting at 1. Never reused once a row is deleted.
    pub row_id: u32,
    pub age: i32,
    pub gender: String,
    pub education_level: Option<String>,
    pub job_title: Option<String>,
    pub years_of_experience: Option<i32>,
    pub salary: Option<i64>,
}

// ---------------------------------------------------------------------------
// RawTable – the loader's untyped view of the source file
// ---------------------------------------------------------------------------

/// The source file as loaded: original header names and untyped string
/// cells. Read-only after construction; the normalizer builds a typed table
/// from it without touching it.
#[derive(Debug, Clone)]
pub struct RawTable {
    source: std::path::PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(
        source: impl Into<std::path::PathBuf>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        RawTable {
            source: source.into(),
            headers,
            rows,
        }
    }

    /// Path the table was loaded from, for error reporting.
    pub fn source(&self) -> &std::path::Path {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// StagingTable – the mutable table the cleaner works on
// ---------------------------------------------------------------------------

/// Intermediate cleaned-but-not-yet-snapshotted dataset. Each pipeline stage
/// consumes the previous table by value and returns a new one, so there is
/// never a shared mutable table between stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingTable {
    pub records: Vec<Record>,
}

impl StagingTable {
    pub fn new(records: Vec<Record>) -> Self {
        StagingTable { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
