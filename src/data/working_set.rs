use std::collections::BTreeSet;

use log::{info, warn};

use super::model::{Record, StagingTable};

// ---------------------------------------------------------------------------
// WorkingSet – the immutable analysis snapshot
// ---------------------------------------------------------------------------

/// Read-only snapshot of the cleaned table, the only input the aggregator
/// sees. Construction checks that the snapshot kept the `row_id` key
/// property of its source; if the copy lost uniqueness somewhere, ids are
/// re-derived deterministically in table order.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    records: Vec<Record>,
}

impl WorkingSet {
    pub fn snapshot(staging: StagingTable) -> Self {
        let mut records = staging.records;

        let mut seen = BTreeSet::new();
        let unique = records.iter().all(|r| seen.insert(r.row_id));
        if !unique {
            warn!("snapshot lost row_id uniqueness, re-deriving ids");
            for (i, rec) in records.iter_mut().enumerate() {
                rec.row_id = (i + 1) as u32;
            }
        }

        info!("working set: {} records", records.len());
        WorkingSet { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
