//! Append-only history of allocation decisions
//!
//! One record per attempt routed through the dispatcher, success or failure
//! alike, kept for later inspection and JSON export.

use crate::block::FileId;
use crate::dispatch::{AllocationOutcome, Method};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One allocation attempt's outcome, as persisted for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// File the attempt was made for
    pub file_id: FileId,
    /// Method the tier table selected; `None` when the request was rejected
    /// before dispatch
    pub method: Option<Method>,
    /// Rendered description, stored verbatim for success and failure alike
    pub description: String,
    /// When the attempt was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Append-only allocation history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationLog {
    records: Vec<AllocationRecord>,
}

impl AllocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record for `outcome`, timestamped now
    pub fn record(&mut self, file_id: FileId, outcome: &AllocationOutcome) {
        self.records.push(AllocationRecord {
            file_id,
            method: outcome.method(),
            description: outcome.to_string(),
            recorded_at: Utc::now(),
        });
    }

    /// All records, oldest first
    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    /// Records for one file, oldest first
    pub fn for_file(&self, file_id: FileId) -> impl Iterator<Item = &AllocationRecord> {
        self.records.iter().filter(move |r| r.file_id == file_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Export the full history as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Placement;
    use crate::dispatch::Method;

    fn allocated_outcome() -> AllocationOutcome {
        AllocationOutcome::Allocated {
            method: Method::Linked,
            placement: Placement::Linked {
                blocks: vec![0, 1, 2],
            },
        }
    }

    #[test]
    fn test_record_captures_description_and_method() {
        let mut log = AllocationLog::new();
        log.record(FileId(1), &allocated_outcome());

        assert_eq!(log.len(), 1);
        let record = &log.records()[0];
        assert_eq!(record.file_id, FileId(1));
        assert_eq!(record.method, Some(Method::Linked));
        assert_eq!(record.description, "Linked allocation using blocks [0, 1, 2]");
    }

    #[test]
    fn test_for_file_filters_by_id() {
        let mut log = AllocationLog::new();
        log.record(FileId(1), &allocated_outcome());
        log.record(FileId(2), &allocated_outcome());
        log.record(FileId(1), &allocated_outcome());

        assert_eq!(log.for_file(FileId(1)).count(), 2);
        assert_eq!(log.for_file(FileId(3)).count(), 0);
    }

    #[test]
    fn test_to_json_round_trips() {
        let mut log = AllocationLog::new();
        log.record(FileId(5), &allocated_outcome());

        let json = log.to_json().unwrap();
        let parsed: Vec<AllocationRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, log.records());
    }
}
