//! Saved cup state
//!
//! One JSON record per line, keyed by a schema version. Records from another
//! schema version are discarded silently (no migration); corrupt lines are
//! skipped so one bad record never loses the rest of the cup.

use bitcup_core::BitRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Bit record schema version.
pub const BIT_RECORD_VERSION: u32 = 4;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save io: {0}")]
    Io(#[from] std::io::Error),
    #[error("save serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct VersionedRecord {
    version: u32,
    #[serde(flatten)]
    record: BitRecord,
}

/// Write every pool slot's record, active or not, one per line.
pub fn save_bits(path: &Path, records: &[BitRecord]) -> Result<(), SaveError> {
    let mut file = fs::File::create(path)?;
    for record in records {
        let line = serde_json::to_string(&VersionedRecord {
            version: BIT_RECORD_VERSION,
            record: record.clone(),
        })?;
        writeln!(file, "{line}")?;
    }
    tracing::info!(?path, count = records.len(), "cup state saved");
    Ok(())
}

/// Read back whatever records are usable. Missing file is an error the
/// caller can treat as "nothing to restore"; bad lines are not.
pub fn load_bits(path: &Path) -> Result<Vec<BitRecord>, SaveError> {
    let text = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<VersionedRecord>(line) {
            Ok(versioned) if versioned.version == BIT_RECORD_VERSION => {
                records.push(versioned.record);
            }
            Ok(versioned) => {
                tracing::debug!(
                    line = number + 1,
                    found = versioned.version,
                    "skipping record with mismatched schema version"
                );
            }
            Err(err) => {
                tracing::warn!(line = number + 1, %err, "skipping corrupt save record");
            }
        }
    }
    Ok(records)
}
