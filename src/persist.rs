use crate::calc::Grade;
use crate::store::{self, RecordStore, StudentRecord};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DATA_FILE_NAME: &str = "student_data.json";

/// On-disk record shape: one JSON document mapping student id (string key)
/// to this object, keys sorted, indented. Field names here are the file
/// format and must not drift.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    name: String,
    marks: BTreeMap<String, f64>,
    total_marks: f64,
    percentage: f64,
    grade: Grade,
}

pub fn data_file_path(workspace: &Path) -> PathBuf {
    workspace.join(DATA_FILE_NAME)
}

/// Serialize the whole store and install it over the data file. The document
/// is completed in memory and written to a temporary sibling first, so the
/// prior file contents survive any failure.
pub fn save_store(workspace: &Path, store: &RecordStore) -> anyhow::Result<PathBuf> {
    let mut doc: BTreeMap<String, PersistedRecord> = BTreeMap::new();
    for record in store.iter() {
        doc.insert(
            record.student_id.to_string(),
            PersistedRecord {
                name: record.name.clone(),
                marks: record.marks.clone(),
                total_marks: record.total_marks,
                percentage: record.percentage,
                grade: record.grade,
            },
        );
    }

    let text = serde_json::to_string_pretty(&doc).context("failed to serialize student data")?;

    let path = data_file_path(workspace);
    let tmp = workspace.join(format!("{}.saving", DATA_FILE_NAME));
    std::fs::write(&tmp, text.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.to_string_lossy()))?;
    std::fs::rename(&tmp, &path)
        .with_context(|| format!("failed to install {}", path.to_string_lossy()))?;

    Ok(path)
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// No data file exists yet. Informational, not an error.
    Missing,
    Loaded(BTreeMap<u32, StudentRecord>),
}

/// Parse and validate the whole data file. Any malformed entry fails the
/// load before a single record is produced, so callers can replace their
/// store atomically. Derived fields are recomputed from the parsed marks
/// rather than trusted from the file.
pub fn load_store(workspace: &Path) -> anyhow::Result<LoadOutcome> {
    let path = data_file_path(workspace);
    if !path.is_file() {
        return Ok(LoadOutcome::Missing);
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
    let doc: BTreeMap<String, PersistedRecord> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid student data file", path.to_string_lossy()))?;

    let mut records: BTreeMap<u32, StudentRecord> = BTreeMap::new();
    for (key, persisted) in doc {
        let student_id: u32 = key
            .parse()
            .map_err(|_| anyhow!("record key {:?} is not a positive integer id", key))?;
        store::validate_student_id(student_id)
            .map_err(|e| anyhow!("record key {:?}: {}", key, e.message))?;

        let name = store::validate_name(&persisted.name)
            .map_err(|e| anyhow!("record {}: {}", student_id, e.message))?;
        for (subject, mark) in &persisted.marks {
            store::validate_mark(subject, *mark)
                .map_err(|e| anyhow!("record {}: {}", student_id, e.message))?;
        }

        // Distinct string keys like "7" and "07" collapse to one id.
        if records
            .insert(
                student_id,
                StudentRecord::new(student_id, name, persisted.marks),
            )
            .is_some()
        {
            return Err(anyhow!("duplicate student id {} in data file", student_id));
        }
    }

    Ok(LoadOutcome::Loaded(records))
}
