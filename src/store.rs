use crate::calc::{self, Grade};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct StoreError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StoreError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// One student's identifier, name, marks, and derived grade fields.
///
/// `total_marks`, `percentage`, and `grade` are caches over `marks`: every
/// mutation path rebuilds them through `recompute`, so read paths may rely
/// on them being current.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub student_id: u32,
    pub name: String,
    pub marks: BTreeMap<String, f64>,
    pub total_marks: f64,
    pub percentage: f64,
    pub grade: Grade,
}

impl StudentRecord {
    pub fn new(student_id: u32, name: String, marks: BTreeMap<String, f64>) -> Self {
        let mut record = Self {
            student_id,
            name,
            marks,
            total_marks: 0.0,
            percentage: 0.0,
            grade: Grade::NotAvailable,
        };
        record.recompute();
        record
    }

    pub fn recompute(&mut self) {
        let summary = calc::grade_summary(self.marks.values().copied());
        self.total_marks = summary.total_marks;
        self.percentage = summary.percentage;
        self.grade = summary.grade;
    }
}

pub fn validate_student_id(student_id: u32) -> Result<u32, StoreError> {
    if student_id == 0 {
        return Err(StoreError::new(
            "bad_params",
            "student id must be a positive integer",
        ));
    }
    Ok(student_id)
}

pub fn validate_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::new("bad_params", "student name must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_mark(subject: &str, value: f64) -> Result<(), StoreError> {
    // `contains` also rejects NaN, which slips past plain comparisons.
    if !(0.0..=100.0).contains(&value) {
        return Err(StoreError::new(
            "invalid_mark",
            format!("mark for {} must be between 0 and 100", subject),
        )
        .with_details(serde_json::json!({ "subject": subject, "value": value })));
    }
    Ok(())
}

/// The full in-memory collection of records for one session, keyed by
/// student identifier. Iteration is always ascending by identifier.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: BTreeMap<u32, StudentRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert-if-absent. A duplicate identifier is rejected and the store is
    /// left exactly as it was.
    pub fn insert(&mut self, record: StudentRecord) -> Result<(), StoreError> {
        if self.records.contains_key(&record.student_id) {
            return Err(StoreError::new(
                "duplicate_id",
                format!("student id {} already exists", record.student_id),
            )
            .with_details(serde_json::json!({ "studentId": record.student_id })));
        }
        self.records.insert(record.student_id, record);
        Ok(())
    }

    pub fn get(&self, student_id: u32) -> Option<&StudentRecord> {
        self.records.get(&student_id)
    }

    /// Rerun the calculator for one record and return it.
    pub fn recompute(&mut self, student_id: u32) -> Result<&StudentRecord, StoreError> {
        let record = self.records.get_mut(&student_id).ok_or_else(|| {
            StoreError::new("not_found", format!("student id {} not found", student_id))
                .with_details(serde_json::json!({ "studentId": student_id }))
        })?;
        record.recompute();
        Ok(record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.values()
    }

    /// Replace-all: discard the existing records and adopt the given set
    /// wholesale. Callers validate before handing the set over, so this
    /// never partially applies.
    pub fn replace_all(&mut self, records: BTreeMap<u32, StudentRecord>) {
        self.records = records;
    }
}
