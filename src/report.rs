use crate::calc::{round_off_1_decimal, Grade};
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub student_id: u32,
    pub name: String,
    pub marks: BTreeMap<String, f64>,
    /// Maximum obtainable total for this record: 100 per recorded subject.
    pub max_marks: f64,
    pub total_marks: f64,
    pub percentage: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub generated_at: String,
    pub student_count: usize,
    pub entries: Vec<ReportEntry>,
}

/// Build the detailed results model, entries ascending by student id.
pub fn build_report(store: &RecordStore) -> ResultsReport {
    let entries: Vec<ReportEntry> = store
        .iter()
        .map(|r| ReportEntry {
            student_id: r.student_id,
            name: r.name.clone(),
            marks: r.marks.clone(),
            max_marks: (r.marks.len() as f64) * 100.0,
            total_marks: r.total_marks,
            percentage: r.percentage,
            grade: r.grade,
        })
        .collect();

    ResultsReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        student_count: entries.len(),
        entries,
    }
}

fn one_decimal(v: f64) -> String {
    format!("{:.1}", round_off_1_decimal(v))
}

/// Render the classic plain-text results report.
pub fn render_text(report: &ResultsReport) -> String {
    let mut out = String::new();
    let banner = "=".repeat(70);
    let rule = "-".repeat(50);

    let _ = writeln!(out, "{}", banner);
    let _ = writeln!(out, "STUDENT RESULTS REPORT");
    let _ = writeln!(out, "Generated: {} students", report.student_count);
    let _ = writeln!(out, "{}", banner);
    let _ = writeln!(out);

    for entry in &report.entries {
        let _ = writeln!(out, "Student ID: {}", entry.student_id);
        let _ = writeln!(out, "Name: {}", entry.name);
        if entry.marks.is_empty() {
            let _ = writeln!(out, "No marks recorded.");
        } else {
            let _ = writeln!(out, "Subject Marks:");
            for (subject, mark) in &entry.marks {
                let _ = writeln!(out, "  - {}: {}/100", subject, mark);
            }
            let _ = writeln!(
                out,
                "Total Marks: {}/{}",
                one_decimal(entry.total_marks),
                entry.max_marks
            );
        }
        let _ = writeln!(out, "Percentage: {}%", one_decimal(entry.percentage));
        let _ = writeln!(out, "Final Grade: {}", entry.grade);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out);
    }

    out
}
