use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, StoreError, StudentRecord};
use serde_json::json;
use std::collections::BTreeMap;

fn store_err(id: &str, e: StoreError) -> serde_json::Value {
    err(id, &e.code, e.message, e.details)
}

fn require_workspace(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    if state.workspace.is_none() {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    }
    Ok(())
}

/// The form submits text fields, so ids arrive as JSON numbers or digit
/// strings. Anything else is a validation error.
fn parse_student_id(req: &Request) -> Result<u32, serde_json::Value> {
    let raw = req.params.get("studentId").ok_or_else(|| {
        err(&req.id, "bad_params", "missing params.studentId", None)
    })?;

    let parsed: Option<u32> = match raw {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    match parsed {
        Some(id) if id > 0 => Ok(id),
        _ => Err(err(
            &req.id,
            "bad_params",
            "student id must be a positive integer",
            Some(json!({ "studentId": raw })),
        )),
    }
}

fn parse_marks(state: &AppState, req: &Request) -> Result<BTreeMap<String, f64>, serde_json::Value> {
    let mut marks: BTreeMap<String, f64> = BTreeMap::new();
    let Some(raw) = req.params.get("marks") else {
        return Ok(marks);
    };
    if raw.is_null() {
        return Ok(marks);
    }
    let Some(obj) = raw.as_object() else {
        return Err(err(
            &req.id,
            "bad_params",
            "params.marks must be an object of subject to mark",
            None,
        ));
    };

    for (subject, value) in obj {
        if !state.subjects.contains(subject) {
            return Err(err(
                &req.id,
                "unknown_subject",
                format!("{} is not a configured subject", subject),
                Some(json!({ "subject": subject, "subjects": state.subjects.names() })),
            ));
        }

        let mark: Option<f64> = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(mark) = mark else {
            return Err(err(
                &req.id,
                "invalid_mark",
                format!("mark for {} must be a number", subject),
                Some(json!({ "subject": subject })),
            ));
        };
        if let Err(e) = store::validate_mark(subject, mark) {
            return Err(store_err(&req.id, e));
        }
        marks.insert(subject.clone(), mark);
    }

    Ok(marks)
}

fn record_detail(record: &StudentRecord) -> serde_json::Value {
    json!({
        "studentId": record.student_id,
        "name": record.name,
        "marks": record.marks,
        "maxMarks": (record.marks.len() as f64) * 100.0,
        "totalMarks": record.total_marks,
        "percentage": record.percentage,
        "grade": record.grade.as_str(),
    })
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let student_id = match parse_student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    // Same check order as the form: id, duplicate, name, marks.
    if state.store.get(student_id).is_some() {
        return err(
            &req.id,
            "duplicate_id",
            format!("student id {} already exists", student_id),
            Some(json!({ "studentId": student_id })),
        );
    }

    let name = match req.params.get("name").and_then(|v| v.as_str()) {
        Some(raw) => match store::validate_name(raw) {
            Ok(name) => name,
            Err(e) => return store_err(&req.id, e),
        },
        None => return err(&req.id, "bad_params", "missing params.name", None),
    };

    let marks = match parse_marks(state, req) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let allow_empty = req
        .params
        .get("allowEmptyMarks")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if marks.is_empty() && !allow_empty {
        return err(
            &req.id,
            "empty_marks",
            "no marks entered; pass allowEmptyMarks to create the record anyway",
            None,
        );
    }

    let record = StudentRecord::new(student_id, name, marks);
    let mut result = record_detail(&record);
    if let Err(e) = state.store.insert(record) {
        return store_err(&req.id, e);
    }
    result["studentCount"] = json!(state.store.len());
    ok(&req.id, result)
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let student_id = match parse_student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.get(student_id) {
        Some(record) => ok(&req.id, record_detail(record)),
        None => err(
            &req.id,
            "not_found",
            format!("student id {} not found", student_id),
            Some(json!({ "studentId": student_id })),
        ),
    }
}

fn handle_recompute(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let student_id = match parse_student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.recompute(student_id) {
        Ok(record) => ok(&req.id, record_detail(record)),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let students: Vec<serde_json::Value> = state
        .store
        .iter()
        .map(|r| {
            json!({
                "studentId": r.student_id,
                "name": r.name,
                "totalMarks": r.total_marks,
                "percentage": r.percentage,
                "grade": r.grade.as_str(),
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "students": students,
            "studentCount": students.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.add" => Some(handle_add(state, req)),
        "students.get" => Some(handle_get(state, req)),
        "students.recompute" => Some(handle_recompute(state, req)),
        "students.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
