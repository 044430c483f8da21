use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn require_workspace(state: &AppState, req: &Request) -> Result<PathBuf, serde_json::Value> {
    state
        .workspace
        .clone()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn required_path(req: &Request, key: &str) -> Result<PathBuf, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing params.{}", key), None))
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn handle_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let workspace = match require_workspace(state, req) {
        Ok(ws) => ws,
        Err(resp) => return resp,
    };
    let out_path = match required_path(req, "outPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match backup::export_data_bundle(&workspace, &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "outPath": out_path.to_string_lossy(),
                "bundleFormat": summary.bundle_format,
                "entryCount": summary.entry_count,
            }),
        ),
        Err(e) => err(&req.id, "export_failed", format!("{e:#}"), None),
    }
}

fn handle_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let workspace = match require_workspace(state, req) {
        Ok(ws) => ws,
        Err(resp) => return resp,
    };
    let in_path = match required_path(req, "inPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    // Restores the data file only; the UI issues data.load afterwards.
    match backup::import_data_bundle(&in_path, &workspace) {
        Ok(summary) => ok(
            &req.id,
            json!({ "bundleFormatDetected": summary.bundle_format_detected }),
        ),
        Err(e) => err(&req.id, "import_failed", format!("{e:#}"), None),
    }
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.workspace.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let out_path = match required_path(req, "outPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let mut lines: Vec<String> = Vec::with_capacity(state.store.len() + 1);
    let mut header: Vec<String> = vec!["student_id".into(), "name".into()];
    header.extend(state.subjects.names().iter().map(|s| csv_quote(s)));
    header.extend(["total_marks".into(), "percentage".into(), "grade".into()]);
    lines.push(header.join(","));

    for record in state.store.iter() {
        let mut fields: Vec<String> = vec![
            record.student_id.to_string(),
            csv_quote(&record.name),
        ];
        for subject in state.subjects.names() {
            fields.push(
                record
                    .marks
                    .get(subject)
                    .map(|m| m.to_string())
                    .unwrap_or_default(),
            );
        }
        fields.push(record.total_marks.to_string());
        fields.push(record.percentage.to_string());
        fields.push(record.grade.as_str().to_string());
        lines.push(fields.join(","));
    }

    let text = format!("{}\n", lines.join("\n"));
    if let Err(e) = std::fs::write(&out_path, text.as_bytes()) {
        return err(
            &req.id,
            "export_failed",
            format!("failed to write {}: {}", out_path.to_string_lossy(), e),
            None,
        );
    }

    ok(
        &req.id,
        json!({
            "outPath": out_path.to_string_lossy(),
            "rowCount": state.store.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportDataBundle" => Some(handle_export_bundle(state, req)),
        "backup.importDataBundle" => Some(handle_import_bundle(state, req)),
        "exchange.exportResultsCsv" => Some(handle_export_csv(state, req)),
        _ => None,
    }
}
