use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;

fn require_workspace(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    if state.workspace.is_none() {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    }
    Ok(())
}

fn handle_results_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let model = report::build_report(&state.store);
    match serde_json::to_value(&model) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "report_failed", e.to_string(), None),
    }
}

fn handle_results_text(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    if state.store.is_empty() {
        return err(&req.id, "no_records", "no student records available", None);
    }
    let model = report::build_report(&state.store);
    ok(
        &req.id,
        json!({
            "studentCount": model.student_count,
            "text": report::render_text(&model),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.resultsModel" => Some(handle_results_model(state, req)),
        "reports.resultsText" => Some(handle_results_text(state, req)),
        _ => None,
    }
}
