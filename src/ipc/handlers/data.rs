use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::persist::{self, LoadOutcome};
use serde_json::json;
use std::path::PathBuf;

fn require_workspace(state: &AppState, req: &Request) -> Result<PathBuf, serde_json::Value> {
    state
        .workspace
        .clone()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let workspace = match require_workspace(state, req) {
        Ok(ws) => ws,
        Err(resp) => return resp,
    };

    if state.store.is_empty() {
        return err(&req.id, "empty_store", "no student records to save", None);
    }

    match persist::save_store(&workspace, &state.store) {
        Ok(path) => ok(
            &req.id,
            json!({
                "path": path.to_string_lossy(),
                "studentCount": state.store.len(),
            }),
        ),
        Err(e) => err(&req.id, "save_failed", format!("{e:#}"), None),
    }
}

fn handle_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let workspace = match require_workspace(state, req) {
        Ok(ws) => ws,
        Err(resp) => return resp,
    };

    match persist::load_store(&workspace) {
        Ok(LoadOutcome::Missing) => ok(
            &req.id,
            json!({
                "loaded": false,
                "message": "no saved data found",
            }),
        ),
        Ok(LoadOutcome::Loaded(records)) => {
            // Replace-all only happens after the whole file validated.
            state.store.replace_all(records);
            ok(
                &req.id,
                json!({
                    "loaded": true,
                    "studentCount": state.store.len(),
                }),
            )
        }
        Err(e) => err(&req.id, "load_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "data.save" => Some(handle_save(state, req)),
        "data.load" => Some(handle_load(state, req)),
        _ => None,
    }
}
