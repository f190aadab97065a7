use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens (creating if needed) the store in `path` and makes it current.
pub fn select_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<serde_json::Value> {
    let conn = db::open_db(path)?;
    let data = db::load(&conn)?;
    state.workspace = Some(path.to_path_buf());
    state.db = Some(conn);
    tracing::info!(
        workspace = %path.to_string_lossy(),
        classes = data.classes.len(),
        students = data.students.len(),
        records = data.records.len(),
        "workspace selected"
    );
    Ok(json!({
        "workspacePath": path.to_string_lossy(),
        "classCount": data.classes.len(),
        "studentCount": data.students.len(),
        "recordCount": data.records.len(),
        "categoryCount": data.categories.len()
    }))
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match select_workspace(state, &path) {
        Ok(result) => ok(&req.id, result),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
