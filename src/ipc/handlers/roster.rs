use crate::ipc::error::err;
use crate::ipc::helpers::{mutate_doc, str_param, to_json};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use serde_json::json;

fn read_roster_input(req: &Request) -> Result<String, serde_json::Value> {
    if let Some(text) = str_param(req, "csvText") {
        return Ok(text.to_string());
    }
    let Some(in_path) = str_param(req, "inPath").filter(|s| !s.trim().is_empty()) else {
        return Err(err(&req.id, "bad_params", "missing csvText or inPath", None));
    };
    std::fs::read_to_string(in_path.trim()).map_err(|e| {
        err(
            &req.id,
            "io_failed",
            e.to_string(),
            Some(json!({ "path": in_path })),
        )
    })
}

fn handle_roster_import_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let text = match read_roster_input(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    mutate_doc(state, req, |data| {
        let rows = roster::parse_roster_csv(&text)?;
        let summary = roster::apply_roster(data, &rows);
        tracing::info!(
            added = summary.added_students,
            new_classes = summary.new_classes,
            duplicates = summary.skipped_duplicates,
            "roster imported"
        );
        Ok(to_json(&summary))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.importCsv" => Some(handle_roster_import_csv(state, req)),
        _ => None,
    }
}
