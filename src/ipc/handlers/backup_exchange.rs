use crate::backup;
use crate::calc;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{date_range_param, required_str, str_param, today_param};
use crate::ipc::types::{AppState, Request};
use crate::period::format_date;
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_backup_export_json(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_dir = str_param(req, "outDir")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .or_else(|| state.config.backup_dir.clone());
    let Some(out_dir) = out_dir else {
        return err(&req.id, "bad_params", "missing outDir", None);
    };
    let date = match today_param(req) {
        Ok(v) => format_date(v),
        Err(resp) => return resp,
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let document = match db::load_pretty(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", format!("{e:#}"), None),
    };
    match backup::export_json_backup(&document, &out_dir, &date) {
        Ok(summary) => {
            tracing::info!(path = %summary.path.to_string_lossy(), bytes = summary.bytes, "backup written");
            ok(
                &req.id,
                json!({
                    "ok": true,
                    "path": summary.path.to_string_lossy(),
                    "bytes": summary.bytes,
                    "sha256": summary.sha256
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "outDir": out_dir.to_string_lossy() })),
        ),
    }
}

fn handle_backup_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) => v.trim().to_string(),
        Err(resp) => return resp,
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let document = match db::load_pretty(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", format!("{e:#}"), None),
    };
    match backup::export_backup_bundle(&document, Path::new(&out_path)) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "ok": true,
                "path": out_path,
                "bundleFormat": backup::BUNDLE_FORMAT_V1,
                "sha256": summary.sha256
            }),
        ),
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "path": out_path })),
        ),
    }
}

fn write_report_csv(report: &calc::ClassReport, out_path: &Path) -> anyhow::Result<usize> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let mut wtr = csv::Writer::from_path(out_path)
        .with_context(|| format!("failed to create {}", out_path.to_string_lossy()))?;
    wtr.write_record(["rank", "student_id", "name", "score", "violations", "rewards"])?;
    for (idx, s) in report.student_scores.iter().enumerate() {
        wtr.write_record([
            (idx + 1).to_string(),
            s.student_id.clone(),
            s.name.clone(),
            s.score.to_string(),
            s.violations.to_string(),
            s.rewards.to_string(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))?;
    Ok(report.student_scores.len())
}

fn handle_exchange_export_class_report_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let out_path = match required_str(req, "outPath") {
        Ok(v) => v.trim().to_string(),
        Err(resp) => return resp,
    };
    let range = match date_range_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let data = match db::load(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", format!("{e:#}"), None),
    };
    if data.class(class_id).is_none() {
        return err(&req.id, "not_found", "class not found", None);
    }

    let report = calc::class_report(&data, class_id, &range);
    match write_report_csv(&report, Path::new(&out_path)) {
        Ok(rows) => ok(
            &req.id,
            json!({
                "ok": true,
                "path": out_path,
                "rows": rows,
                "start": report.start,
                "end": report.end
            }),
        ),
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "path": out_path })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportJson" => Some(handle_backup_export_json(state, req)),
        "backup.exportBundle" => Some(handle_backup_export_bundle(state, req)),
        "exchange.exportClassReportCsv" => {
            Some(handle_exchange_export_class_report_csv(state, req))
        }
        _ => None,
    }
}
