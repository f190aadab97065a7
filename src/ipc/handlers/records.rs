use crate::calc;
use crate::ipc::error::err;
use crate::ipc::helpers::{
    bool_param, mutate_doc, read_doc, required_str, str_param, to_json, today_param,
};
use crate::ipc::types::{AppState, Request};
use crate::period::format_date;
use crate::store;
use serde_json::json;

fn date_or_today(req: &Request) -> Result<String, serde_json::Value> {
    match str_param(req, "date") {
        Some(d) => Ok(d.trim().to_string()),
        None => today_param(req).map(format_date),
    }
}

fn handle_records_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let category_id = match required_str(req, "categoryId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let date = match date_or_today(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let note = str_param(req, "note");
    let timestamp = chrono::Utc::now().timestamp_millis();

    mutate_doc(state, req, |data| {
        let record = store::add_record(data, student_id, category_id, &date, note, timestamp)?;
        tracing::debug!(
            record_id = %record.id,
            student_id,
            kind = record.kind.as_str(),
            points = record.points,
            date = %record.date,
            "record added"
        );
        Ok(json!({ "recordId": record.id, "record": to_json(&record) }))
    })
}

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = str_param(req, "classId");
    let student_id = str_param(req, "studentId");
    let date = str_param(req, "date");

    read_doc(state, req, |data| {
        let records: Vec<_> = data
            .records
            .iter()
            .filter(|r| class_id.map(|c| r.class_id == c).unwrap_or(true))
            .filter(|r| student_id.map(|s| r.student_id == s).unwrap_or(true))
            .filter(|r| date.map(|d| r.date == d).unwrap_or(true))
            .collect();
        Ok(json!({ "records": to_json(&records) }))
    })
}

fn handle_records_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let record_id = match required_str(req, "recordId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    mutate_doc(state, req, |data| {
        let removed = store::delete_record(data, record_id)?;
        Ok(json!({ "ok": true, "record": to_json(&removed) }))
    })
}

fn handle_records_reset_period(state: &mut AppState, req: &Request) -> serde_json::Value {
    let confirm = bool_param(req, "confirm");
    mutate_doc(state, req, |data| {
        let removed = store::reset_period(data, confirm)?;
        tracing::info!(removed, "period reset");
        Ok(json!({ "ok": true, "removed": removed }))
    })
}

fn handle_scoring_daily_sheet(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let date = match date_or_today(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let search = str_param(req, "search");

    read_doc(state, req, |data| {
        if data.class(class_id).is_none() {
            return Err(err(&req.id, "not_found", "class not found", None));
        }
        let rows = calc::daily_sheet(data, class_id, &date, search);
        Ok(json!({ "date": date, "rows": to_json(&rows) }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.add" => Some(handle_records_add(state, req)),
        "records.list" => Some(handle_records_list(state, req)),
        "records.delete" => Some(handle_records_delete(state, req)),
        "records.resetPeriod" => Some(handle_records_reset_period(state, req)),
        "scoring.dailySheet" => Some(handle_scoring_daily_sheet(state, req)),
        _ => None,
    }
}
