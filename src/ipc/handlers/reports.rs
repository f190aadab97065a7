use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{date_range_param, read_doc, required_str, to_json, today_param};
use crate::ipc::types::{AppState, Request};
use crate::period::format_date;
use serde_json::json;

fn handle_resolve_period(_state: &mut AppState, req: &Request) -> serde_json::Value {
    match date_range_param(req) {
        Ok(range) => ok(&req.id, json!({ "start": range.start, "end": range.end })),
        Err(resp) => resp,
    }
}

fn handle_class_report(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let range = match date_range_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    read_doc(state, req, |data| {
        Ok(to_json(&calc::class_report(data, class_id, &range)))
    })
}

fn handle_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
    let today = match today_param(req) {
        Ok(v) => format_date(v),
        Err(resp) => return resp,
    };
    read_doc(state, req, |data| {
        Ok(to_json(&calc::dashboard_summary(data, &today)))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.resolvePeriod" => Some(handle_resolve_period(state, req)),
        "reports.classReport" => Some(handle_class_report(state, req)),
        "reports.dashboard" => Some(handle_dashboard(state, req)),
        _ => None,
    }
}
