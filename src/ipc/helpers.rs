use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::AppData;
use crate::period::{self, DateRange, PeriodKind};
use crate::store::{StoreError, StoreResult};
use chrono::NaiveDate;
use serde_json::json;

pub type HandlerResult<T> = Result<T, serde_json::Value>;

pub fn str_param<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn required_str<'a>(req: &'a Request, key: &str) -> HandlerResult<&'a str> {
    match str_param(req, key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

pub fn bool_param(req: &Request, key: &str) -> bool {
    req.params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Accepts numbers or numeric strings; anything else present is a param error.
pub fn f64_param(req: &Request, key: &str) -> HandlerResult<Option<f64>> {
    let Some(v) = req.params.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let parsed = v
        .as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()));
    match parsed {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(err(
            &req.id,
            "bad_params",
            format!("{key} must be a number"),
            None,
        )),
    }
}

pub fn i64_param(req: &Request, key: &str) -> HandlerResult<Option<i64>> {
    let Some(v) = req.params.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let parsed = v
        .as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()));
    parsed.map(Some).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("{key} must be an integer"),
            None,
        )
    })
}

pub fn store_err(id: &str, e: &StoreError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), None)
}

/// `params.today` when given (for reproducible reports), else the local date.
pub fn today_param(req: &Request) -> HandlerResult<NaiveDate> {
    match str_param(req, "today") {
        Some(raw) => period::parse_date(raw).ok_or_else(|| {
            err(&req.id, "bad_params", "today must be YYYY-MM-DD", None)
        }),
        None => Ok(period::local_today()),
    }
}

pub fn date_range_param(req: &Request) -> HandlerResult<DateRange> {
    let selector = str_param(req, "period").unwrap_or("week");
    let Some(kind) = PeriodKind::parse(selector) else {
        return Err(err(
            &req.id,
            "bad_params",
            format!("unknown period: {selector}"),
            Some(json!({ "allowed": ["week", "month", "semester", "custom"] })),
        ));
    };
    let today = today_param(req)?;
    let custom = match (str_param(req, "start"), str_param(req, "end")) {
        (Some(s), Some(e)) => Some((s, e)),
        _ => None,
    };
    period::resolve(kind, today, custom).map_err(|m| err(&req.id, "bad_params", m, None))
}

/// Loads the document and hands it to `f` read-only.
pub fn read_doc<F>(state: &AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&AppData) -> HandlerResult<serde_json::Value>,
{
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let data = match db::load(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", format!("{e:#}"), None),
    };
    match f(&data) {
        Ok(result) => ok(&req.id, result),
        Err(resp) => resp,
    }
}

/// Read-modify-write of the whole document. The document is saved only when `f`
/// succeeds, so a failed operation leaves the store untouched.
pub fn mutate_doc<F>(state: &AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut AppData) -> StoreResult<serde_json::Value>,
{
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let mut data = match db::load(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", format!("{e:#}"), None),
    };
    let result = match f(&mut data) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(method = %req.method, code = e.code(), "mutation rejected");
            return store_err(&req.id, &e);
        }
    };
    if let Err(e) = db::save(conn, &data) {
        tracing::error!(method = %req.method, error = %format!("{e:#}"), "failed to save document");
        return err(&req.id, "db_write_failed", format!("{e:#}"), None);
    }
    ok(&req.id, result)
}

pub fn to_json<T: serde::Serialize>(v: &T) -> serde_json::Value {
    serde_json::to_value(v).unwrap_or(serde_json::Value::Null)
}
