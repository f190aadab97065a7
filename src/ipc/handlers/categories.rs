use crate::ipc::error::err;
use crate::ipc::helpers::{
    bool_param, f64_param, mutate_doc, read_doc, required_str, str_param, to_json,
};
use crate::ipc::types::{AppState, Request};
use crate::model::RecordType;
use crate::store;
use serde_json::json;

fn kind_param(req: &Request) -> Result<Option<RecordType>, serde_json::Value> {
    match str_param(req, "type") {
        None => Ok(None),
        Some(raw) => RecordType::parse(raw).map(Some).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                "type must be violation or reward",
                None,
            )
        }),
    }
}

fn handle_categories_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match kind_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    read_doc(state, req, |data| {
        let categories: Vec<_> = data
            .categories
            .iter()
            .filter(|c| kind.map(|k| c.kind == k).unwrap_or(true))
            .collect();
        Ok(json!({ "categories": to_json(&categories) }))
    })
}

fn handle_categories_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match kind_param(req) {
        Ok(Some(k)) => k,
        Ok(None) => return err(&req.id, "bad_params", "missing type", None),
        Err(resp) => return resp,
    };
    let name = str_param(req, "name").unwrap_or("");
    let points = match f64_param(req, "points") {
        Ok(v) => v.unwrap_or(0.0),
        Err(resp) => return resp,
    };

    mutate_doc(state, req, |data| {
        let category = store::create_category(data, kind, name, points)?;
        Ok(json!({ "category": to_json(&category) }))
    })
}

fn handle_categories_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let category_id = match required_str(req, "categoryId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let points = match f64_param(req, "points") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = str_param(req, "name");

    mutate_doc(state, req, |data| {
        let category = store::update_category(data, category_id, name, points)?;
        Ok(json!({ "category": to_json(&category) }))
    })
}

fn handle_categories_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let category_id = match required_str(req, "categoryId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let confirm = bool_param(req, "confirm");

    mutate_doc(state, req, |data| {
        store::delete_category(data, category_id, confirm)?;
        Ok(json!({ "ok": true }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "categories.list" => Some(handle_categories_list(state, req)),
        "categories.create" => Some(handle_categories_create(state, req)),
        "categories.update" => Some(handle_categories_update(state, req)),
        "categories.delete" => Some(handle_categories_delete(state, req)),
        _ => None,
    }
}
