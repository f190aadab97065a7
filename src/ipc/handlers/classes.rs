use crate::ipc::helpers::{
    bool_param, i64_param, mutate_doc, read_doc, required_str, str_param, to_json,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, ClassPatch};
use serde_json::json;

/// Grade used when `classes.create` omits one.
const DEFAULT_GRADE: i64 = 10;

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let grade = match i64_param(req, "grade") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let search = str_param(req, "search")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    read_doc(state, req, |data| {
        let classes: Vec<_> = data
            .classes
            .iter()
            .filter(|c| grade.map(|g| c.grade == g).unwrap_or(true))
            .filter(|c| {
                search
                    .as_deref()
                    .map(|needle| {
                        c.name.to_lowercase().contains(needle)
                            || c.teacher.to_lowercase().contains(needle)
                    })
                    .unwrap_or(true)
            })
            .collect();
        Ok(json!({ "classes": to_json(&classes) }))
    })
}

fn handle_classes_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let grade = match i64_param(req, "grade") {
        Ok(v) => v.unwrap_or(DEFAULT_GRADE),
        Err(resp) => return resp,
    };
    let teacher = str_param(req, "teacher").unwrap_or("");

    mutate_doc(state, req, |data| {
        let class = store::create_class(data, name, grade, teacher)?;
        tracing::info!(class_id = %class.id, name = %class.name, "class created");
        Ok(json!({ "classId": class.id, "class": to_json(&class) }))
    })
}

fn handle_classes_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let grade = match i64_param(req, "grade") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = ClassPatch {
        name: str_param(req, "name"),
        grade,
        teacher: str_param(req, "teacher"),
    };

    mutate_doc(state, req, |data| {
        let class = store::update_class(data, class_id, patch)?;
        Ok(json!({ "class": to_json(&class) }))
    })
}

fn handle_classes_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let confirm = bool_param(req, "confirm");

    mutate_doc(state, req, |data| {
        let removed = store::delete_class(data, class_id, confirm)?;
        tracing::info!(
            class_id,
            students = removed.students,
            records = removed.records,
            "class deleted"
        );
        Ok(json!({
            "ok": true,
            "removedStudents": removed.students,
            "removedRecords": removed.records
        }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.create" => Some(handle_classes_create(state, req)),
        "classes.update" => Some(handle_classes_update(state, req)),
        "classes.delete" => Some(handle_classes_delete(state, req)),
        _ => None,
    }
}
