use crate::ipc::error::err;
use crate::ipc::helpers::{bool_param, mutate_doc, read_doc, required_str, str_param, to_json};
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    read_doc(state, req, |data| {
        if data.class(class_id).is_none() {
            return Err(err(&req.id, "not_found", "class not found", None));
        }
        let students: Vec<_> = data.students_in(class_id).collect();
        Ok(json!({ "students": to_json(&students) }))
    })
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = str_param(req, "name").unwrap_or("");
    let dob = str_param(req, "dateOfBirth");

    mutate_doc(state, req, |data| {
        let student = store::create_student(data, class_id, name, dob)?;
        let student_count = data.count_students(class_id);
        Ok(json!({
            "studentId": student.id,
            "student": to_json(&student),
            "studentCount": student_count
        }))
    })
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = str_param(req, "name");
    let dob = str_param(req, "dateOfBirth");

    mutate_doc(state, req, |data| {
        let student = store::update_student(data, student_id, name, dob)?;
        Ok(json!({ "student": to_json(&student) }))
    })
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let confirm = bool_param(req, "confirm");

    mutate_doc(state, req, |data| {
        let removed = store::delete_student(data, student_id, confirm)?;
        tracing::info!(student_id, records = removed.records, "student deleted");
        Ok(json!({ "ok": true, "removedRecords": removed.records }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
