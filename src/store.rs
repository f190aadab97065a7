//! Mutations on the in-memory document. Callers load the document, apply one of these,
//! and save it back only when the operation succeeded.

use crate::model::{AppData, Category, Class, RecordType, ScoreRecord, Student};
use crate::period::parse_date;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{0}")]
    BadParams(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} requires confirm: true")]
    ConfirmationRequired(&'static str),
    #[error("{0}")]
    ImportFailed(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadParams(_) => "bad_params",
            Self::NotFound(_) => "not_found",
            Self::ConfirmationRequired(_) => "confirmation_required",
            Self::ImportFailed(_) => "import_failed",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

fn required_name(raw: &str, field: &str) -> StoreResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(StoreError::BadParams(format!("{field} must not be empty")));
    }
    Ok(name.to_string())
}

fn require_confirm(confirm: bool, what: &'static str) -> StoreResult<()> {
    if confirm {
        Ok(())
    } else {
        Err(StoreError::ConfirmationRequired(what))
    }
}

fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn sync_student_count(data: &mut AppData, class_id: &str) {
    let count = data.count_students(class_id);
    if let Some(c) = data.classes.iter_mut().find(|c| c.id == class_id) {
        c.student_count = count;
    }
}

pub fn sync_all_student_counts(data: &mut AppData) {
    let ids: Vec<String> = data.classes.iter().map(|c| c.id.clone()).collect();
    for id in ids {
        sync_student_count(data, &id);
    }
}

// --- Classes ---

#[derive(Debug, Clone, Default)]
pub struct ClassPatch<'a> {
    pub name: Option<&'a str>,
    pub grade: Option<i64>,
    pub teacher: Option<&'a str>,
}

pub fn create_class(data: &mut AppData, name: &str, grade: i64, teacher: &str) -> StoreResult<Class> {
    let name = required_name(name, "name")?;
    if grade < 0 {
        return Err(StoreError::BadParams("grade must not be negative".into()));
    }
    let class = Class {
        id: new_id(),
        name,
        grade,
        teacher: teacher.trim().to_string(),
        student_count: 0,
    };
    data.classes.push(class.clone());
    Ok(class)
}

pub fn update_class(data: &mut AppData, class_id: &str, patch: ClassPatch<'_>) -> StoreResult<Class> {
    let name = patch.name.map(|n| required_name(n, "name")).transpose()?;
    if patch.grade.is_some_and(|g| g < 0) {
        return Err(StoreError::BadParams("grade must not be negative".into()));
    }
    let class = data
        .classes
        .iter_mut()
        .find(|c| c.id == class_id)
        .ok_or(StoreError::NotFound("class"))?;
    if let Some(name) = name {
        class.name = name;
    }
    if let Some(grade) = patch.grade {
        class.grade = grade;
    }
    if let Some(teacher) = patch.teacher {
        class.teacher = teacher.trim().to_string();
    }
    Ok(class.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Removed {
    pub classes: usize,
    pub students: usize,
    pub records: usize,
}

/// Removes the class, its students, and every record stamped with its id.
pub fn delete_class(data: &mut AppData, class_id: &str, confirm: bool) -> StoreResult<Removed> {
    if data.class(class_id).is_none() {
        return Err(StoreError::NotFound("class"));
    }
    require_confirm(confirm, "deleting a class")?;

    let before = (data.classes.len(), data.students.len(), data.records.len());
    data.classes.retain(|c| c.id != class_id);
    data.students.retain(|s| s.class_id != class_id);
    data.records.retain(|r| r.class_id != class_id);
    Ok(Removed {
        classes: before.0 - data.classes.len(),
        students: before.1 - data.students.len(),
        records: before.2 - data.records.len(),
    })
}

// --- Students ---

pub fn create_student(
    data: &mut AppData,
    class_id: &str,
    name: &str,
    date_of_birth: Option<&str>,
) -> StoreResult<Student> {
    let name = required_name(name, "name")?;
    if data.class(class_id).is_none() {
        return Err(StoreError::NotFound("class"));
    }
    let student = Student {
        id: new_id(),
        name,
        class_id: class_id.to_string(),
        date_of_birth: optional_text(date_of_birth),
    };
    data.students.push(student.clone());
    sync_student_count(data, class_id);
    Ok(student)
}

pub fn update_student(
    data: &mut AppData,
    student_id: &str,
    name: Option<&str>,
    date_of_birth: Option<&str>,
) -> StoreResult<Student> {
    let name = name.map(|n| required_name(n, "name")).transpose()?;
    let student = data
        .students
        .iter_mut()
        .find(|s| s.id == student_id)
        .ok_or(StoreError::NotFound("student"))?;
    if let Some(name) = name {
        student.name = name;
    }
    if let Some(dob) = date_of_birth {
        student.date_of_birth = optional_text(Some(dob));
    }
    Ok(student.clone())
}

pub fn delete_student(data: &mut AppData, student_id: &str, confirm: bool) -> StoreResult<Removed> {
    let class_id = data
        .student(student_id)
        .map(|s| s.class_id.clone())
        .ok_or(StoreError::NotFound("student"))?;
    require_confirm(confirm, "deleting a student")?;

    let records_before = data.records.len();
    data.students.retain(|s| s.id != student_id);
    data.records.retain(|r| r.student_id != student_id);
    sync_student_count(data, &class_id);
    Ok(Removed {
        classes: 0,
        students: 1,
        records: records_before - data.records.len(),
    })
}

// --- Categories ---

pub fn create_category(data: &mut AppData, kind: RecordType, name: &str, points: f64) -> StoreResult<Category> {
    let name = required_name(name, "name")?;
    if !points.is_finite() {
        return Err(StoreError::BadParams("points must be a number".into()));
    }
    let prefix = match kind {
        RecordType::Violation => "v",
        RecordType::Reward => "r",
    };
    let category = Category {
        id: format!("{prefix}-{}", new_id()),
        name,
        points: kind.signed_points(points),
        kind,
    };
    data.categories.push(category.clone());
    Ok(category)
}

/// Renames or re-weights a category. Past records keep the label and points they were
/// created with.
pub fn update_category(
    data: &mut AppData,
    category_id: &str,
    name: Option<&str>,
    points: Option<f64>,
) -> StoreResult<Category> {
    let name = name.map(|n| required_name(n, "name")).transpose()?;
    if points.is_some_and(|p| !p.is_finite()) {
        return Err(StoreError::BadParams("points must be a number".into()));
    }
    let category = data
        .categories
        .iter_mut()
        .find(|c| c.id == category_id)
        .ok_or(StoreError::NotFound("category"))?;
    if let Some(name) = name {
        category.name = name;
    }
    if let Some(points) = points {
        category.points = category.kind.signed_points(points);
    }
    Ok(category.clone())
}

pub fn delete_category(data: &mut AppData, category_id: &str, confirm: bool) -> StoreResult<()> {
    if !data.categories.iter().any(|c| c.id == category_id) {
        return Err(StoreError::NotFound("category"));
    }
    require_confirm(confirm, "deleting a category")?;
    data.categories.retain(|c| c.id != category_id);
    Ok(())
}

// --- Records ---

/// Scores a student against a category. The student's current class, the category name,
/// kind and points are copied onto the record.
pub fn add_record(
    data: &mut AppData,
    student_id: &str,
    category_id: &str,
    date: &str,
    note: Option<&str>,
    timestamp: i64,
) -> StoreResult<ScoreRecord> {
    let date = date.trim();
    if parse_date(date).is_none() {
        return Err(StoreError::BadParams("date must be YYYY-MM-DD".into()));
    }
    let student = data
        .student(student_id)
        .ok_or(StoreError::NotFound("student"))?;
    let category = data
        .categories
        .iter()
        .find(|c| c.id == category_id)
        .ok_or(StoreError::NotFound("category"))?;

    let record = ScoreRecord {
        id: new_id(),
        student_id: student.id.clone(),
        class_id: student.class_id.clone(),
        date: date.to_string(),
        kind: category.kind,
        category: category.name.clone(),
        points: category.kind.signed_points(category.points),
        note: optional_text(note),
        timestamp,
    };
    data.records.push(record.clone());
    Ok(record)
}

pub fn delete_record(data: &mut AppData, record_id: &str) -> StoreResult<ScoreRecord> {
    let idx = data
        .records
        .iter()
        .position(|r| r.id == record_id)
        .ok_or(StoreError::NotFound("record"))?;
    Ok(data.records.remove(idx))
}

/// Clears every record; roster and categories stay.
pub fn reset_period(data: &mut AppData, confirm: bool) -> StoreResult<usize> {
    require_confirm(confirm, "resetting the period")?;
    let removed = data.records.len();
    data.records.clear();
    Ok(removed)
}
