use crate::model::{AppData, Class, Student};
use crate::store::{new_id, sync_all_student_counts, StoreError, StoreResult};
use serde::Serialize;

const NAME_HEADERS: &[&str] = &["HỌ VÀ TÊN", "Họ và tên", "Ho va ten", "HO VA TEN", "Name"];
const CLASS_HEADERS: &[&str] = &["LỚP", "Lớp", "Lop", "Class"];
const DOB_HEADERS: &[&str] = &["NGÀY SINH", "Ngày sinh", "Ngay sinh", "Date of Birth", "Dob"];

/// Teacher name given to classes created by an import.
pub const UNKNOWN_TEACHER: &str = "Chưa cập nhật";

const IMPORT_HINT: &str = "could not read roster; expected columns HỌ VÀ TÊN, LỚP, NGÀY SINH";

#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    pub name: String,
    pub class_name: String,
    pub date_of_birth: Option<String>,
}

fn find_column(header: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| header.iter().position(|h| h.trim() == *alias))
}

/// Parses CSV text with a header row. Quoted fields may span lines. Rows missing a name
/// or class are dropped; a record the reader rejects aborts the whole import.
pub fn parse_roster_csv(text: &str) -> StoreResult<Vec<RosterRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = rdr
        .headers()
        .map_err(|e| StoreError::ImportFailed(format!("could not read header: {e}")))?
        .clone();
    if header.iter().all(|h| h.trim().is_empty()) {
        return Err(StoreError::ImportFailed("roster has no data".into()));
    }
    let (Some(name_col), Some(class_col)) = (
        find_column(&header, NAME_HEADERS),
        find_column(&header, CLASS_HEADERS),
    ) else {
        return Err(StoreError::ImportFailed(IMPORT_HINT.into()));
    };
    let dob_col = find_column(&header, DOB_HEADERS);

    let mut rows = Vec::new();
    let mut data_records = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| StoreError::ImportFailed(format!("row {} is malformed: {e}", idx + 2)))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        data_records += 1;
        let cell = |col: usize| {
            record
                .get(col)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let (Some(name), Some(class_name)) = (cell(name_col), cell(class_col)) else {
            continue;
        };
        rows.push(RosterRow {
            name,
            class_name,
            date_of_birth: dob_col.and_then(cell),
        });
    }
    if data_records == 0 {
        return Err(StoreError::ImportFailed("roster has no data".into()));
    }
    Ok(rows)
}

/// First run of ASCII digits in a class name ("10A1" -> 10), else 0.
pub fn grade_from_class_name(name: &str) -> i64 {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub rows: usize,
    pub added_students: usize,
    pub new_classes: usize,
    pub skipped_duplicates: usize,
}

/// Merges roster rows into the document. Classes match by case-insensitive name, students
/// by case-insensitive name within their class. Student counts are recomputed for every
/// class afterwards.
pub fn apply_roster(data: &mut AppData, rows: &[RosterRow]) -> ImportSummary {
    let mut summary = ImportSummary {
        rows: rows.len(),
        ..ImportSummary::default()
    };

    for row in rows {
        let wanted = row.class_name.to_lowercase();
        let class_id = match data.classes.iter().find(|c| c.name.to_lowercase() == wanted) {
            Some(c) => c.id.clone(),
            None => {
                let class = Class {
                    id: new_id(),
                    name: row.class_name.clone(),
                    grade: grade_from_class_name(&row.class_name),
                    teacher: UNKNOWN_TEACHER.to_string(),
                    student_count: 0,
                };
                let id = class.id.clone();
                data.classes.push(class);
                summary.new_classes += 1;
                id
            }
        };

        let name_lower = row.name.to_lowercase();
        let duplicate = data
            .students
            .iter()
            .any(|s| s.class_id == class_id && s.name.to_lowercase() == name_lower);
        if duplicate {
            summary.skipped_duplicates += 1;
            continue;
        }
        data.students.push(Student {
            id: new_id(),
            name: row.name.clone(),
            class_id,
            date_of_birth: row.date_of_birth.clone(),
        });
        summary.added_students += 1;
    }

    sync_all_student_counts(data);
    summary
}
