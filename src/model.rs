use serde::{Deserialize, Serialize};

/// Storage key the whole document lives under.
pub const STORAGE_KEY: &str = "flagmaster_data_v1";

/// Starting score for every student (and per student for a class).
pub const BASE_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Violation,
    Reward,
}

impl RecordType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "violation" => Some(Self::Violation),
            "reward" => Some(Self::Reward),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Violation => "violation",
            Self::Reward => "reward",
        }
    }

    /// Violations are stored negative, rewards non-negative, whatever sign the caller sent.
    /// Zero stays `0.0` for both so the document never carries `-0.0`.
    pub fn signed_points(self, points: f64) -> f64 {
        if points == 0.0 {
            return 0.0;
        }
        match self {
            Self::Violation => -points.abs(),
            Self::Reward => points.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub grade: i64,
    pub teacher: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub points: f64,
    #[serde(rename = "type")]
    pub kind: RecordType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: String,
    pub student_id: String,
    pub class_id: String,
    /// `YYYY-MM-DD`; compared as a string.
    pub date: String,
    #[serde(rename = "type")]
    pub kind: RecordType,
    /// Category name at the time of scoring, not a live reference.
    pub category: String,
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub records: Vec<ScoreRecord>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl AppData {
    /// Fresh document: default categories, empty roster.
    pub fn initial() -> Self {
        Self {
            categories: default_categories(),
            ..Self::default()
        }
    }

    pub fn class(&self, class_id: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn students_in<'a>(&'a self, class_id: &'a str) -> impl Iterator<Item = &'a Student> + 'a {
        self.students.iter().filter(move |s| s.class_id == class_id)
    }

    pub fn count_students(&self, class_id: &str) -> i64 {
        self.students_in(class_id).count() as i64
    }
}

fn default_categories() -> Vec<Category> {
    let defs: [(&str, &str, f64, RecordType); 12] = [
        ("v1", "Đi học muộn (<10p)", 0.5, RecordType::Violation),
        ("v2", "Đi học muộn (>10p)", 1.0, RecordType::Violation),
        ("v3", "Không mặc đồng phục", 1.0, RecordType::Violation),
        ("v4", "Không làm bài tập", 2.0, RecordType::Violation),
        ("v5", "Gây mất trật tự", 2.0, RecordType::Violation),
        ("v6", "Sử dụng điện thoại", 5.0, RecordType::Violation),
        ("v7", "Đánh nhau/Chửi thề", 10.0, RecordType::Violation),
        ("r1", "Điểm tốt (9-10)", 1.0, RecordType::Reward),
        ("r2", "Phát biểu xây dựng bài", 1.0, RecordType::Reward),
        ("r3", "Nhặt được của rơi", 2.0, RecordType::Reward),
        ("r4", "Tham gia hoạt động trường", 2.0, RecordType::Reward),
        ("r5", "Đạt giải cấp trường", 5.0, RecordType::Reward),
    ];
    defs.into_iter()
        .map(|(id, name, points, kind)| Category {
            id: id.to_string(),
            name: name.to_string(),
            points: kind.signed_points(points),
            kind,
        })
        .collect()
}
