use crate::model::{AppData, Class, RecordType, ScoreRecord, Student, BASE_SCORE};
use crate::period::DateRange;
use serde::Serialize;
use std::cmp::Ordering;

/// How many classes the dashboard shows at each end of the ranking.
pub const DASHBOARD_PODIUM: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentScore {
    pub student_id: String,
    pub name: String,
    pub score: f64,
    pub violations: usize,
    pub rewards: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub date: String,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassReport {
    pub class: Option<Class>,
    pub start: String,
    pub end: String,
    pub student_count: usize,
    pub student_scores: Vec<StudentScore>,
    pub total_violations: usize,
    pub total_rewards: usize,
    pub average_score: f64,
    pub timeline: Vec<TimelinePoint>,
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn count_kind<'a, I>(records: I, kind: RecordType) -> usize
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    records.into_iter().filter(|r| r.kind == kind).count()
}

/// Per-student ranking, class totals and the running-average timeline for one class over
/// an inclusive date range. Always recomputed from the raw records.
pub fn class_report(data: &AppData, class_id: &str, range: &DateRange) -> ClassReport {
    let students: Vec<&Student> = data.students_in(class_id).collect();
    let records: Vec<&ScoreRecord> = data
        .records
        .iter()
        .filter(|r| r.class_id == class_id && range.contains(&r.date))
        .collect();

    let mut student_scores: Vec<StudentScore> = students
        .iter()
        .map(|s| {
            let mine: Vec<&ScoreRecord> = records
                .iter()
                .copied()
                .filter(|r| r.student_id == s.id)
                .collect();
            StudentScore {
                student_id: s.id.clone(),
                name: s.name.clone(),
                score: BASE_SCORE + mine.iter().map(|r| r.points).sum::<f64>(),
                violations: count_kind(mine.iter().copied(), RecordType::Violation),
                rewards: count_kind(mine.iter().copied(), RecordType::Reward),
            }
        })
        .collect();
    // `sort_by` is stable: equal scores keep roster order.
    student_scores.sort_by(|a, b| by_score_desc(a.score, b.score));

    let n = students.len();
    let divisor = n.max(1) as f64;
    let base_total = BASE_SCORE * n as f64;
    let delta_total: f64 = records.iter().map(|r| r.points).sum();
    let average_score = if n == 0 {
        0.0
    } else {
        (base_total + delta_total) / divisor
    };

    let mut sorted = records.clone();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    let mut timeline: Vec<TimelinePoint> = Vec::new();
    let mut running = base_total;
    for r in sorted {
        running += r.points;
        let sample = running / divisor;
        match timeline.last_mut() {
            Some(last) if last.date == r.date => last.average_score = sample,
            _ => timeline.push(TimelinePoint {
                date: r.date.clone(),
                average_score: sample,
            }),
        }
    }

    ClassReport {
        class: data.class(class_id).cloned(),
        start: range.start.clone(),
        end: range.end.clone(),
        student_count: n,
        student_scores,
        total_violations: count_kind(records.iter().copied(), RecordType::Violation),
        total_rewards: count_kind(records.iter().copied(), RecordType::Reward),
        average_score,
        timeline,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStanding {
    pub class_id: String,
    pub name: String,
    pub grade: i64,
    pub teacher: String,
    pub score: f64,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today: String,
    pub violations_today: usize,
    pub rewards_today: usize,
    pub total_students: usize,
    pub total_classes: usize,
    pub top: Vec<ClassStanding>,
    pub bottom: Vec<ClassStanding>,
}

/// School-wide overview: today's event counts and all-time class standings
/// (`100 + Σ points`, not scaled by roster size).
pub fn dashboard_summary(data: &AppData, today: &str) -> DashboardSummary {
    let todays = data.records.iter().filter(|r| r.date == today);
    let violations_today = count_kind(todays.clone(), RecordType::Violation);
    let rewards_today = count_kind(todays, RecordType::Reward);

    let mut standings: Vec<ClassStanding> = data
        .classes
        .iter()
        .map(|c| {
            let total_points: f64 = data
                .records
                .iter()
                .filter(|r| r.class_id == c.id)
                .map(|r| r.points)
                .sum();
            ClassStanding {
                class_id: c.id.clone(),
                name: c.name.clone(),
                grade: c.grade,
                teacher: c.teacher.clone(),
                score: BASE_SCORE + total_points,
                total_points,
            }
        })
        .collect();
    standings.sort_by(|a, b| by_score_desc(a.score, b.score));

    let top: Vec<ClassStanding> = standings.iter().take(DASHBOARD_PODIUM).cloned().collect();
    let bottom: Vec<ClassStanding> = standings
        .iter()
        .skip(standings.len().saturating_sub(DASHBOARD_PODIUM))
        .rev()
        .cloned()
        .collect();

    DashboardSummary {
        today: today.to_string(),
        violations_today,
        rewards_today,
        total_students: data.students.len(),
        total_classes: data.classes.len(),
        top,
        bottom,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRow {
    pub student_id: String,
    pub name: String,
    pub violations: Vec<ScoreRecord>,
    pub rewards: Vec<ScoreRecord>,
}

/// One day's scoring sheet for a class, in roster order.
pub fn daily_sheet(data: &AppData, class_id: &str, date: &str, search: Option<&str>) -> Vec<DailyRow> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    data.students_in(class_id)
        .filter(|s| {
            needle
                .as_deref()
                .map(|n| s.name.to_lowercase().contains(n))
                .unwrap_or(true)
        })
        .map(|s| {
            let todays: Vec<&ScoreRecord> = data
                .records
                .iter()
                .filter(|r| r.student_id == s.id && r.date == date)
                .collect();
            let pick = |kind: RecordType| -> Vec<ScoreRecord> {
                todays
                    .iter()
                    .filter(|r| r.kind == kind)
                    .map(|r| (*r).clone())
                    .collect()
            };
            DailyRow {
                student_id: s.id.clone(),
                name: s.name.clone(),
                violations: pick(RecordType::Violation),
                rewards: pick(RecordType::Reward),
            }
        })
        .collect()
}
