#[path = "../src/calc.rs"]
mod calc;
#[path = "../src/model.rs"]
mod model;
#[path = "../src/period.rs"]
mod period;

use model::{AppData, Class, RecordType, ScoreRecord, Student};
use period::{DateRange, PeriodKind};

fn roster(class_count: usize, per_class: usize) -> AppData {
    let mut data = AppData::default();
    for c in 0..class_count {
        let class_id = format!("class-{c}");
        data.classes.push(Class {
            id: class_id.clone(),
            name: format!("1{c}A"),
            grade: 10,
            teacher: "T".into(),
            student_count: per_class as i64,
        });
        for s in 0..per_class {
            data.students.push(Student {
                id: format!("stu-{c}-{s}"),
                name: format!("Student {c}-{s}"),
                class_id: class_id.clone(),
                date_of_birth: None,
            });
        }
    }
    data
}

/// Deterministic spread of deltas across students and days.
fn scatter_records(data: &mut AppData, count: usize) {
    let students: Vec<(String, String)> = data
        .students
        .iter()
        .map(|s| (s.id.clone(), s.class_id.clone()))
        .collect();
    for i in 0..count {
        let (student_id, class_id) = &students[(i * 7) % students.len()];
        let points = [-0.5, -1.0, 2.0, -5.0, 1.0, -10.0, 5.0][i % 7];
        data.records.push(ScoreRecord {
            id: format!("rec-{i}"),
            student_id: student_id.clone(),
            class_id: class_id.clone(),
            date: format!("2024-11-{:02}", 1 + (i * 3) % 28),
            kind: if points < 0.0 {
                RecordType::Violation
            } else {
                RecordType::Reward
            },
            category: "c".into(),
            points,
            note: None,
            timestamp: i as i64,
        });
    }
}

fn range(start: &str, end: &str) -> DateRange {
    DateRange {
        start: start.into(),
        end: end.into(),
    }
}

#[test]
fn average_is_base_plus_deltas_over_roster_size() {
    let mut data = roster(3, 5);
    scatter_records(&mut data, 40);
    let window = range("2024-11-05", "2024-11-20");

    for class in &data.classes {
        let rep = calc::class_report(&data, &class.id, &window);
        let deltas: f64 = data
            .records
            .iter()
            .filter(|r| r.class_id == class.id && window.contains(&r.date))
            .map(|r| r.points)
            .sum();
        let expected = (100.0 * 5.0 + deltas) / 5.0;
        assert!((rep.average_score - expected).abs() < 1e-9, "{}", class.id);

        let from_students: f64 = rep.student_scores.iter().map(|s| s.score).sum::<f64>() / 5.0;
        assert!((rep.average_score - from_students).abs() < 1e-9);

        let counted = rep
            .student_scores
            .iter()
            .map(|s| s.violations + s.rewards)
            .sum::<usize>();
        assert_eq!(counted, rep.total_violations + rep.total_rewards);
    }
}

#[test]
fn ranking_is_sorted_and_timeline_ends_at_average() {
    let mut data = roster(1, 8);
    scatter_records(&mut data, 30);
    let rep = calc::class_report(&data, "class-0", &range("2024-01-01", "2024-12-31"));

    assert!(rep
        .student_scores
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
    assert_eq!(rep.student_scores.len(), 8);

    let dates: Vec<&str> = rep.timeline.iter().map(|p| p.date.as_str()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(dates, sorted);
    let last = rep.timeline.last().expect("timeline sample");
    assert!((last.average_score - rep.average_score).abs() < 1e-9);
}

#[test]
fn students_without_records_stay_at_base() {
    let mut data = roster(1, 20);
    scatter_records(&mut data, 2);
    let rep = calc::class_report(&data, "class-0", &range("2024-01-01", "2024-12-31"));
    let touched: Vec<&str> = data.records.iter().map(|r| r.student_id.as_str()).collect();
    for s in &rep.student_scores {
        if !touched.contains(&s.student_id.as_str()) {
            assert_eq!(s.score, 100.0);
            assert_eq!(s.violations + s.rewards, 0);
        }
    }
}

#[test]
fn resolved_periods_feed_the_report() {
    let mut data = roster(1, 2);
    scatter_records(&mut data, 10);
    let today = period::parse_date("2024-11-20").expect("date");
    let semester = period::resolve(PeriodKind::Semester, today, None).expect("semester");
    let week = period::resolve(PeriodKind::Week, today, None).expect("week");

    let full = calc::class_report(&data, "class-0", &semester);
    let recent = calc::class_report(&data, "class-0", &week);
    assert_eq!(full.start, "2024-09-01");
    assert_eq!(recent.start, "2024-11-13");
    assert!(
        recent.total_violations + recent.total_rewards <= full.total_violations + full.total_rewards
    );
}
