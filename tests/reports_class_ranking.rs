use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_flagmasterd");
    let mut child = Command::new(exe)
        .env_remove("FLAGMASTER_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn flagmasterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

fn select(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, workspace: &PathBuf) {
    let _ = request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
}

fn str_field(v: &serde_json::Value, key: &str) -> String {
    v.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing {key} in {v}"))
        .to_string()
}

fn scores(report: &serde_json::Value) -> Vec<(String, f64, u64, u64)> {
    report
        .get("studentScores")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|s| {
            (
                str_field(&s, "name"),
                s.get("score").and_then(|v| v.as_f64()).expect("score"),
                s.get("violations").and_then(|v| v.as_u64()).expect("violations"),
                s.get("rewards").and_then(|v| v.as_u64()).expect("rewards"),
            )
        })
        .collect()
}

#[test]
fn two_student_class_report_matches_worked_example() {
    let workspace = temp_dir("flagmaster-report-example");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select(&mut stdin, &mut reader, &workspace);

    let class = request_ok(&mut stdin, &mut reader, "1", "classes.create", json!({ "name": "10A1" }));
    let class_id = str_field(&class, "classId");
    let a = request_ok(&mut stdin, &mut reader, "2", "students.create", json!({ "classId": class_id, "name": "A" }));
    let b = request_ok(&mut stdin, &mut reader, "3", "students.create", json!({ "classId": class_id, "name": "B" }));

    // v6 is the -5 default violation, r3 the +2 default reward.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "records.add",
        json!({ "studentId": str_field(&a, "studentId"), "categoryId": "v6", "date": "2024-11-04" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "records.add",
        json!({ "studentId": str_field(&b, "studentId"), "categoryId": "r3", "date": "2024-11-05" }),
    );

    let report = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "reports.classReport",
        json!({ "classId": class_id, "period": "semester", "today": "2024-11-20" }),
    );
    assert_eq!(str_field(&report, "start"), "2024-09-01");
    assert_eq!(str_field(&report, "end"), "2024-11-20");
    assert_eq!(
        scores(&report),
        vec![("B".to_string(), 102.0, 0, 1), ("A".to_string(), 95.0, 1, 0)]
    );
    assert_eq!(report.get("averageScore").and_then(|v| v.as_f64()), Some(98.5));
    assert_eq!(report.get("totalViolations").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(report.get("totalRewards").and_then(|v| v.as_u64()), Some(1));

    let timeline = report
        .get("timeline")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].get("averageScore").and_then(|v| v.as_f64()), Some(97.5));
    assert_eq!(timeline[1].get("averageScore").and_then(|v| v.as_f64()), Some(98.5));

    // A week ending well after the events sees none of them.
    let quiet = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "reports.classReport",
        json!({ "classId": class_id, "period": "week", "today": "2024-12-20" }),
    );
    assert!(scores(&quiet).iter().all(|(_, score, _, _)| *score == 100.0));
    assert_eq!(quiet.get("averageScore").and_then(|v| v.as_f64()), Some(100.0));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn empty_class_reports_zero_average_without_error() {
    let workspace = temp_dir("flagmaster-report-empty");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select(&mut stdin, &mut reader, &workspace);

    let class = request_ok(&mut stdin, &mut reader, "1", "classes.create", json!({ "name": "12C1" }));
    let report = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.classReport",
        json!({ "classId": str_field(&class, "classId"), "period": "month", "today": "2024-11-20" }),
    );
    assert_eq!(report.get("averageScore").and_then(|v| v.as_f64()), Some(0.0));
    assert_eq!(report.get("studentScores"), Some(&json!([])));
    assert_eq!(str_field(&report, "start"), "2024-10-20");

    let missing = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reports.classReport",
        json!({ "classId": "no-such-class", "period": "week", "today": "2024-11-20" }),
    );
    assert!(missing.get("class").map(|v| v.is_null()).unwrap_or(false));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn equal_scores_keep_roster_order_and_undo_restores_counts() {
    let workspace = temp_dir("flagmaster-report-ties");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select(&mut stdin, &mut reader, &workspace);

    let class = request_ok(&mut stdin, &mut reader, "1", "classes.create", json!({ "name": "10A3" }));
    let class_id = str_field(&class, "classId");
    let mut ids = Vec::new();
    for (i, name) in ["Zed", "Anh", "Minh"].into_iter().enumerate() {
        let s = request_ok(
            &mut stdin,
            &mut reader,
            &format!("s{i}"),
            "students.create",
            json!({ "classId": class_id, "name": name }),
        );
        ids.push(str_field(&s, "studentId"));
    }
    let params = json!({
        "classId": class_id,
        "period": "custom",
        "start": "2024-11-01",
        "end": "2024-11-30"
    });

    let before = request_ok(&mut stdin, &mut reader, "2", "reports.classReport", params.clone());
    let names: Vec<String> = scores(&before).into_iter().map(|s| s.0).collect();
    assert_eq!(names, vec!["Zed", "Anh", "Minh"]);

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "records.add",
        json!({ "studentId": ids[2], "categoryId": "v4", "date": "2024-11-10", "note": "homework" }),
    );
    let during = request_ok(&mut stdin, &mut reader, "4", "reports.classReport", params.clone());
    assert_eq!(
        scores(&during)[2],
        ("Minh".to_string(), 98.0, 1, 0)
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "records.delete",
        json!({ "recordId": str_field(&added, "recordId") }),
    );
    let after = request_ok(&mut stdin, &mut reader, "6", "reports.classReport", params.clone());
    assert_eq!(before, after);

    let inverted = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "reports.resolvePeriod",
        json!({ "period": "custom", "start": "2024-12-01", "end": "2024-11-01" }),
    );
    assert_eq!(str_field(&inverted, "start"), "2024-12-01");

    let bad = request(
        &mut stdin,
        &mut reader,
        "8",
        "reports.resolvePeriod",
        json!({ "period": "custom", "start": "", "end": "2024-11-01" }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn dashboard_counts_today_and_ranks_classes() {
    let workspace = temp_dir("flagmaster-dashboard");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select(&mut stdin, &mut reader, &workspace);

    let good = request_ok(&mut stdin, &mut reader, "1", "classes.create", json!({ "name": "Good" }));
    let bad = request_ok(&mut stdin, &mut reader, "2", "classes.create", json!({ "name": "Bad" }));
    let g = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "classId": str_field(&good, "classId"), "name": "G" }),
    );
    let b = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "classId": str_field(&bad, "classId"), "name": "B" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "records.add",
        json!({ "studentId": str_field(&g, "studentId"), "categoryId": "r5", "date": "2024-11-19" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "records.add",
        json!({ "studentId": str_field(&b, "studentId"), "categoryId": "v7", "date": "2024-11-20" }),
    );

    let dash = request_ok(&mut stdin, &mut reader, "7", "reports.dashboard", json!({ "today": "2024-11-20" }));
    assert_eq!(dash.get("violationsToday").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(dash.get("rewardsToday").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(dash.get("totalStudents").and_then(|v| v.as_u64()), Some(2));
    let top = dash.get("top").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    assert_eq!(str_field(&top[0], "name"), "Good");
    assert_eq!(top[0].get("score").and_then(|v| v.as_f64()), Some(105.0));
    let bottom = dash.get("bottom").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    assert_eq!(str_field(&bottom[0], "name"), "Bad");
    assert_eq!(bottom[0].get("score").and_then(|v| v.as_f64()), Some(90.0));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
