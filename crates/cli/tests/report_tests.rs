// Integration tests for `tally report` and `tally sheets` over CSV files.
// Run with: cargo test -p tallygrid-cli --test report_tests

use std::path::PathBuf;
use std::process::Command;

fn tally() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tally"))
}

fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write test csv");
    path
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn count_report_json_contract() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "cat\nA\nA\nB\n");

    let output = tally().arg("report").arg(&file).arg("--json").output().unwrap();
    let json = stdout_json(&output);

    assert_eq!(json["sheet"], "data");
    assert_eq!(json["measure"], "count");
    assert_eq!(json["total"].as_f64(), Some(3.0));
    assert_eq!(json["rows"].as_f64(), Some(3.0));
    assert_eq!(json["distinct_labels"].as_f64(), Some(2.0));

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "A");
    assert_eq!(entries[0]["value"].as_f64(), Some(2.0));
    assert_eq!(entries[1]["name"], "B");
    assert_eq!(entries[1]["value"].as_f64(), Some(1.0));
}

#[test]
fn top_n_folds_tail_into_other() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "cat\nA\nA\nB\n");

    let output = tally()
        .arg("report")
        .arg(&file)
        .args(["--top", "1", "--json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["name"], "Other");
    assert_eq!(entries[1]["other"], true);
    assert_eq!(entries[1]["value"].as_f64(), Some(1.0));
    let children = entries[1]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["name"], "B");
}

#[test]
fn sum_measure_coerces_malformed_values() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "cat,amt\nx,\"1,200\"\nx,abc\nx,300\n");

    let output = tally()
        .arg("report")
        .arg(&file)
        .args(["--measure", "sum", "--value", "amt", "--json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);

    assert_eq!(json["measure"], "sum");
    assert_eq!(json["total"].as_f64(), Some(1500.0));
    assert_eq!(json["rows"].as_f64(), Some(3.0));
}

#[test]
fn sum_without_numeric_column_refuses_with_dedicated_code() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "name,note\na,hello\nb,world\n");

    let output = tally()
        .arg("report")
        .arg(&file)
        .args(["--measure", "sum"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no numeric column"), "stderr: {}", stderr);
    assert!(output.stdout.is_empty(), "no partial output on refusal");
}

#[test]
fn unknown_column_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "cat\nA\n");

    let output = tally()
        .arg("report")
        .arg(&file)
        .args(["--label", "nope"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no such column"), "stderr: {}", stderr);
}

#[test]
fn missing_file_is_an_io_error() {
    let output = tally()
        .arg("report")
        .arg("/definitely/not/here.csv")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn search_scopes_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "cat\nWidget A\nWidget B\nGadget\n");

    let output = tally()
        .arg("report")
        .arg(&file)
        .args(["--search", "widget", "--json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);

    assert_eq!(json["rows"].as_f64(), Some(2.0));
    let entries = json["entries"].as_array().unwrap();
    assert!(entries
        .iter()
        .all(|e| e["name"].as_str().unwrap().contains("Widget")));
}

#[test]
fn sort_asc_reverses_order_without_changing_membership() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "cat\nA\nA\nA\nB\n");

    let output = tally()
        .arg("report")
        .arg(&file)
        .args(["--sort", "asc", "--json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries[0]["name"], "B");
    assert_eq!(entries[1]["name"], "A");
}

#[test]
fn csv_output_quotes_awkward_labels() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "data.csv", "cat\n\"Widgets, large\"\nGadgets\n");

    let output = tally().arg("report").arg(&file).arg("--csv").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("name,value,share"));
    assert!(stdout.contains("\"Widgets, large\",1,0.5000"));
    assert!(stdout.contains("Gadgets,1,0.5000"));
}

#[test]
fn sheets_command_lists_headers_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "inventory.csv", "Region,Units\nEast,10\nWest,5\n");

    let output = tally().arg("sheets").arg(&file).arg("--json").output().unwrap();
    let json = stdout_json(&output);
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "inventory");
    assert_eq!(list[0]["rows"].as_f64(), Some(2.0));
    assert_eq!(
        list[0]["headers"],
        serde_json::json!(["Region", "Units"])
    );
}

#[test]
fn detect_command_reports_roles() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        &dir,
        "tickets.csv",
        "Ticket ID,Status,Assignee,Hours\nT-1,Open,amy,2\n",
    );

    let output = tally().arg("detect").arg(&file).arg("--json").output().unwrap();
    let json = stdout_json(&output);
    let mapping = &json["tickets"];
    assert_eq!(mapping["label"], "Ticket ID");
    assert_eq!(mapping["status"], "Status");
    assert_eq!(mapping["assignee"], "Assignee");
    assert_eq!(mapping["duration"], "Hours");
}
