// Integration tests for `tally compare`: selection bounds and output
// contracts. CSV inputs carry one sheet per file, so the cross-sheet
// paths are exercised by selecting the same sheet more than once;
// multi-sheet alignment itself is covered by the engine's unit tests.

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

#[test]
fn single_sheet_selection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "q1.csv", "cat\nA\n");

    let output = tally()
        .arg("compare")
        .arg(&file)
        .args(["--sheet", "q1"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(12));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 to 5"), "stderr: {}", stderr);
}

#[test]
fn six_sheet_selection_is_rejected_before_loading() {
    // The bounds check runs before the file is opened, so even a
    // missing file reports the selection error, not an I/O error.
    let mut cmd = tally();
    cmd.arg("compare").arg("/no/such/file.csv");
    for _ in 0..6 {
        cmd.args(["--sheet", "q1"]);
    }
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(12));
}

#[test]
fn unknown_sheet_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "q1.csv", "cat\nA\n");

    let output = tally()
        .arg("compare")
        .arg(&file)
        .args(["--sheet", "q1", "--sheet", "q9"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("q9"), "stderr: {}", stderr);
}

#[test]
fn comparison_json_contract() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "q1.csv", "cat\nA\nA\nB\n");

    let output = tally()
        .arg("compare")
        .arg(&file)
        .args(["--sheet", "q1", "--sheet", "q1", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["measure"], "count");
    assert_eq!(json["sheets"], serde_json::json!(["q1", "q1"]));
    assert_eq!(json["top_labels"], serde_json::json!(["A", "B"]));

    let table = json["table"].as_array().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0]["label"], "A");
    assert_eq!(table[0]["q1"].as_f64(), Some(2.0));
    assert_eq!(table[1]["label"], "B");
    assert_eq!(table[1]["q1"].as_f64(), Some(1.0));
}

#[test]
fn top_caps_the_label_axis() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "q1.csv", "cat\nA\nA\nB\nC\n");

    let output = tally()
        .arg("compare")
        .arg(&file)
        .args(["--sheet", "q1", "--sheet", "q1", "--top", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["top_labels"], serde_json::json!(["A"]));
    assert_eq!(json["table"].as_array().unwrap().len(), 1);
}

#[test]
fn text_cross_tab_lists_every_ranked_label() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(&dir, "q1.csv", "cat\nA\nA\nB\n");

    let output = tally()
        .arg("compare")
        .arg(&file)
        .args(["--sheet", "q1", "--sheet", "q1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert!(lines.next().unwrap().starts_with("label"));
    assert!(stdout.contains("A"));
    assert!(stdout.contains("B"));
}
