use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "dice-roller-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report_with_history() {
    let exe = env!("CARGO_BIN_EXE_dice-roller");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args([
            "--dice",
            "2d6,d20:adv=1,3d8:reroll<2",
            "--times",
            "3",
            "--seed",
            "77",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(value["seed"], 77);
    assert_eq!(value["history"].as_array().map(Vec::len), Some(3));
    let rolls = value["last_result"]["rolls"].as_array().expect("rolls");
    assert_eq!(rolls.len(), 3);
    assert_eq!(value["origins"], serde_json::json!([0, 1, 2]));
    assert_eq!(rolls[0]["perDie"].as_array().map(Vec::len), Some(2));
    assert_eq!(rolls[2]["perDie"].as_array().map(Vec::len), Some(3));
}

#[test]
fn cli_same_seed_reproduces_report() {
    let exe = env!("CARGO_BIN_EXE_dice-roller");
    let run = |label: &str| {
        let output_path = temp_path(label);
        let status = Command::new(exe)
            .args(["--dice", "4d10:dis=2", "--seed", "5", "--report", "markdown", "--output"])
            .arg(&output_path)
            .status()
            .expect("run cli");
        assert!(status.success());
        std::fs::read_to_string(output_path).expect("read output")
    };
    let first = run("repeat-a");
    let second = run("repeat-b");
    let table = |text: &str| {
        text.lines()
            .filter(|line| line.starts_with("| 4d10"))
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    assert_eq!(table(&first), table(&second));
    assert_eq!(table(&first).len(), 1);
}

#[test]
fn cli_reports_service_rejection() {
    let exe = env!("CARGO_BIN_EXE_dice-roller");
    let output = Command::new(exe)
        .args(["--dice", "d20000", "--seed", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Roll failed: sides exceeds max allowed"));
}

#[test]
fn cli_rejects_bad_notation() {
    let exe = env!("CARGO_BIN_EXE_dice-roller");
    let output = Command::new(exe)
        .args(["--dice", "twelve"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not dice notation"));
}
