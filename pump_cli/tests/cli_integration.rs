use assert_cmd::Command;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

// Scenario table plus a two-point deterministic fixture.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[sampler]
interval_ms = 10
initial_head = 31.0
initial_flow = 40.0

[source]
kind = "fixture"
seed = 7
points = [[0.9, 27.0], [2.5, 16.0]]

[envelope]
bands = [[1, 25.0, 30.0], [3, 15.0, 28.0], [6, 0.0, 10.0]]

[display]
in_band_color = "green"
out_of_band_color = "red"
"#;
    let path = dir.path().join("pump.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn pump() -> Command {
    Command::cargo_bin("pump").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["classify", "--head", "0.9", "--flow", "27"], 0, "in_band", "stdout")]
#[case(&["classify", "--head", "2.9", "--flow", "10"], 0, "out_of_band", "stdout")]
#[case(&["classify", "--head", "7.0", "--flow", "5"], 0, "no envelope band", "stdout")]
#[case(&["classify", "--head", "abc", "--flow", "5"], 3, "not a valid head value", "stderr")]
#[case(&["self-check"], 0, "3 envelope bands", "stdout")]
#[case(&["classify"], 2, "required", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = pump();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn builtin_reference_data_passes_self_check() {
    pump()
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("7 envelope bands"))
        .stdout(predicate::str::contains("33 points"));
}

#[test]
fn classify_json_output() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = pump()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["classify", "--head", "0.9", "--flow", "27"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["classification"], "in_band");
    assert_eq!(v["band"], 1);
}

#[test]
fn render_explicit_point_uses_display_colors() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = pump()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["render", "--head", "5.4", "--flow", "20"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["highlight"]["x"], 20.0);
    assert_eq!(v["highlight"]["y"], 5.4);
    assert_eq!(v["highlight"]["color"], "red");
    let bands: Vec<f64> = v["max_envelope"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["y"].as_f64().unwrap())
        .collect();
    assert_eq!(bands, vec![1.0, 3.0, 6.0]);
}

#[test]
fn render_without_point_shows_first_fixture_sample() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = pump()
        .arg("--config")
        .arg(&cfg)
        .arg("render")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    // Both fixture points are in band.
    assert_eq!(v["highlight"]["classification"], "in_band");
    assert_eq!(v["highlight"]["color"], "green");
}

#[test]
fn watch_stops_after_requested_ticks() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = pump()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["watch", "--ticks", "3", "--interval-ms", "5"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    for (i, v) in lines.iter().enumerate() {
        assert_eq!(v["seq"], i as u64 + 1);
        assert_eq!(v["origin"], "sampled");
        assert_eq!(v["classification"], "in_band");
        assert!(v["stale_ms"].is_u64(), "stale_ms missing in {v}");
    }
}

#[test]
fn interactive_overrides_are_applied_and_bad_input_rejected() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let assert = pump()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["watch", "--interval-ms", "60000", "--interactive"])
        .write_stdin("flow abc\nhead 5.4\n")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stderr(predicate::str::contains("\"abc\""));
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let last: serde_json::Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(last["origin"], "override");
    assert_eq!(last["head"], 5.4);
    assert_eq!(last["classification"], "out_of_band");
}

#[test]
fn telemetry_source_reads_points_from_stdin() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("telemetry.toml");
    fs::write(
        &path,
        "[source]\nkind = \"telemetry\"\n[sampler]\ninterval_ms = 5\n",
    )
    .unwrap();
    pump()
        .arg("--config")
        .arg(&path)
        .args(["watch", "--ticks", "1"])
        .write_stdin("0.9, 27\n")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("head=  0.90"))
        .stdout(predicate::str::contains("in_band"));
}

#[test]
fn telemetry_watch_exits_when_stdin_closes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("telemetry.toml");
    fs::write(
        &path,
        "[source]\nkind = \"telemetry\"\n[sampler]\ninterval_ms = 5\n",
    )
    .unwrap();
    let out = pump()
        .arg("--json")
        .arg("--config")
        .arg(&path)
        .arg("watch")
        .write_stdin("0.9 27\n")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    let last: serde_json::Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(last["origin"], "sampled");
    assert_eq!(last["head"], 0.9);
    assert_eq!(last["flow"], 27.0);
    assert_eq!(last["classification"], "in_band");
}

#[rstest]
#[case("[sampler]\ninterval_ms = 0\n", "interval_ms")]
#[case("[envelope]\nbands = [[3, 15.0, 28.0], [3, 1.0, 2.0]]\n", "duplicated")]
#[case("[envelope]\nbands = [[2, 30.0, 10.0]]\n", "min_flow <= max_flow")]
#[case("[sampler\n", "parse")]
fn invalid_config_exits_with_code_2(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();
    pump()
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn envelope_csv_replaces_config_table() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let csv = dir.path().join("envelope.csv");
    let mut f = fs::File::create(&csv).unwrap();
    writeln!(f, "head_band,min_flow,max_flow").unwrap();
    writeln!(f, "1,0,5").unwrap();
    pump()
        .arg("--config")
        .arg(&cfg)
        .arg("--envelope-csv")
        .arg(&csv)
        .args(["classify", "--head", "0.9", "--flow", "27"])
        .assert()
        .success()
        .stdout(predicate::str::contains("out_of_band"));
}

#[test]
fn cli_reports_bad_envelope_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let bad_csv = dir.path().join("envelope.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "band,lo,hi").unwrap();
    writeln!(f, "1,25,30").unwrap();

    pump()
        .arg("--config")
        .arg(&cfg)
        .arg("--envelope-csv")
        .arg(&bad_csv)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("head_band,min_flow,max_flow"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = pump()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["classify", "--head", "1", "--flow", "NaN"])
        .assert()
        .code(3)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "InvalidInput");
    assert_eq!(v["details"]["field"], "flow");
}
