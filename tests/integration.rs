use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const TRIANGLE: &str = r#"{
  "nodes": [
    {"id": "a", "group": "core", "lon": 0.0, "lat": 0.0},
    {"id": "b", "group": "core", "lon": 1.0, "lat": 2.0},
    {"id": "c", "group": 7, "lon": 2.0, "lat": 4.0}
  ],
  "links": [
    {"source": "a", "target": "b", "weight": 2},
    {"source": "b", "target": "c"},
    {"source": "c", "target": "nowhere"}
  ]
}"#;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path.to_str().expect("non-UTF-8 temp path").to_string()
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_netlayout"))
        .args(args)
        .output()
        .expect("Failed to execute netlayout")
}

fn parse_stdout(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "netlayout exited with error: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn node<'a>(snapshot: &'a Value, id: &str) -> &'a Value {
    snapshot["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == id)
        .unwrap_or_else(|| panic!("node {id} missing"))
}

fn assert_well_formed(snapshot: &Value) {
    let nodes = snapshot["nodes"].as_array().unwrap();
    for n in nodes {
        assert!(n["x"].as_f64().is_some_and(f64::is_finite), "bad x in {n}");
        assert!(n["y"].as_f64().is_some_and(f64::is_finite), "bad y in {n}");
    }
    for link in snapshot["links"].as_array().unwrap() {
        for end in ["source", "target"] {
            assert!(
                nodes.iter().any(|n| n["id"] == link[end]),
                "link endpoint {} not in nodes",
                link[end]
            );
        }
    }
}

#[test]
fn circular_layout_places_first_node_at_angle_zero() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "graph.json", TRIANGLE);

    let output = run(&[
        "layout", "--input", &input, "--mode", "circular", "--width", "100", "--height", "100",
    ]);
    let snapshot = parse_stdout(&output);

    assert_eq!(snapshot["mode"], "circular");
    assert_eq!(snapshot["links"].as_array().unwrap().len(), 2);
    let a = node(&snapshot, "a");
    assert!((a["x"].as_f64().unwrap() - 90.0).abs() < 1e-9);
    assert!((a["y"].as_f64().unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(node(&snapshot, "c")["group"], "7");
    assert_well_formed(&snapshot);
}

#[test]
fn coordinate_layout_reads_custom_fields() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "graph.json", TRIANGLE);

    let output = run(&[
        "layout", "-i", &input, "-m", "coordinate", "--width", "200", "--height", "100",
        "--x-field", "lon", "--y-field", "lat",
    ]);
    let snapshot = parse_stdout(&output);

    assert_eq!(node(&snapshot, "a")["x"], 0.0);
    assert_eq!(node(&snapshot, "a")["y"], 100.0);
    assert_eq!(node(&snapshot, "c")["x"], 200.0);
    assert_eq!(node(&snapshot, "c")["y"], 0.0);
}

#[test]
fn force_layout_converges_within_viewport_bounds() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "graph.yaml", &yaml_triangle());

    let snapshot = parse_stdout(&run(&["layout", "--input", &input]));

    assert_eq!(snapshot["mode"], "force");
    assert!(snapshot["alpha"].as_f64().unwrap() <= 0.02);
    assert_eq!(snapshot["nodes"].as_array().unwrap().len(), 3);
    assert_well_formed(&snapshot);
}

#[test]
fn trace_emits_one_line_per_published_snapshot() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "graph.json", TRIANGLE);
    let out_path = dir.path().join("trace.jsonl");

    let output = run(&[
        "layout",
        "--input",
        &input,
        "--max-steps",
        "20",
        "--trace",
        "--output",
        out_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "output goes to the file");

    let text = fs::read_to_string(&out_path).unwrap();
    let versions: Vec<u64> = text
        .lines()
        .map(|line| {
            let snapshot: Value = serde_json::from_str(line).unwrap();
            assert_well_formed(&snapshot);
            snapshot["version"].as_u64().unwrap()
        })
        .collect();

    // the seeded snapshot plus one every second frame
    assert_eq!(versions.len(), 11);
    assert!(versions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "graph.json", TRIANGLE);
    let config = write_fixture(&dir, "tuning.yaml", "force:\n  alpha_decay: 0.5\n");

    let output = run(&[
        "layout", "--input", &input, "--config", &config, "--max-steps", "1000", "--trace",
    ]);
    assert!(output.status.success());

    // alpha halves every frame: 1 -> 0.5 -> ... -> 0.015625 after six frames
    let last = String::from_utf8_lossy(&output.stdout)
        .lines()
        .last()
        .map(|line| serde_json::from_str::<Value>(line).unwrap())
        .unwrap();
    assert_eq!(last["frame"], 6);
}

#[test]
fn unsupported_input_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "graph.ttl", "");

    let output = run(&["layout", "--input", &input]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported format"), "stderr: {stderr}");
}

#[test]
fn missing_input_file_fails() {
    let output = run(&["layout", "--input", Path::new("does/not/exist.json").to_str().unwrap()]);
    assert!(!output.status.success());
}

fn yaml_triangle() -> String {
    let graph: Value = serde_json::from_str(TRIANGLE).unwrap();
    serde_yaml::to_string(&graph).unwrap()
}
