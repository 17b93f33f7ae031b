//! End-to-end runs of the `abstractor` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};

fn text(font: &str, size: f64, flags: u32, text: &str, x: f64, y: f64, h: f64) -> Value {
    json!({
        "type": "text", "page": 1, "text": text, "font": font, "size": size, "flags": flags,
        "position": {"x": x, "y": y, "w": 5.0 * text.len() as f64, "h": h}
    })
}

fn raw_book() -> Value {
    json!({
        "metadata": {"source": "book.pdf"},
        "tokens": [
            text("MyriadPro-SemiCn", 8.5, 4, "HYPERTENSION 2024", 40.0, 30.0, 10.0),
            text("STIX-Bold", 8.5, 20, "0001", 40.0, 100.0, 10.0),
            text("STIX-Bold", 8.5, 20, "Salt and blood pressure", 40.0, 112.0, 10.0),
            text("STIX-Bold", 8.5, 20, "A. Smith", 40.0, 124.0, 10.0),
            text("STIX-Regular", 5.9, 4, "1", 81.0, 123.0, 6.0),
            text("STIX-Regular", 8.5, 4, ";", 86.0, 124.0, 10.0),
            text("STIX-Regular", 5.9, 4, "1", 40.0, 135.0, 6.0),
            text("STIX-Regular", 8.5, 4, "University of Pisa", 45.0, 136.0, 10.0),
            text("STIX-Bold", 8.5, 20, "Results:", 40.0, 150.0, 10.0),
            text("STIX-Regular", 8.5, 4, "BP decreased.", 85.0, 150.0, 10.0),
        ]
    })
}

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        std::fs::write(ws.path("profile.toml"), "").unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    /// Run the binary with an empty profile so user config files do not leak in.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_abstractor"))
            .current_dir(self.dir.path())
            .env_remove("ABSTRACTOR_PROFILE")
            .env_remove("RUST_LOG")
            .arg("--no-color")
            .arg("--profile")
            .arg(self.path("profile.toml"))
            .args(args)
            .output()
            .unwrap()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn run_produces_abstracts_and_intermediates() {
    let ws = Workspace::new();
    ws.write_json("raw.json", &raw_book());

    let out = ws.run(&[
        "run",
        "-i",
        "raw.json",
        "-o",
        "abstracts.json",
        "--strip-headers",
        "--keep-intermediate",
        "stages",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 abstracts (0 withdrawn)"), "stdout: {}", stdout);
    assert!(stdout.contains("removed 1 headers/footers"));

    let abstracts = read_json(&ws.path("abstracts.json"));
    let record = &abstracts["abstracts"][0];
    assert_eq!(record["abstract_id"], "abs_0001");
    assert_eq!(record["abstract_code"], "0001");
    assert_eq!(record["title"], "Salt and blood pressure");
    assert_eq!(record["authors"], json!([{"name": "A. Smith", "indices": [1]}]));
    assert_eq!(
        record["institutions"],
        json!([{"index": 1, "text": "University of Pisa"}])
    );
    assert_eq!(record["sections"]["results"], "BP decreased.");

    for stage in ["neutral.json", "pass1.json", "cleaned.json", "pass2.json"] {
        assert!(ws.path("stages").join(stage).exists(), "missing {}", stage);
    }
}

#[test]
fn stages_run_one_by_one() {
    let ws = Workspace::new();
    ws.write_json("raw.json", &raw_book());

    for args in [
        ["normalize", "-i", "raw.json", "-o", "neutral.json"],
        ["pass1", "-i", "neutral.json", "-o", "pass1.json"],
        ["pass2", "-i", "pass1.json", "-o", "pass2.json"],
        ["pass3", "-i", "pass2.json", "-o", "abstracts.json"],
    ] {
        let out = ws.run(&args);
        assert!(out.status.success(), "{:?}: {}", args, String::from_utf8_lossy(&out.stderr));
    }

    let neutral = read_json(&ws.path("neutral.json"));
    assert_eq!(neutral["metadata"]["source"], "book.pdf");
    assert!(neutral["signature_catalog"]["STIX-Bold_8.5_20"]["count"].as_u64() > Some(0));

    let pass2 = read_json(&ws.path("pass2.json"));
    assert_eq!(pass2["metadata"]["contextual_pass"]["abstracts"], 1);

    let abstracts = read_json(&ws.path("abstracts.json"));
    assert_eq!(abstracts["abstracts"].as_array().map(Vec::len), Some(1));
}

#[test]
fn signatures_lists_most_frequent_first() {
    let ws = Workspace::new();
    ws.write_json("raw.json", &raw_book());
    assert!(ws.run(&["normalize", "-i", "raw.json", "-o", "neutral.json"]).status.success());

    let out = ws.run(&["signatures", "-i", "neutral.json", "--limit", "1"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("STIX-Bold_8.5_20"));
}

#[test]
fn missing_input_fails() {
    let ws = Workspace::new();
    let out = ws.run(&["pass1", "-i", "nope.json", "-o", "out.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("input not found"));
    assert!(!ws.path("out.json").exists());
}

#[test]
fn schema_error_fails() {
    let ws = Workspace::new();
    ws.write_json("bad.json", &json!({"elements": "not a list"}));
    let out = ws.run(&["pass1", "-i", "bad.json", "-o", "out.json"]);
    assert!(!out.status.success());
}

#[test]
fn empty_document_fails_contextual_pass() {
    let ws = Workspace::new();
    ws.write_json("empty.json", &json!({"metadata": {}, "elements": []}));
    let out = ws.run(&["pass2", "-i", "empty.json", "-o", "out.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no elements"));
}

#[test]
fn invalid_profile_fails() {
    let ws = Workspace::new();
    ws.write_json("raw.json", &raw_book());
    std::fs::write(ws.path("profile.toml"), "[profile]\ntitle = [\"no-size-here\"]\n").unwrap();
    let out = ws.run(&["run", "-i", "raw.json", "-o", "abstracts.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid style profile"));
}

#[test]
fn invalid_layout_section_fails() {
    let ws = Workspace::new();
    std::fs::write(ws.path("profile.toml"), "[layout]\nmerge_y_tolerance = -1.0\n").unwrap();
    ws.write_json("raw.json", &raw_book());
    let out = ws.run(&["normalize", "-i", "raw.json", "-o", "neutral.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid layout configuration"));
}

#[test]
fn no_merge_keeps_every_token() {
    let ws = Workspace::new();
    let raw = json!({
        "tokens": [
            text("STIX-Regular", 8.5, 4, "Hypertension", 40.0, 130.0, 10.0),
            text("STIX-Regular", 8.5, 4, "is common.", 105.0, 130.0, 10.0),
        ]
    });
    ws.write_json("raw.json", &raw);

    assert!(ws.run(&["normalize", "-i", "raw.json", "-o", "merged.json"]).status.success());
    let merged = read_json(&ws.path("merged.json"));
    assert_eq!(merged["elements"].as_array().map(Vec::len), Some(1));

    let out = ws.run(&["normalize", "-i", "raw.json", "-o", "split.json", "--no-merge"]);
    assert!(out.status.success());
    let split = read_json(&ws.path("split.json"));
    assert_eq!(split["elements"].as_array().map(Vec::len), Some(2));
}

#[test]
fn config_prints_effective_profile() {
    let ws = Workspace::new();
    std::fs::write(ws.path("profile.toml"), "[layout]\nmerge_y_tolerance = 2.5\n").unwrap();
    let out = ws.run(&["config"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[layout]"), "stdout: {}", stdout);
    assert!(stdout.contains("merge_y_tolerance = 2.5"));
}
