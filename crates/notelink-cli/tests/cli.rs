use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("Note A.md"), "# A\n\nSee [[Note B|the other]].\n").unwrap();
    fs::write(root.join("sub/Note B.md"), "Back to [[Note A]].\n").unwrap();
    dir
}

fn notelink(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_notelink"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_resolve_prints_json() {
    let dir = workspace();
    let out = stdout(&notelink(dir.path(), &["resolve", "sub/Note B"]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["kind"], "note");
    assert_eq!(json["matchedKey"], "sub/note-b");
}

#[test]
fn test_suggest_json() {
    let dir = workspace();
    let out = stdout(&notelink(dir.path(), &["suggest", "note", "--json"]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let displays: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["display"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(displays, vec!["Note A", "Note B"]);
}

#[test]
fn test_render_with_source_map() {
    let dir = workspace();
    let file = dir.path().join("Note A.md");
    let out = stdout(&notelink(
        dir.path(),
        &["render", file.to_str().unwrap(), "--source-map", "--json"],
    ));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let html = json["html"].as_str().unwrap();
    assert!(html.contains(">the other</span>"));
    assert_eq!(json["sourceMap"].as_array().unwrap().len(), 2);
}

#[test]
fn test_rename_dry_run_then_write() {
    let dir = workspace();
    let note_a = dir.path().join("Note A.md");

    let out = stdout(&notelink(dir.path(), &["rename", "note-b", "Renamed"]));
    assert!(out.contains("1 link(s)"));
    assert!(fs::read_to_string(&note_a).unwrap().contains("[[Note B|the other]]"));

    stdout(&notelink(dir.path(), &["rename", "note-b", "Renamed", "--write"]));
    assert!(fs::read_to_string(&note_a).unwrap().contains("[[Renamed|the other]]"));
}

#[test]
fn test_missing_root_fails() {
    let dir = TempDir::new().unwrap();
    let output = notelink(&dir.path().join("missing"), &["index"]);
    assert!(!output.status.success());
}

#[test]
fn test_verbose_flag_enables_debug_logging() {
    let dir = workspace();
    let output = Command::new(env!("CARGO_BIN_EXE_notelink"))
        .arg("--root")
        .arg(dir.path())
        .args(["index", "-v"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Using workspace root"));
}
