use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const ASSETS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets");

fn demo() -> Command {
    let mut cmd = Command::cargo_bin("bunny_demo").expect("binary exists");
    cmd.arg("--assets").arg(ASSETS);
    cmd
}

fn temp_json(content: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp file");
    tmp.write_all(content.as_bytes()).expect("write temp file");
    tmp
}

#[test]
fn headless_idle_run_prints_summary() {
    demo()
        .args(["--headless", "--frames", "5"])
        .assert()
        .success()
        .stdout(contains("variant: basic"))
        .stdout(contains("frames: 5"))
        .stdout(contains("offset: 0.00"))
        .stdout(contains("camera: position=(0.00, 0.00) rotation=0.000 zoom=1.000"))
        .stdout(contains("sprites: 21"))
        .stdout(contains("audio: none"))
        .stdout(contains("script: Lua: loaded"));
}

#[test]
fn replay_drives_shipped_script() {
    let replay = temp_json(r#"{ "dt": 1.0, "frames": [{ "held": ["ArrowDown"], "repeat": 3 }] }"#);
    demo()
        .args(["--headless", "--replay"])
        .arg(replay.path())
        .assert()
        .success()
        .stdout(contains("frames: 3"))
        .stdout(contains("offset: -300.00"));
}

#[test]
fn replay_without_script_matches_scripted_run() {
    let replay = temp_json(r#"{ "dt": 1.0, "frames": [{ "held": ["ArrowDown"], "repeat": 3 }] }"#);
    demo()
        .args(["--headless", "--no-script", "--replay"])
        .arg(replay.path())
        .assert()
        .success()
        .stdout(contains("offset: -300.00"))
        .stdout(contains("script: Lua: fallback"));
}

#[test]
fn explorer_requests_music() {
    demo()
        .args(["--headless", "--variant", "explorer", "--frames", "1"])
        .assert()
        .success()
        .stdout(contains("variant: explorer"))
        .stdout(contains("audio: drumloop.wav"));
}

#[test]
fn custom_config_file_is_used() {
    let config = temp_json(
        r#"{
            "name": "sideways",
            "controls": { "axes": [{ "target": "camera_x", "negative": "KeyA", "positive": "KeyD" }] }
        }"#,
    );
    let replay = temp_json(r#"{ "dt": 0.5, "frames": [{ "held": ["KeyD"], "repeat": 2 }] }"#);
    demo()
        .args(["--headless", "--config"])
        .arg(config.path())
        .arg("--replay")
        .arg(replay.path())
        .assert()
        .success()
        .stdout(contains("variant: sideways"))
        .stdout(contains("camera: position=(100.00, 0.00)"));
}

#[test]
fn unknown_variant_fails() {
    demo()
        .args(["--headless", "--variant", "giant"])
        .assert()
        .failure();
}

#[test]
fn missing_config_fails() {
    demo()
        .args(["--headless", "--config", "__no_such_variant__.json"])
        .assert()
        .failure();
}

#[test]
fn malformed_replay_fails() {
    let replay = temp_json(r#"{ "frames": [] }"#);
    demo()
        .args(["--headless", "--replay"])
        .arg(replay.path())
        .assert()
        .failure();
}

#[test]
fn zero_frames_fails() {
    demo()
        .args(["--headless", "--frames", "0"])
        .assert()
        .failure();
}
