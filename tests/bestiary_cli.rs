//! Integration tests for the bestiary CLI
//!
//! Each test drives the real binary against a registry file in a temp dir.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn bestiary(file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bestiary"))
        .arg("--file")
        .arg(file)
        .args(args)
        .env_remove("BESTIARY_PATH")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run bestiary binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_add_search_remove_cycle() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bestiary.json");

    let out = bestiary(&file, &["add", "Drowner", "necrophage", "Igni"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Added monster 'Drowner'"));

    let out = bestiary(&file, &["add", "Werewolf", "cursed one", "Moon Dust, Silver"]);
    assert!(out.status.success());

    let out = bestiary(&file, &["search", "IGN"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains(" - Drowner (Type: necrophage)"));
    assert!(!text.contains("Werewolf"));

    let out = bestiary(&file, &["remove", "Drowner"]);
    assert!(out.status.success());

    let out = bestiary(&file, &["list"]);
    let text = stdout(&out);
    assert!(!text.contains("Drowner"));
    assert!(text.contains("Werewolf"));
}

#[test]
fn test_duplicate_add_reports_and_keeps_original() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bestiary.json");

    assert!(bestiary(&file, &["add", "Ghoul", "necrophage", "Silver"])
        .status
        .success());
    let before = fs::read(&file).unwrap();

    let out = bestiary(&file, &["add", "Ghoul", "ogroid", "Quen"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("already in the bestiary"));
    assert_eq!(fs::read(&file).unwrap(), before);
}

#[test]
fn test_remove_unknown_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bestiary.json");

    let out = bestiary(&file, &["remove", "Kikimore"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Monster 'Kikimore' not found."));
    assert!(!file.exists());
}

#[test]
fn test_search_with_no_matches_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bestiary.json");

    let out = bestiary(&file, &["search", "silver"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("No monsters vulnerable to 'silver' found."));
}

#[test]
fn test_unicode_names_survive_on_disk() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bestiary.json");

    assert!(bestiary(&file, &["add", "Утопец", "трупоед", "Игни"])
        .status
        .success());

    let raw = fs::read_to_string(&file).unwrap();
    assert!(raw.contains("\"Утопец\""));
    assert!(raw.contains("\"type\": \"трупоед\""));

    let out = bestiary(&file, &["search", "игни"]);
    assert!(stdout(&out).contains("Утопец"));
}

#[test]
fn test_corrupt_file_fails_without_being_overwritten() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bestiary.json");
    fs::write(&file, "{ not json").unwrap();

    let out = bestiary(&file, &["add", "Ghoul", "necrophage", "Silver"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("corrupt"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "{ not json");
}
