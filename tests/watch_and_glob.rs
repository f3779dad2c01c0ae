mod common;

use std::time::Duration;

use common::Fixture;
use memfs_jim::watch::EventKind;
use memfs_jim::{Configuration, PathTypeKind, WatchServiceConfiguration};

#[test]
fn polling_watch_reports_a_create_event() {
    let config = Configuration::builder(PathTypeKind::Unix)
        .roots(["/"])
        .working_directory("/work")
        .watch_service_configuration(WatchServiceConfiguration::polling(Duration::from_millis(10)))
        .build();
    let fixture = Fixture::with_config(config);
    fixture.fs.register_watch(&fixture.path("/work"), vec![EventKind::Create]).unwrap();

    fixture.write_file("/work/new.txt", b"x");

    let key = fixture.fs.take_watch_key().unwrap();
    let events = key.poll_events();
    assert!(events.iter().any(|e| e.kind == EventKind::Create && e.name.display() == "new.txt"));
}

#[test]
fn glob_star_matches_within_one_segment_only() {
    let fixture = Fixture::new();
    let matcher = fixture.fs.compile_glob("*.txt").unwrap();
    assert!(matcher.is_match("notes.txt"));
    assert!(!matcher.is_match("sub/notes.txt"));
}

#[test]
fn glob_double_star_matches_across_segments() {
    let fixture = Fixture::new();
    let matcher = fixture.fs.compile_glob("**/*.txt").unwrap();
    assert!(matcher.is_match("a/b/notes.txt"));
}

#[test]
fn glob_brace_alternation_matches_either_branch() {
    let fixture = Fixture::new();
    let matcher = fixture.fs.compile_glob("*.{txt,md}").unwrap();
    assert!(matcher.is_match("readme.md"));
    assert!(matcher.is_match("readme.txt"));
    assert!(!matcher.is_match("readme.rs"));
}
