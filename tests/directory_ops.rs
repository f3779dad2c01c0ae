mod common;

use common::Fixture;
use memfs_jim::ErrorKind;

#[test]
fn read_directory_lists_entries_sorted_excluding_dot_and_dotdot() {
    let fixture = Fixture::new();
    fixture.create_dir("/work/b");
    fixture.create_dir("/work/a");
    fixture.write_file("/work/c.txt", b"c");

    let listing = fixture.fs.read_directory(&fixture.path("/work")).unwrap();
    assert_eq!(listing, vec!["a".to_string(), "b".to_string(), "c.txt".to_string()]);
}

#[test]
fn creating_a_directory_under_a_missing_parent_fails() {
    let fixture = Fixture::new();
    let err = fixture.fs.create_directory(&fixture.path("/no/such/parent")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn deleting_an_empty_directory_succeeds() {
    let fixture = Fixture::new();
    fixture.create_dir("/empty");
    fixture.fs.delete(&fixture.path("/empty")).unwrap();
    assert!(!fixture.fs.exists(&fixture.path("/empty")));
}

#[test]
fn move_renames_a_directory_in_place() {
    let fixture = Fixture::new();
    fixture.create_dir("/old");
    fixture.write_file("/old/child.txt", b"data");

    fixture.fs.move_file(&fixture.path("/old"), &fixture.path("/new"), false).unwrap();

    assert!(!fixture.fs.exists(&fixture.path("/old")));
    assert_eq!(fixture.read_file("/new/child.txt"), b"data");
}

#[test]
fn move_into_own_subtree_is_rejected() {
    let fixture = Fixture::new();
    fixture.create_dir("/a");
    let err = fixture.fs.move_file(&fixture.path("/a"), &fixture.path("/a/b"), false).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[test]
fn move_without_replace_existing_fails_when_destination_present() {
    let fixture = Fixture::new();
    fixture.write_file("/src.txt", b"1");
    fixture.write_file("/dest.txt", b"2");
    let err = fixture.fs.move_file(&fixture.path("/src.txt"), &fixture.path("/dest.txt"), false).unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
}

#[test]
fn move_with_replace_existing_overwrites_destination() {
    let fixture = Fixture::new();
    fixture.write_file("/src.txt", b"fresh");
    fixture.write_file("/dest.txt", b"stale");
    fixture.fs.move_file(&fixture.path("/src.txt"), &fixture.path("/dest.txt"), true).unwrap();
    assert_eq!(fixture.read_file("/dest.txt"), b"fresh");
}
