mod common;

use common::Fixture;
use memfs_jim::ErrorKind;

#[test]
fn symlink_target_resolves_through_lookup() {
    let fixture = Fixture::new();
    fixture.write_file("/real.txt", b"contents");
    fixture.fs.create_symbolic_link(&fixture.path("/link"), &fixture.path("/real.txt")).unwrap();

    assert_eq!(fixture.read_file("/link"), b"contents");
}

#[test]
fn symlink_loop_is_rejected() {
    let fixture = Fixture::new();
    fixture.fs.create_symbolic_link(&fixture.path("/a"), &fixture.path("/b")).unwrap();
    fixture.fs.create_symbolic_link(&fixture.path("/b"), &fixture.path("/a")).unwrap();

    let err = fixture.fs.exists(&fixture.path("/a/child"));
    assert!(!err);

    let direct_err = fixture.fs.read_attributes(&fixture.path("/a"), "basic:size").unwrap_err();
    assert_eq!(direct_err.kind, ErrorKind::Loop);
}

#[test]
fn hard_link_shares_content_with_the_original() {
    let fixture = Fixture::new();
    fixture.write_file("/original.txt", b"shared");
    fixture.fs.create_link(&fixture.path("/alias.txt"), &fixture.path("/original.txt")).unwrap();

    assert_eq!(fixture.read_file("/alias.txt"), b"shared");

    fixture.fs.delete(&fixture.path("/original.txt")).unwrap();
    assert_eq!(fixture.read_file("/alias.txt"), b"shared");
}

#[test]
fn hard_linking_a_directory_is_rejected() {
    let fixture = Fixture::new();
    fixture.create_dir("/dir");
    let err = fixture.fs.create_link(&fixture.path("/dir-alias"), &fixture.path("/dir")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unsupported);
}
