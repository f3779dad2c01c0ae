mod common;

use common::Fixture;
use memfs_jim::channel::ChannelMode;
use memfs_jim::{Configuration, ErrorKind, PathTypeKind};

#[test]
fn writing_past_capacity_fails_with_out_of_space() {
    let config = Configuration::builder(PathTypeKind::Unix)
        .roots(["/"])
        .working_directory("/work")
        .block_size(4)
        .max_size(8)
        .max_cache_size(0)
        .build();
    let fixture = Fixture::with_config(config);
    let path = fixture.path("/work/big.bin");
    fixture.fs.create_file(&path).unwrap();
    let channel = fixture.fs.open_channel(&path, ChannelMode::WRITE, false).unwrap();

    let err = channel.write(&[0u8; 64]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::OutOfSpace);
}

#[test]
fn windows_unc_path_round_trips_through_a_uri() {
    let fixture = Fixture::with_config(Configuration::windows());
    let path = fixture.path("\\\\host\\share\\notes.txt");
    let uri = fixture.fs.to_uri(&path, false);
    let round_tripped = fixture.fs.from_uri(&uri).unwrap();
    assert_eq!(round_tripped, path);
}

#[test]
fn moving_a_non_empty_directory_across_roots_is_rejected() {
    let config = Configuration::builder(PathTypeKind::Windows)
        .roots(["C:\\", "D:\\"])
        .working_directory("C:\\work")
        .build();
    let fixture = Fixture::with_config(config);
    fixture.fs.create_directory(&fixture.path("C:\\dir")).unwrap();
    fixture.fs.create_file(&fixture.path("C:\\dir\\child.txt")).unwrap();

    let err = fixture.fs.move_file(&fixture.path("C:\\dir"), &fixture.path("D:\\dir"), false).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unsupported);
}

#[test]
fn moving_an_empty_directory_across_roots_succeeds() {
    let config = Configuration::builder(PathTypeKind::Windows)
        .roots(["C:\\", "D:\\"])
        .working_directory("C:\\work")
        .build();
    let fixture = Fixture::with_config(config);
    fixture.fs.create_directory(&fixture.path("C:\\empty")).unwrap();

    fixture.fs.move_file(&fixture.path("C:\\empty"), &fixture.path("D:\\empty"), false).unwrap();
    assert!(fixture.fs.exists(&fixture.path("D:\\empty")));
}
