mod common;

use common::Fixture;
use memfs_jim::channel::ChannelMode;
use memfs_jim::{Configuration, ErrorKind};

#[test]
fn unix_create_write_read_round_trips() {
    let fixture = Fixture::new();
    let path = fixture.path("/work/report.txt");
    fixture.fs.create_file(&path).expect("create file");

    let channel = fixture.fs.open_channel(&path, ChannelMode::READ | ChannelMode::WRITE, false).unwrap();
    channel.write(b"hello, memfs").unwrap();

    let mut buf = [0u8; 12];
    channel.read_at(0, &mut buf).unwrap();
    assert_eq!(&buf, b"hello, memfs");
    assert_eq!(channel.size(), 12);
}

#[test]
fn create_file_twice_fails_with_already_exists() {
    let fixture = Fixture::new();
    let path = fixture.path("/dup.txt");
    fixture.fs.create_file(&path).unwrap();
    let err = fixture.fs.create_file(&path).unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
}

#[test]
fn output_stream_truncates_existing_contents_by_default() {
    let fixture = Fixture::new();
    fixture.write_file("/log.txt", b"old contents here");

    let path = fixture.path("/log.txt");
    let mut stream = fixture.fs.new_output_stream(&path, false, true).unwrap();
    use std::io::Write;
    stream.write_all(b"new").unwrap();

    assert_eq!(fixture.read_file("/log.txt"), b"new");
}

#[test]
fn append_output_stream_ignores_position_and_grows_the_file() {
    let fixture = Fixture::new();
    fixture.write_file("/append.txt", b"abc");

    let path = fixture.path("/append.txt");
    let mut stream = fixture.fs.new_output_stream(&path, true, false).unwrap();
    use std::io::Write;
    stream.write_all(b"def").unwrap();

    assert_eq!(fixture.read_file("/append.txt"), b"abcdef");
}

#[test]
fn truncate_then_position_is_clamped() {
    let fixture = Fixture::new();
    fixture.write_file("/data.bin", b"0123456789");

    let path = fixture.path("/data.bin");
    let channel = fixture.fs.open_channel(&path, ChannelMode::READ | ChannelMode::WRITE, false).unwrap();
    channel.set_position(9).unwrap();
    channel.truncate(4).unwrap();

    assert_eq!(channel.position(), 4);
    assert_eq!(channel.size(), 4);
    let mut buf = [0u8; 4];
    channel.read_at(0, &mut buf).unwrap();
    assert_eq!(&buf, b"0123");
}

#[test]
fn os_x_rejects_case_variant_of_existing_name() {
    let fixture = Fixture::with_config(Configuration::os_x());
    fixture.fs.create_file(&fixture.path("/Notes.txt")).unwrap();
    let err = fixture.fs.create_file(&fixture.path("/notes.TXT")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
}
