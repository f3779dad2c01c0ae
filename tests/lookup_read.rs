mod common;

use common::Fixture;
use memfs_jim::attr::AttributeValue;
use memfs_jim::ErrorKind;

#[test]
fn read_at_past_end_of_file_returns_empty() {
    let fixture = Fixture::new();
    fixture.write_file("/short.txt", b"abc");
    let path = fixture.path("/short.txt");
    let channel = fixture
        .fs
        .open_channel(&path, memfs_jim::channel::ChannelMode::READ, false)
        .unwrap();

    let mut buf = [0u8; 4];
    let n = channel.read_at(10, &mut buf).unwrap();
    assert_eq!(n, -1);
}

#[test]
fn opening_a_missing_file_without_create_fails_not_found() {
    let fixture = Fixture::new();
    let err = fixture
        .fs
        .open_channel(&fixture.path("/missing.txt"), memfs_jim::channel::ChannelMode::READ, false)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn opening_a_directory_as_a_channel_fails_is_directory() {
    let fixture = Fixture::new();
    fixture.create_dir("/adir");
    let err = fixture
        .fs
        .open_channel(&fixture.path("/adir"), memfs_jim::channel::ChannelMode::READ, false)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::IsDirectory);
}

#[test]
fn basic_attributes_report_size_and_kind() {
    let fixture = Fixture::new();
    fixture.write_file("/data.bin", b"0123456789");

    let size = fixture.fs.get_attribute(&fixture.path("/data.bin"), "basic:size").unwrap();
    assert_eq!(size, AttributeValue::U64(10));
}
