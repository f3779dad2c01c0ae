use memfs_jim::channel::ChannelMode;
use memfs_jim::{Configuration, FileSystem, JimfsPath};

/// Wraps one in-memory [`FileSystem`] per test, the way the teacher's own
/// `Fixture` wraps one temp directory per test.
pub struct Fixture {
    pub fs: FileSystem,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture::with_config(Configuration::unix())
    }

    pub fn with_config(config: Configuration) -> Self {
        Fixture { fs: FileSystem::new(config).expect("build filesystem") }
    }

    pub fn path(&self, raw: &str) -> JimfsPath {
        self.fs.path(raw).expect("parse path")
    }

    pub fn write_file(&self, raw: &str, data: &[u8]) {
        let path = self.path(raw);
        self.fs.create_file(&path).expect("create fixture file");
        let channel = self
            .fs
            .open_channel(&path, ChannelMode::WRITE, false)
            .expect("open fixture file for write");
        channel.write(data).expect("write fixture contents");
    }

    pub fn create_dir(&self, raw: &str) {
        self.fs.create_directory(&self.path(raw)).expect("create fixture dir");
    }

    pub fn read_file(&self, raw: &str) -> Vec<u8> {
        let path = self.path(raw);
        let channel = self
            .fs
            .open_channel(&path, ChannelMode::READ, false)
            .expect("open fixture file for read");
        let mut buf = vec![0u8; channel.size() as usize];
        channel.read_at(0, &mut buf).expect("read fixture contents");
        buf
    }
}
