//! [`FileSystem`]: the façade tying the file tree, block storage,
//! attribute service, resource state, and watch service together into
//! the operations client code actually calls (spec §2 "Data flow", §4
//! throughout). Grounded on `src/vfs_task.rs`'s role as the single owner
//! that every RPC procedure ultimately dispatches through — generalized
//! from "one task per connection, dispatching NFS procedures" to "one
//! handle per filesystem instance, dispatching path operations".

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::attr::{AttributeService, AttributeValue, AttributeView};
use crate::channel::{ChannelMode, FileChannel};
use crate::config::{Configuration, Feature, PathTypeKind};
use crate::error::{not_found, ErrorKind, FsError, FsResult};
use crate::path::{compile_glob, from_uri, parse_uri_path, to_uri, GlobMatcher, JimfsPath, PathFlavor, PathType};
use crate::state::{Closeable, FileSystemState};
use crate::storage::{CacheCapacity, HeapDisk, RegularFile};
use crate::streams::{JimfsInputStream, JimfsOutputStream};
use crate::tree::{look_up, File, FileKind, FileTree, LinkOptions};
use crate::watch::{EventKind, PollingWatchService, WatchKey};

use tracing::{debug, warn};

fn next_default_name() -> String {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    format!("memfs-{}", NEXT.fetch_add(1, Ordering::Relaxed))
}

pub struct FileSystem {
    name: String,
    path_type: Arc<PathType>,
    tree: FileTree,
    disk: Arc<HeapDisk>,
    attributes: Arc<AttributeService>,
    state: Arc<FileSystemState>,
    watch_service: PollingWatchService,
    working_directory: Arc<File>,
    features: Vec<Feature>,
    /// Guards every sequence of lookups/links/unlinks that must appear
    /// atomic to observers (spec §5: "the filesystem-wide file-tree
    /// lock... held for lookup, create, rename, and delete"). Channel
    /// I/O never takes this lock.
    tree_lock: Mutex<()>,
}

fn build_path_type(config: &Configuration) -> PathType {
    match config.path_type {
        PathTypeKind::Unix => PathType {
            flavor: PathFlavor::Unix,
            separator: '/',
            alternate_separators: Vec::new(),
            canonical_normalization: config.name_canonical_normalization,
            display_normalization: config.name_display_normalization,
        },
        PathTypeKind::OsX => PathType {
            flavor: PathFlavor::OsX,
            separator: '/',
            alternate_separators: Vec::new(),
            canonical_normalization: config.name_canonical_normalization,
            display_normalization: config.name_display_normalization,
        },
        PathTypeKind::Windows => PathType {
            flavor: PathFlavor::Windows,
            separator: '\\',
            alternate_separators: vec!['/'],
            canonical_normalization: config.name_canonical_normalization,
            display_normalization: config.name_display_normalization,
        },
    }
}

/// `mkdir -p`: walks from `path`'s root, creating any missing
/// intermediate directories and seeding their attributes.
fn mkdir_p(tree: &FileTree, attributes: &AttributeService, path: &JimfsPath) -> FsResult<Arc<File>> {
    let mut current = match path.root() {
        Some(root) => tree.root(root).ok_or_else(|| not_found(path.to_string()))?,
        None => return Err(FsError::with_message(ErrorKind::InvalidArgument, "working directory must be absolute")),
    };
    for name in path.names() {
        let existing = current.with_directory(|dir| dir.get(name)).expect("current is always a directory here");
        current = match existing {
            Some(file) => file,
            None => {
                let dir = File::new_directory(Weak::new());
                attributes.set_initial_attributes(&dir, &HashMap::new())?;
                tree.link(&current, name.clone(), dir.clone())?;
                dir
            }
        };
    }
    Ok(current)
}

impl FileSystem {
    pub fn new(config: Configuration) -> FsResult<FileSystem> {
        let path_type = Arc::new(build_path_type(&config));

        let tree = FileTree::new();
        let attribute_views: Vec<&str> = config.attribute_views.iter().map(String::as_str).collect();
        let attributes = Arc::new(AttributeService::new(&attribute_views, config.default_attribute_values.clone())?);

        for root in &config.roots {
            let parsed = path_type
                .parse_path(root)
                .map_err(|e| FsError::with_path_and_message(ErrorKind::InvalidArgument, root.clone(), e.reason))?;
            let key = parsed
                .root
                .ok_or_else(|| FsError::with_message(ErrorKind::InvalidArgument, format!("'{root}' is not a root path")))?;
            let root_dir = tree.create_root(&key);
            attributes.set_initial_attributes(&root_dir, &HashMap::new())?;
        }

        let working_directory_path = JimfsPath::parse(path_type.clone(), &config.working_directory)
            .map_err(|e| FsError::with_path_and_message(ErrorKind::InvalidArgument, config.working_directory.clone(), e.reason))?;
        let working_directory = mkdir_p(&tree, &attributes, &working_directory_path)?;

        let disk = Arc::new(HeapDisk::new(
            config.block_size as usize,
            config.max_size,
            CacheCapacity::from_config(config.max_cache_size, config.block_size as usize),
        ));

        let name = next_default_name();
        debug!(name = %name, roots = ?config.roots, "filesystem instance created");

        Ok(FileSystem {
            name,
            path_type,
            tree,
            disk,
            attributes,
            state: Arc::new(FileSystemState::new()),
            watch_service: PollingWatchService::new(config.watch_service_configuration.interval()),
            working_directory,
            features: config.supported_features,
            tree_lock: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self, raw: &str) -> FsResult<JimfsPath> {
        JimfsPath::parse(self.path_type.clone(), raw)
            .map_err(|e| FsError::with_path_and_message(ErrorKind::InvalidArgument, raw, e.reason))
    }

    fn check_feature(&self, feature: Feature) -> FsResult<()> {
        if self.features.contains(&feature) {
            Ok(())
        } else {
            Err(FsError::with_message(ErrorKind::Unsupported, format!("{feature:?} is not enabled on this filesystem")))
        }
    }

    fn resolve_existing(&self, path: &JimfsPath, options: LinkOptions) -> FsResult<Arc<File>> {
        self.state.check_open()?;
        let _guard = self.tree_lock.lock().unwrap();
        let entry = look_up(&self.tree, &self.working_directory, path, options)?;
        entry.file.ok_or_else(|| not_found(path.to_string()))
    }

    pub fn exists(&self, path: &JimfsPath) -> bool {
        self.resolve_existing(path, LinkOptions::default()).is_ok()
    }

    fn create_entry(&self, path: &JimfsPath, kind: FileKind) -> FsResult<Arc<File>> {
        self.state.check_open()?;
        let _guard = self.tree_lock.lock().unwrap();
        let entry = look_up(&self.tree, &self.working_directory, path, LinkOptions { nofollow_links: true })?;
        if entry.exists() {
            return Err(FsError::with_path(ErrorKind::AlreadyExists, path.to_string()));
        }
        let name = entry
            .name
            .ok_or_else(|| FsError::with_message(ErrorKind::InvalidArgument, "path has no final name component"))?;
        let file = File::new(kind);
        self.attributes.set_initial_attributes(&file, &HashMap::new())?;
        self.tree.link(&entry.directory, name, file.clone())?;
        Ok(file)
    }

    pub fn create_directory(&self, path: &JimfsPath) -> FsResult<()> {
        self.state.check_open()?;
        let _guard = self.tree_lock.lock().unwrap();
        let entry = look_up(&self.tree, &self.working_directory, path, LinkOptions { nofollow_links: true })?;
        if entry.exists() {
            return Err(FsError::with_path(ErrorKind::AlreadyExists, path.to_string()));
        }
        let name = entry
            .name
            .ok_or_else(|| FsError::with_message(ErrorKind::InvalidArgument, "path has no final name component"))?;
        let dir = File::new_directory(Weak::new());
        self.attributes.set_initial_attributes(&dir, &HashMap::new())?;
        self.tree.link(&entry.directory, name, dir)?;
        Ok(())
    }

    pub fn create_file(&self, path: &JimfsPath) -> FsResult<()> {
        self.create_entry(path, FileKind::RegularFile(Arc::new(RegularFile::new(self.disk.clone())))).map(|_| ())
    }

    pub fn create_symbolic_link(&self, path: &JimfsPath, target: &JimfsPath) -> FsResult<()> {
        self.check_feature(Feature::SymbolicLinks)?;
        self.create_entry(path, FileKind::SymbolicLink(target.clone())).map(|_| ())
    }

    /// Hard link: `link_path` becomes a second directory entry for the
    /// file `existing_path` names. POSIX disallows hard-linking
    /// directories; so does this library.
    pub fn create_link(&self, link_path: &JimfsPath, existing_path: &JimfsPath) -> FsResult<()> {
        self.check_feature(Feature::Links)?;
        self.state.check_open()?;
        let _guard = self.tree_lock.lock().unwrap();
        let existing = look_up(&self.tree, &self.working_directory, existing_path, LinkOptions { nofollow_links: true })?;
        let existing_file = existing.file.ok_or_else(|| not_found(existing_path.to_string()))?;
        if existing_file.is_directory() {
            return Err(FsError::with_message(ErrorKind::Unsupported, "cannot create a hard link to a directory"));
        }
        let link_entry = look_up(&self.tree, &self.working_directory, link_path, LinkOptions { nofollow_links: true })?;
        if link_entry.exists() {
            return Err(FsError::with_path(ErrorKind::AlreadyExists, link_path.to_string()));
        }
        let name = link_entry
            .name
            .ok_or_else(|| FsError::with_message(ErrorKind::InvalidArgument, "path has no final name component"))?;
        self.tree.link(&link_entry.directory, name, existing_file)?;
        Ok(())
    }

    pub fn delete(&self, path: &JimfsPath) -> FsResult<()> {
        self.state.check_open()?;
        let _guard = self.tree_lock.lock().unwrap();
        let entry = look_up(&self.tree, &self.working_directory, path, LinkOptions { nofollow_links: true })?;
        let file = entry.file.clone().ok_or_else(|| not_found(path.to_string()))?;
        let name = entry.name.clone().expect("an existing entry always has a name");

        if file.is_directory() {
            let is_empty = file.with_directory(|dir| dir.is_empty()).expect("checked is_directory above");
            if !is_empty {
                return Err(FsError::with_path(ErrorKind::DirectoryNotEmpty, path.to_string()));
            }
        }

        let removed = self.tree.unlink(&entry.directory, &name)?;
        if let Some(regular) = removed.regular_file() {
            if removed.link_count() == 0 && regular.open_count() == 0 {
                debug!(path = %path, "freeing blocks for deleted file");
                regular.deleted();
            }
        }
        Ok(())
    }

    /// Moves `source` to `dest`. Fails with `AlreadyExists` at `dest`
    /// unless `replace_existing`; fails if `source` names a directory and
    /// `dest` lies within it.
    pub fn move_file(&self, source: &JimfsPath, dest: &JimfsPath, replace_existing: bool) -> FsResult<()> {
        self.move_file_impl(source, dest, replace_existing)
    }

    /// Atomic move (mirrors `Files.move` called with `ATOMIC_MOVE`):
    /// rejects overwriting `dest` unconditionally, regardless of any
    /// `REPLACE_EXISTING` a caller might otherwise pass to
    /// [`Self::move_file`].
    pub fn move_file_atomic(&self, source: &JimfsPath, dest: &JimfsPath) -> FsResult<()> {
        self.move_file_impl(source, dest, false)
    }

    fn move_file_impl(&self, source: &JimfsPath, dest: &JimfsPath, replace_existing: bool) -> FsResult<()> {
        self.state.check_open()?;
        let _guard = self.tree_lock.lock().unwrap();

        let source_entry = look_up(&self.tree, &self.working_directory, source, LinkOptions { nofollow_links: true })?;
        let source_file = source_entry.file.clone().ok_or_else(|| not_found(source.to_string()))?;
        let source_name = source_entry.name.clone().expect("an existing entry always has a name");

        if source_file.is_directory() && dest.starts_with(source) {
            return Err(FsError::with_message(ErrorKind::InvalidArgument, "cannot move a directory into its own subtree"));
        }
        if source_file.is_directory() && source.root() != dest.root() {
            let is_empty = source_file.with_directory(|dir| dir.is_empty()).expect("checked is_directory above");
            if !is_empty {
                return Err(FsError::with_message(ErrorKind::Unsupported, "cannot move a non-empty directory across roots"));
            }
        }

        let dest_entry = look_up(&self.tree, &self.working_directory, dest, LinkOptions { nofollow_links: true })?;
        let dest_name = dest_entry.name.clone().expect("a valid destination path always has a final name");
        if dest_entry.exists() {
            if !replace_existing {
                return Err(FsError::with_path(ErrorKind::AlreadyExists, dest.to_string()));
            }
            self.tree.unlink(&dest_entry.directory, &dest_name)?;
        }

        self.tree.unlink(&source_entry.directory, &source_name)?;
        self.tree.link(&dest_entry.directory, dest_name, source_file)?;
        Ok(())
    }

    /// Opens (optionally creating) a synchronous byte channel over a
    /// regular file.
    pub fn open_channel(&self, path: &JimfsPath, mode: ChannelMode, create: bool) -> FsResult<Arc<FileChannel>> {
        self.check_feature(Feature::FileChannel)?;
        self.state.check_open()?;

        let file = {
            let _guard = self.tree_lock.lock().unwrap();
            let entry = look_up(&self.tree, &self.working_directory, path, LinkOptions::default())?;
            match entry.file {
                Some(file) => {
                    if !file.is_regular_file() {
                        return Err(FsError::new(ErrorKind::IsDirectory));
                    }
                    file
                }
                None => {
                    if !create {
                        return Err(not_found(path.to_string()));
                    }
                    let name = entry.name.expect("a missing-final-component entry always has a name");
                    let file = File::new(FileKind::RegularFile(Arc::new(RegularFile::new(self.disk.clone()))));
                    self.attributes.set_initial_attributes(&file, &HashMap::new())?;
                    self.tree.link(&entry.directory, name, file.clone())?;
                    file
                }
            }
        };

        let regular = file.regular_file().expect("checked is_regular_file or just created one");
        let channel = FileChannel::new(regular, mode);
        self.state.register(channel.clone());
        Ok(channel)
    }

    pub fn new_input_stream(&self, path: &JimfsPath) -> FsResult<JimfsInputStream> {
        let channel = self.open_channel(path, ChannelMode::READ, false)?;
        Ok(JimfsInputStream::new(channel))
    }

    pub fn new_output_stream(&self, path: &JimfsPath, append: bool, truncate_existing: bool) -> FsResult<JimfsOutputStream> {
        let mode = if append { ChannelMode::WRITE | ChannelMode::APPEND } else { ChannelMode::WRITE };
        let channel = self.open_channel(path, mode, true)?;
        if truncate_existing && !append {
            channel.truncate(0)?;
        }
        Ok(JimfsOutputStream::new(channel))
    }

    pub fn read_attributes(&self, path: &JimfsPath, spec: &str) -> FsResult<HashMap<String, AttributeValue>> {
        let file = self.resolve_existing(path, LinkOptions::default())?;
        self.attributes.read_attributes(&file, spec)
    }

    pub fn get_attribute(&self, path: &JimfsPath, spec: &str) -> FsResult<AttributeValue> {
        let file = self.resolve_existing(path, LinkOptions::default())?;
        self.attributes.get_attribute(&file, spec)
    }

    pub fn set_attribute(&self, path: &JimfsPath, spec: &str, value: AttributeValue) -> FsResult<()> {
        let file = self.resolve_existing(path, LinkOptions::default())?;
        self.attributes.set_attribute(&file, spec, value, false)
    }

    pub fn attribute_view(self: &Arc<Self>, path: &JimfsPath, view_name: &'static str) -> FsResult<Option<AttributeView>> {
        let file = self.resolve_existing(path, LinkOptions::default())?;
        Ok(AttributeView::new(self.attributes.clone(), file, view_name))
    }

    /// Sorted directory listing (display order), excluding `.`/`..`.
    pub fn read_directory(&self, path: &JimfsPath) -> FsResult<Vec<String>> {
        let file = self.resolve_existing(path, LinkOptions::default())?;
        file.with_directory(|dir| dir.snapshot().iter().map(|n| n.display().to_owned()).collect())
            .ok_or_else(|| FsError::new(ErrorKind::NotDirectory))
    }

    pub fn register_watch(&self, path: &JimfsPath, kinds: Vec<EventKind>) -> FsResult<Arc<WatchKey>> {
        let dir = self.resolve_existing(path, LinkOptions::default())?;
        self.watch_service.register(dir, kinds)
    }

    pub fn take_watch_key(&self) -> FsResult<Arc<WatchKey>> {
        self.watch_service.take()
    }

    /// Async counterpart of [`Self::take_watch_key`] (spec §9 "Coroutines
    /// / async").
    pub async fn take_watch_key_async(&self) -> FsResult<Arc<WatchKey>> {
        self.watch_service.take_async().await
    }

    /// Opens a channel the way [`Self::open_channel`] does, wrapped in an
    /// [`crate::channel::AsynchronousFileChannel`] that dispatches each
    /// call to a worker pool instead of blocking the caller's thread.
    pub fn open_async_channel(
        &self,
        path: &JimfsPath,
        mode: ChannelMode,
        create: bool,
    ) -> FsResult<crate::channel::AsynchronousFileChannel> {
        let channel = self.open_channel(path, mode, create)?;
        Ok(crate::channel::AsynchronousFileChannel::new(channel))
    }

    pub fn compile_glob(&self, pattern: &str) -> FsResult<GlobMatcher> {
        compile_glob(pattern, self.path_type.separator, self.path_type.canonical_normalization)
            .map_err(|e| FsError::with_message(ErrorKind::InvalidArgument, format!("{e}")))
    }

    pub fn to_uri(&self, path: &JimfsPath, is_directory: bool) -> String {
        to_uri(&self.name, path, is_directory)
    }

    pub fn from_uri(&self, uri: &str) -> FsResult<JimfsPath> {
        let (name, path_str, _is_directory) = from_uri(uri).map_err(|e| FsError::with_message(ErrorKind::InvalidArgument, e.to_string()))?;
        if name != self.name {
            return Err(FsError::with_message(ErrorKind::InvalidArgument, format!("URI names filesystem '{name}', not '{}'", self.name)));
        }
        parse_uri_path(self.path_type.clone(), &path_str).map_err(|e| FsError::with_message(ErrorKind::InvalidArgument, e.reason))
    }

    pub fn close(&self) -> FsResult<()> {
        let result = self.state.close();
        if let Err(err) = &result {
            warn!(name = %self.name, error = %err, "filesystem close reported a failure");
        }
        self.watch_service.close();
        crate::registry::registry().remove(&self.name);
        result
    }
}

impl Closeable for FileChannel {
    fn close(&self) -> FsResult<()> {
        FileChannel::close(self);
        Ok(())
    }
}
