//! The storage seam — named byte stores with ordinary file semantics.
//!
//! [`Storage`] abstracts the removable medium the recorder writes to:
//! create-or-truncate by name, remove by name, and handles that support
//! `Read + Write + Seek`.  Closing a file is dropping its handle.
//!
//! [`DiskStorage`] is the production implementation over `std::fs`, rooted
//! at a directory.  [`MemStorage`] (available under `#[cfg(test)]`) keeps
//! files in shared memory and can inject per-file failures, so the recorder
//! state machine can be tested without touching the filesystem.

use std::fs;
use std::io::{self, Read, Seek, Write};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// A named byte store with ordinary file semantics.
///
/// Handles returned by [`create`](Self::create) are opened for both writing
/// and reading back: the recorder appends the raw payload through the handle
/// and later seeks it back to the start to stream the finalize copy.
pub trait Storage {
    /// The file handle type.
    type File: Read + Write + Seek;

    /// Create `name`, truncating any existing content, opened read+write.
    fn create(&mut self, name: &str) -> io::Result<Self::File>;

    /// Remove `name` from the store.
    fn remove(&mut self, name: &str) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// DiskStorage
// ---------------------------------------------------------------------------

/// Filesystem-backed storage rooted at a directory.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Root the store at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The root directory.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl Storage for DiskStorage {
    type File = fs::File;

    fn create(&mut self, name: &str) -> io::Result<fs::File> {
        fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.root.join(name))
    }

    fn remove(&mut self, name: &str) -> io::Result<()> {
        fs::remove_file(self.root.join(name))
    }
}

// ---------------------------------------------------------------------------
// MemStorage  (test-only)
// ---------------------------------------------------------------------------

/// In-memory test double with shared visibility and failure injection.
///
/// Cloning shares the underlying store, so a test can keep a handle to the
/// same files a recorder owns and inspect them afterwards:
///
/// ```text
/// let storage = MemStorage::new();
/// let recorder = Recorder::new(bus, storage.clone(), &config);
/// …
/// assert!(storage.exists("audio.wav"));
/// ```
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemStorage {
    state: std::sync::Arc<std::sync::Mutex<mem::MemState>>,
}

#[cfg(test)]
impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently stored under `name`, if present.
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(name).cloned()
    }

    /// Whether `name` exists in the store.
    pub fn exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(name)
    }

    /// Make the next `create(name)` fail with `PermissionDenied`.
    pub fn fail_create(&self, name: &str) {
        self.state.lock().unwrap().fail_create.insert(name.into());
    }

    /// Make the next write through a handle on `name` fail (one-shot).
    pub fn fail_writes_to(&self, name: &str) {
        self.state.lock().unwrap().fail_write.insert(name.into());
    }

    /// Make the next read through a handle on `name` fail (one-shot).
    pub fn fail_reads_from(&self, name: &str) {
        self.state.lock().unwrap().fail_read.insert(name.into());
    }
}

#[cfg(test)]
impl Storage for MemStorage {
    type File = mem::MemFile;

    fn create(&mut self, name: &str) -> io::Result<mem::MemFile> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create.remove(name) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected create failure for {name}"),
            ));
        }
        state.files.insert(name.into(), Vec::new());
        Ok(mem::MemFile {
            name: name.into(),
            state: std::sync::Arc::clone(&self.state),
            pos: 0,
        })
    }

    fn remove(&mut self, name: &str) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{name} not found")))
    }
}

#[cfg(test)]
mod mem {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::io::SeekFrom;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub struct MemState {
        pub files: HashMap<String, Vec<u8>>,
        pub fail_create: HashSet<String>,
        pub fail_write: HashSet<String>,
        pub fail_read: HashSet<String>,
    }

    /// Handle to one in-memory file; position is per-handle, content shared.
    pub struct MemFile {
        pub(super) name: String,
        pub(super) state: Arc<Mutex<MemState>>,
        pub(super) pos: u64,
    }

    impl Write for MemFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut state = self.state.lock().unwrap();
            if state.fail_write.remove(&self.name) {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("injected write failure for {}", self.name),
                ));
            }
            let data = state.files.get_mut(&self.name).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} removed", self.name))
            })?;
            let pos = self.pos as usize;
            if pos > data.len() {
                data.resize(pos, 0);
            }
            let overlap = buf.len().min(data.len().saturating_sub(pos));
            data[pos..pos + overlap].copy_from_slice(&buf[..overlap]);
            data.extend_from_slice(&buf[overlap..]);
            self.pos += buf.len() as u64;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Read for MemFile {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut state = self.state.lock().unwrap();
            if state.fail_read.remove(&self.name) {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("injected read failure for {}", self.name),
                ));
            }
            let data = state.files.get(&self.name).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} removed", self.name))
            })?;
            let pos = (self.pos as usize).min(data.len());
            let n = buf.len().min(data.len() - pos);
            buf[..n].copy_from_slice(&data[pos..pos + n]);
            self.pos += n as u64;
            Ok(n)
        }
    }

    impl Seek for MemFile {
        fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
            let len = {
                let state = self.state.lock().unwrap();
                state.files.get(&self.name).map_or(0, Vec::len) as i64
            };
            let target = match from {
                SeekFrom::Start(p) => p as i64,
                SeekFrom::End(off) => len + off,
                SeekFrom::Current(off) => self.pos as i64 + off,
            };
            if target < 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "seek before start",
                ));
            }
            self.pos = target as u64;
            Ok(self.pos)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::SeekFrom;

    // ---- DiskStorage -------------------------------------------------------

    #[test]
    fn disk_write_seek_read_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut storage = DiskStorage::new(dir.path()).expect("storage");

        let mut f = storage.create("clip.raw").expect("create");
        f.write_all(b"abcdef").expect("write");
        f.seek(SeekFrom::Start(0)).expect("seek");

        let mut back = Vec::new();
        f.read_to_end(&mut back).expect("read");
        assert_eq!(back, b"abcdef");
    }

    #[test]
    fn disk_create_truncates_existing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut storage = DiskStorage::new(dir.path()).expect("storage");

        storage
            .create("clip.raw")
            .unwrap()
            .write_all(b"old content")
            .unwrap();

        let f = storage.create("clip.raw").unwrap();
        assert_eq!(f.metadata().unwrap().len(), 0);
    }

    #[test]
    fn disk_remove_deletes_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut storage = DiskStorage::new(dir.path()).expect("storage");

        drop(storage.create("clip.raw").unwrap());
        assert!(dir.path().join("clip.raw").exists());

        storage.remove("clip.raw").unwrap();
        assert!(!dir.path().join("clip.raw").exists());
    }

    #[test]
    fn disk_remove_missing_errors() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut storage = DiskStorage::new(dir.path()).expect("storage");
        assert!(storage.remove("nope.raw").is_err());
    }

    #[test]
    fn disk_new_creates_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("a/b/recordings");
        let storage = DiskStorage::new(&nested).expect("storage");
        assert!(storage.root().is_dir());
    }

    // ---- MemStorage --------------------------------------------------------

    #[test]
    fn mem_write_seek_read_back() {
        let mut storage = MemStorage::new();
        let mut f = storage.create("clip.raw").unwrap();
        f.write_all(&[1, 2, 3, 4]).unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();

        let mut back = Vec::new();
        f.read_to_end(&mut back).unwrap();
        assert_eq!(back, vec![1, 2, 3, 4]);
    }

    #[test]
    fn mem_clone_shares_contents() {
        let storage = MemStorage::new();
        let mut writer = storage.clone();
        writer.create("x").unwrap().write_all(b"shared").unwrap();
        assert_eq!(storage.contents("x").unwrap(), b"shared");
    }

    #[test]
    fn mem_remove() {
        let mut storage = MemStorage::new();
        drop(storage.create("x").unwrap());
        assert!(storage.exists("x"));
        storage.remove("x").unwrap();
        assert!(!storage.exists("x"));
        assert!(storage.remove("x").is_err());
    }

    #[test]
    fn mem_overwrite_mid_file() {
        let mut storage = MemStorage::new();
        let mut f = storage.create("x").unwrap();
        f.write_all(b"aaaa").unwrap();
        f.seek(SeekFrom::Start(1)).unwrap();
        f.write_all(b"bb").unwrap();
        assert_eq!(storage.contents("x").unwrap(), b"abba");
    }

    #[test]
    fn mem_injected_create_failure_is_one_shot() {
        let mut storage = MemStorage::new();
        storage.fail_create("x");
        assert!(storage.create("x").is_err());
        assert!(storage.create("x").is_ok());
    }

    #[test]
    fn mem_injected_write_failure_is_one_shot() {
        let mut storage = MemStorage::new();
        let mut f = storage.create("x").unwrap();
        storage.fail_writes_to("x");
        assert!(f.write_all(b"data").is_err());
        assert!(f.write_all(b"data").is_ok());
    }

    #[test]
    fn mem_injected_read_failure_is_one_shot() {
        let mut storage = MemStorage::new();
        let mut f = storage.create("x").unwrap();
        f.write_all(b"data").unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();
        storage.fail_reads_from("x");
        let mut buf = [0u8; 4];
        assert!(f.read(&mut buf).is_err());
        assert_eq!(f.read(&mut buf).unwrap(), 4);
    }
}
