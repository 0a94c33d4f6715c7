//! Card storage abstraction.
//!
//! Cards are whole-file blobs addressed by name:
//! - `DirStore`: one file per card inside an access-restricted directory
//! - `InMemoryStore`: for testing
//!
//! # Security Notes
//!
//! - `DirStore::open` creates its directory with mode `0700` and card files
//!   with mode `0600` on unix
//! - `DirStore::existing` touches nothing; recovery opens the store with it
//! - Card names never contain path separators or `..`; whatever the label,
//!   a card stays inside its store

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Error types for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Card not found: {0}")]
    NotFound(String),
    #[error("Invalid card name: {0:?}")]
    InvalidName(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Abstract card storage
pub trait CardStore {
    /// Read a whole card
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Create or replace a card
    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Whether a card exists
    fn exists(&self, name: &str) -> bool;
}

/// Reject names that could escape the store
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\', '\0']);
    if bad {
        Err(StoreError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

// ============================================================
// IN-MEMORY STORE
// ============================================================

/// In-memory store for testing
/// Uses Rc<RefCell<...>> so clones share the same underlying storage
#[derive(Default, Clone)]
pub struct InMemoryStore {
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    /// Write counters per card (for testing overwrite behavior)
    write_counts: Rc<RefCell<HashMap<String, usize>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of card contents (for testing)
    #[must_use]
    pub fn get_file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(name).cloned()
    }

    /// Place raw contents under a name (for testing)
    pub fn insert(&self, name: &str, data: &[u8]) {
        self.files.borrow_mut().insert(name.to_string(), data.to_vec());
    }

    /// Get write count for a card (for testing)
    #[must_use]
    pub fn write_count(&self, name: &str) -> usize {
        *self.write_counts.borrow().get(name).unwrap_or(&0)
    }

    /// Names of all stored cards, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl CardStore for InMemoryStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_name(name)?;
        self.files
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        validate_name(name)?;
        self.files.borrow_mut().insert(name.to_string(), data.to_vec());
        *self.write_counts.borrow_mut().entry(name.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.files.borrow().contains_key(name)
    }
}

// ============================================================
// DIRECTORY STORE
// ============================================================

/// One file per card in a dedicated directory
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open the store, creating the directory if it does not exist
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        create_private_dir(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Open an existing store without creating or changing anything
    pub fn existing(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(StoreError::Io {
                path: root,
                source: io::Error::other("not a directory"),
            }),
            Err(source) => Err(StoreError::Io { path: root, source }),
        }
    }

    /// Path of the card file for `name`
    pub fn path_of(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl CardStore for DirStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_of(name)?;
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io { path, source },
        })
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.path_of(name)?;
        write_private_file(&path, data).map_err(|source| StoreError::Io { path, source })
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_ok_and(|path| path.is_file())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

    if !dir.is_dir() {
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)?;
    }
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_read_write() {
        let mut store = InMemoryStore::new();
        store.write("mail.pad", b"abc").unwrap();
        assert_eq!(store.read("mail.pad").unwrap(), b"abc");
        assert!(store.exists("mail.pad"));
        assert_eq!(store.write_count("mail.pad"), 1);
    }

    #[test]
    fn test_in_memory_clones_share_storage() {
        let mut store = InMemoryStore::new();
        let view = store.clone();
        store.write("a.pad", b"1").unwrap();
        assert_eq!(view.get_file("a.pad"), Some(b"1".to_vec()));
    }

    #[test]
    fn test_in_memory_missing_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(store.read("nope.pad"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let mut store = InMemoryStore::new();
        store.write("a.pad", b"first").unwrap();
        store.write("a.pad", b"2nd").unwrap();
        assert_eq!(store.read("a.pad").unwrap(), b"2nd");
        assert_eq!(store.write_count("a.pad"), 2);
    }

    #[test]
    fn test_traversal_names_rejected() {
        for name in ["", ".", "../x.pad", "a/b.pad", "a\\b.pad", "..", "nul\0.pad"] {
            assert!(
                matches!(validate_name(name), Err(StoreError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(validate_name("bank account.pad").is_ok());
    }

    #[test]
    fn test_dir_store_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let mut store = DirStore::open(temp.path().join("files")).unwrap();
        store.write("mail.pad", b"filler+password").unwrap();

        assert!(store.exists("mail.pad"));
        assert_eq!(store.read("mail.pad").unwrap(), b"filler+password");
        assert!(matches!(store.read("other.pad"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_dir_store_rejects_escape() {
        let temp = tempfile::tempdir().unwrap();
        let mut store = DirStore::open(temp.path()).unwrap();
        assert!(matches!(
            store.write("../escape.pad", b"x"),
            Err(StoreError::InvalidName(_))
        ));
        assert!(!temp.path().parent().unwrap().join("escape.pad").exists());
    }

    #[test]
    fn test_existing_store_requires_root() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("absent");

        assert!(matches!(DirStore::existing(&missing), Err(StoreError::Io { .. })));
        assert!(!missing.exists());
    }

    #[test]
    fn test_existing_store_rejects_file_root() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(DirStore::existing(&file), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_existing_store_reads_cards() {
        let temp = tempfile::tempdir().unwrap();
        DirStore::open(temp.path()).unwrap().write("mail.pad", b"abc").unwrap();

        let store = DirStore::existing(temp.path()).unwrap();
        assert_eq!(store.read("mail.pad").unwrap(), b"abc");
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_store_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("files");
        fs::create_dir(&root).unwrap();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(root.join("mail.pad"), b"abc").unwrap();

        let store = DirStore::existing(&root).unwrap();
        assert_eq!(store.read("mail.pad").unwrap(), b"abc");
        let mode = fs::metadata(&root).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_dir_store_permissions_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("files");
        let mut store = DirStore::open(&root).unwrap();
        store.write("mail.pad", b"x").unwrap();

        let dir_mode = fs::metadata(&root).unwrap().permissions().mode() & 0o777;
        let file_mode = fs::metadata(root.join("mail.pad"))
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
        assert_eq!(file_mode, 0o600);
    }
}
