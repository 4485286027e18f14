//! File-backed address book store.
//!
//! The whole book is rewritten on every save: the new bytes go to a temporary
//! file next to the target, which is then renamed over it. A crash at any
//! point leaves either the old file or the new one, never a mix. Temporary
//! files orphaned by a crash are removed by the next load.
//!
//! Only one writer is expected at a time; nothing here locks the file.

use crate::codec::{decode, encode};
use crate::error::{Error, Result};
use crate::types::{AddressBook, Person};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Store file used when no path is given.
pub const DEFAULT_PATH: &str = "addressBook.data";

const TEMP_SUFFIX: &str = ".tmp";

/// Length of the random part of a temporary file name.
const TEMP_RAND_LEN: usize = 6;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path of the store file.
    pub path: PathBuf,

    /// Whether to fsync the new file and its directory when saving.
    pub sync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            sync: true,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// Load the book stored at `path`.
///
/// A missing file is an empty book. Bytes that do not decode are reported as
/// [`Error::CorruptStore`]; the file is left as it is.
pub fn load(path: impl AsRef<Path>) -> Result<AddressBook> {
    let path = path.as_ref();
    remove_stale_temp_files(path)?;

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "file not found, creating a new one");
            return Ok(AddressBook::new());
        }
        Err(e) => return Err(e.into()),
    };

    let book: AddressBook = decode(&bytes).map_err(|e| match e {
        Error::Io(e) => Error::Io(e),
        other => Error::CorruptStore {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        people = book.len(),
        "loaded address book"
    );
    Ok(book)
}

/// Atomically replace the file at `path` with the encoding of `book`.
pub fn save(path: impl AsRef<Path>, book: &AddressBook) -> Result<()> {
    stage(path.as_ref(), book, true)?.commit()
}

/// A fully written temporary file waiting to be renamed into place.
///
/// Dropping it without calling [`StagedSave::commit`] deletes the temporary
/// file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedSave {
    temp: NamedTempFile,
    target: PathBuf,
    sync: bool,
    bytes: usize,
}

impl StagedSave {
    /// Path of the temporary file.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the temporary file over the target.
    ///
    /// Once the rename has happened the save counts as done; a failure to
    /// sync the directory afterwards is only logged.
    pub fn commit(self) -> Result<()> {
        let StagedSave {
            temp,
            target,
            sync,
            bytes,
        } = self;

        temp.persist(&target).map_err(|e| Error::Io(e.error))?;
        if sync {
            sync_parent(&target);
        }

        tracing::debug!(path = %target.display(), bytes, "saved address book");
        Ok(())
    }
}

fn stage(target: &Path, book: &AddressBook, sync: bool) -> Result<StagedSave> {
    // encode first: a schema error must not leave anything on disk
    let bytes = encode(book)?;

    let dir = parent_dir(target);
    let mut temp = tempfile::Builder::new()
        .prefix(&temp_prefix(target)?)
        .suffix(TEMP_SUFFIX)
        .rand_bytes(TEMP_RAND_LEN)
        .tempfile_in(&dir)?;

    temp.write_all(&bytes)?;
    temp.flush()?;
    if sync {
        temp.as_file().sync_all()?;
    }

    Ok(StagedSave {
        temp,
        target: target.to_path_buf(),
        sync,
        bytes: bytes.len(),
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| {
            Error::InvalidOperation(format!("invalid store path: {}", path.display()))
        })
}

/// Temporary files are named `.<file name>.<random>.tmp`.
fn temp_prefix(target: &Path) -> Result<String> {
    Ok(format!(".{}.", file_name(target)?))
}

/// Whether `name` is one of our temporary files, given the target's prefix.
///
/// The random part has a fixed length and no dots, so `.book.data.XXXXXX.tmp`
/// (a temp file of `book.data`) never matches the prefix of `book`.
fn is_temp_file(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(TEMP_SUFFIX))
        .is_some_and(|random| {
            random.len() == TEMP_RAND_LEN && random.bytes().all(|b| b.is_ascii_alphanumeric())
        })
}

fn remove_stale_temp_files(target: &Path) -> Result<()> {
    let prefix = temp_prefix(target)?;
    let entries = match fs::read_dir(parent_dir(target)) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if is_temp_file(name, &prefix) {
            tracing::warn!(file = name, "removing temporary file left by an interrupted save");
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn sync_parent(target: &Path) {
    let dir = parent_dir(target);
    if let Err(e) = sync_dir(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "failed to sync directory after save");
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Lifecycle of a [`RecordStore`] within one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreState {
    Unloaded,
    Loaded,
    Mutated,
    Persisted,
}

/// Owns the in-memory book between load and save.
///
/// States advance strictly `Unloaded → Loaded → Mutated → Persisted`; calling
/// an operation out of order fails with [`Error::InvalidOperation`] and leaves
/// the file on disk alone.
#[derive(Debug)]
pub struct RecordStore {
    config: StoreConfig,
    book: AddressBook,
    state: StoreState,
}

impl RecordStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            book: AddressBook::new(),
            state: StoreState::Unloaded,
        }
    }

    /// Create a store and load its file.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let mut store = Self::new(config);
        store.load()?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    pub fn load(&mut self) -> Result<&AddressBook> {
        self.expect_state("load", &[StoreState::Unloaded])?;
        self.book = load(&self.config.path)?;
        self.state = StoreState::Loaded;
        Ok(&self.book)
    }

    pub fn append(&mut self, person: Person) -> Result<&AddressBook> {
        self.expect_state("append", &[StoreState::Loaded, StoreState::Mutated])?;
        self.book = self.book.append(person);
        self.state = StoreState::Mutated;
        Ok(&self.book)
    }

    /// Write the current book to a temporary file without committing it.
    pub fn stage(&self) -> Result<StagedSave> {
        self.expect_state("save", &[StoreState::Loaded, StoreState::Mutated])?;
        stage(&self.config.path, &self.book, self.config.sync)
    }

    pub fn save(&mut self) -> Result<()> {
        self.stage()?.commit()?;
        self.state = StoreState::Persisted;
        Ok(())
    }

    fn expect_state(&self, op: &str, allowed: &[StoreState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidOperation(format!(
                "cannot {op} a store in state {:?}",
                self.state
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhoneNumber;
    use tempfile::TempDir;

    fn person(id: i32, name: &str) -> Person {
        Person::builder().id(id).name(name).build().unwrap()
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(TEMP_SUFFIX))
            .collect()
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let book = load(dir.path().join("nonexistent")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.data");

        let book = AddressBook::new()
            .append(person(1, "Ada"))
            .append(
                Person::builder()
                    .id(2)
                    .name("Bob")
                    .phone(PhoneNumber::new("555"))
                    .build()
                    .unwrap(),
            );
        save(&path, &book).unwrap();

        assert_eq!(load(&path).unwrap(), book);
        assert!(temp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.data");
        fs::write(&path, [0x0A, 50, 1, 2]).unwrap();

        let result = load(&path);
        assert!(matches!(result, Err(Error::CorruptStore { .. })));
        // not truncated
        assert_eq!(fs::read(&path).unwrap(), [0x0A, 50, 1, 2]);
    }

    #[test]
    fn test_dropped_stage_removes_temp() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(StoreConfig::new(dir.path().join("book.data"))).unwrap();
        store.append(person(1, "Ada")).unwrap();

        let staged = store.stage().unwrap();
        assert!(staged.temp_path().exists());
        drop(staged);

        assert!(temp_files(dir.path()).is_empty());
        assert!(!dir.path().join("book.data").exists());
    }

    #[test]
    fn test_state_transitions() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::new(StoreConfig::new(dir.path().join("book.data")));
        assert_eq!(store.state(), StoreState::Unloaded);

        assert!(matches!(
            store.append(person(1, "Ada")),
            Err(Error::InvalidOperation(_))
        ));

        store.load().unwrap();
        assert_eq!(store.state(), StoreState::Loaded);

        store.append(person(1, "Ada")).unwrap();
        store.append(person(2, "Bob")).unwrap();
        assert_eq!(store.state(), StoreState::Mutated);

        store.save().unwrap();
        assert_eq!(store.state(), StoreState::Persisted);

        assert!(matches!(store.load(), Err(Error::InvalidOperation(_))));
        assert!(matches!(
            store.append(person(3, "Cy")),
            Err(Error::InvalidOperation(_))
        ));
        assert!(matches!(store.save(), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_relative_parent() {
        assert_eq!(parent_dir(Path::new("book.data")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/book.data")), PathBuf::from("a"));
        assert_eq!(temp_prefix(Path::new("a/book.data")).unwrap(), ".book.data.");
    }

    #[test]
    fn test_load_leaves_sibling_store_temp_files() {
        let dir = TempDir::new().unwrap();
        let sibling = dir.path().join("book.data");
        let mut staged = RecordStore::open(StoreConfig::new(&sibling)).unwrap();
        staged.append(person(1, "Ada")).unwrap();
        let in_flight = staged.stage().unwrap();

        let ours = dir.path().join(".book.AbC123.tmp");
        let other = dir.path().join(".book.data.AbC123.tmp");
        fs::write(&ours, b"partial").unwrap();
        fs::write(&other, b"partial").unwrap();

        assert!(load(dir.path().join("book")).unwrap().is_empty());
        assert!(!ours.exists());
        assert!(other.exists());
        assert!(in_flight.temp_path().exists());

        in_flight.commit().unwrap();
        assert_eq!(load(&sibling).unwrap().len(), 1);
    }

    #[test]
    fn test_temp_file_names() {
        let prefix = ".book.";
        assert!(is_temp_file(".book.x1Y2z3.tmp", prefix));
        assert!(!is_temp_file(".book.data.x1Y2z3.tmp", prefix));
        assert!(!is_temp_file(".book.x1Y2z.tmp", prefix));
        assert!(!is_temp_file(".book.x1Y2z3.tmp.bak", prefix));
        assert!(!is_temp_file("book.x1Y2z3.tmp", prefix));
    }

    #[test]
    fn test_directory_sync_failure_after_rename_is_logged() {
        let dir = TempDir::new().unwrap();
        // the parent is gone, so the directory sync cannot succeed
        sync_parent(&dir.path().join("missing").join("book.data"));
    }
}
