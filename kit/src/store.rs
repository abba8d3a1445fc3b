/**
 * JSON COLLECTIONS - flat-file persistence shared by every demo service
 *
 * ROLE:
 * One `JsonCollection<T>` per record type (rooms, bookings, movies...). The
 * collection is loaded once at start-up, kept in memory, and the whole array
 * is rewritten to its file after every successful mutation.
 *
 * LOCKING:
 * - one `parking_lot::Mutex` per collection, every access goes through it
 * - `transact` holds the lock for check + mutate + save, so check-then-insert
 *   sequences are atomic
 * - services that touch two collections always lock them in the same order
 * - a change spanning two collections goes through two `Draft`s and
 *   `commit_both`, so a failed save leaves both collections as they were
 */

use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Errors raised while loading or persisting a collection
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error on {path:?}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A record stored in a collection, identified by a numeric id
pub trait Record: Clone + Serialize + DeserializeOwned + Send + 'static {
    fn id(&self) -> u64;
}

/// Next free id: one past the largest id in use, 1 for an empty collection
pub fn next_id<T: Record>(records: &[T]) -> u64 {
    records.iter().map(Record::id).max().unwrap_or(0) + 1
}

#[derive(Debug)]
pub struct JsonCollection<T> {
    path: PathBuf,
    records: Mutex<Vec<T>>,
}

impl<T: Record> JsonCollection<T> {
    /// Opens the collection stored at `path`, creating an empty `[]` file if needed
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let path = path.into();
        let records = load_from_disk(&path)?;
        info!("[store] opened {:?} ({} records)", path, records.len());
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of every record, in insertion order
    pub fn snapshot(&self) -> Vec<T> {
        self.records.lock().clone()
    }

    pub fn find(&self, id: u64) -> Option<T> {
        self.records.lock().iter().find(|r| r.id() == id).cloned()
    }

    /// Runs `f` over the records under the lock, without persisting anything
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let records = self.records.lock();
        f(records.as_slice())
    }

    /// Runs `f` on a working copy under the lock. The copy replaces the
    /// records only once `f` returned `Ok` and the file was written, so a
    /// rejected or unsaved change leaves both memory and disk untouched.
    pub fn transact<R, E>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut draft = self.draft();
        let out = f(&mut draft.working)?;
        draft.commit()?;
        Ok(out)
    }

    /// Locks the collection and hands out a working copy. Nothing changes
    /// until the draft is committed; dropping it discards the edits.
    pub fn draft(&self) -> Draft<'_, T> {
        let guard = self.records.lock();
        let working = guard.clone();
        Draft {
            path: &self.path,
            guard,
            working,
        }
    }

    /// Writes the current records to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        let records = self.records.lock();
        save_to_disk(&self.path, records.as_slice())
    }
}

/// Working copy of a locked collection, see [`JsonCollection::draft`]
pub struct Draft<'a, T> {
    path: &'a Path,
    guard: MutexGuard<'a, Vec<T>>,
    working: Vec<T>,
}

impl<T: Record> Draft<'_, T> {
    /// Saves the working copy, then makes it the current records
    pub fn commit(mut self) -> Result<(), StoreError> {
        save_to_disk(self.path, self.working.as_slice())?;
        debug!("[store] saved {:?} ({} records)", self.path, self.working.len());
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

impl<T> Deref for Draft<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.working
    }
}

impl<T> DerefMut for Draft<'_, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.working
    }
}

/// Commits two drafts as one change. If the second file cannot be written
/// the first one is restored, and neither collection changes in memory.
pub fn commit_both<A: Record, B: Record>(mut first: Draft<'_, A>, mut second: Draft<'_, B>) -> Result<(), StoreError> {
    save_to_disk(first.path, first.working.as_slice())?;
    if let Err(e) = save_to_disk(second.path, second.working.as_slice()) {
        if let Err(restore) = save_to_disk(first.path, first.guard.as_slice()) {
            error!("[store] could not restore {:?}: {restore}", first.path);
        }
        return Err(e);
    }
    debug!("[store] saved {:?} and {:?}", first.path, second.path);
    *first.guard = std::mem::take(&mut first.working);
    *second.guard = std::mem::take(&mut second.working);
    Ok(())
}

fn load_from_disk<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, "[]").map_err(io_err)?;
        info!("[store] created empty {:?}", path);
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(io_err)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|source| StoreError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

fn save_to_disk<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u64,
        label: String,
    }

    impl Record for Item {
        fn id(&self) -> u64 {
            self.id
        }
    }

    #[derive(Debug)]
    enum TestError {
        Rejected,
        Store(StoreError),
    }

    impl From<StoreError> for TestError {
        fn from(e: StoreError) -> Self {
            TestError::Store(e)
        }
    }

    fn item(id: u64, label: &str) -> Item {
        Item { id, label: label.to_string() }
    }

    #[test]
    fn test_open_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("items.json");

        let items: JsonCollection<Item> = JsonCollection::open(&path).unwrap();

        assert!(items.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_transact_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        let items: JsonCollection<Item> = JsonCollection::open(&path).unwrap();
        items
            .transact(|records| {
                let id = next_id(records);
                records.push(item(id, "first"));
                Ok::<_, StoreError>(())
            })
            .unwrap();

        let reopened: JsonCollection<Item> = JsonCollection::open(&path).unwrap();
        assert_eq!(reopened.snapshot(), vec![item(1, "first")]);
    }

    #[test]
    fn test_failed_transaction_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        let items: JsonCollection<Item> = JsonCollection::open(&path).unwrap();
        let result: Result<(), TestError> = items.transact(|records| {
            records.push(item(1, "ghost"));
            Err(TestError::Rejected)
        });

        assert!(matches!(result, Err(TestError::Rejected)));
        assert!(items.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    fn open_pair(dir: &Path) -> (JsonCollection<Item>, JsonCollection<Item>) {
        let parents = JsonCollection::open(dir.join("parents.json")).unwrap();
        let children = JsonCollection::open(dir.join("children.json")).unwrap();
        parents
            .transact(|r| {
                r.push(item(1, "parent"));
                Ok::<_, StoreError>(())
            })
            .unwrap();
        children
            .transact(|r| {
                r.push(item(1, "child"));
                Ok::<_, StoreError>(())
            })
            .unwrap();
        (parents, children)
    }

    // a directory in place of the file makes every save fail
    fn break_file(path: &Path) {
        fs::remove_file(path).unwrap();
        fs::create_dir(path).unwrap();
    }

    #[test]
    fn test_commit_both_applies_both() {
        let dir = tempfile::tempdir().unwrap();
        let (parents, children) = open_pair(dir.path());

        let mut p = parents.draft();
        let mut c = children.draft();
        p.clear();
        c[0].label = "orphan".into();
        commit_both(p, c).unwrap();

        assert!(parents.is_empty());
        assert_eq!(children.find(1).unwrap().label, "orphan");
        let on_disk: JsonCollection<Item> = JsonCollection::open(dir.path().join("children.json")).unwrap();
        assert_eq!(on_disk.find(1).unwrap().label, "orphan");
    }

    #[test]
    fn test_commit_both_failing_second_save_restores_first() {
        let dir = tempfile::tempdir().unwrap();
        let (parents, children) = open_pair(dir.path());
        break_file(children.path());

        let mut p = parents.draft();
        let mut c = children.draft();
        p.clear();
        c[0].label = "orphan".into();
        assert!(commit_both(p, c).is_err());

        assert_eq!(parents.snapshot(), vec![item(1, "parent")]);
        assert_eq!(children.snapshot(), vec![item(1, "child")]);
        let on_disk: JsonCollection<Item> = JsonCollection::open(dir.path().join("parents.json")).unwrap();
        assert_eq!(on_disk.snapshot(), vec![item(1, "parent")]);
    }

    #[test]
    fn test_commit_both_failing_first_save_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (parents, children) = open_pair(dir.path());
        break_file(parents.path());

        let mut p = parents.draft();
        let mut c = children.draft();
        p.clear();
        c[0].label = "orphan".into();
        assert!(commit_both(p, c).is_err());

        assert_eq!(parents.len(), 1);
        let on_disk: JsonCollection<Item> = JsonCollection::open(dir.path().join("children.json")).unwrap();
        assert_eq!(on_disk.snapshot(), vec![item(1, "child")]);
    }

    #[test]
    fn test_dropped_draft_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (parents, _children) = open_pair(dir.path());
        {
            let mut p = parents.draft();
            p.clear();
        }
        assert_eq!(parents.len(), 1);
    }

    #[test]
    fn test_next_id_uses_max_plus_one() {
        assert_eq!(next_id::<Item>(&[]), 1);
        assert_eq!(next_id(&[item(3, "a"), item(7, "b"), item(2, "c")]), 8);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<JsonCollection<Item>, _> = JsonCollection::open(&path);
        assert!(matches!(result, Err(StoreError::Serialization { .. })));
    }

    #[test]
    fn test_find_by_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("items.json"),
            r#"[{"id": 4, "label": "four"}, {"id": 9, "label": "nine"}]"#,
        )
        .unwrap();

        let items: JsonCollection<Item> = JsonCollection::open(dir.path().join("items.json")).unwrap();
        assert_eq!(items.find(9), Some(item(9, "nine")));
        assert_eq!(items.find(5), None);
    }
}
