use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fatechain_core::OperationId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use super::{ChainStore, StoreError};
use crate::record::ChainRecord;

const CHAIN_EXTENSION: &str = ".json";
const CHAIN_PREFIX: &str = "op-";
const NEXT_ID_FILE: &str = "next-id";

/// Chain store keeping one JSON file per chain in a directory.
///
/// Records are written to a hidden temporary file and renamed into place, so
/// a crash mid-write leaves the previous record intact. A new chain file only
/// appears once its first record is complete.
///
/// The highest id handed out is kept in a `next-id` file, so removing the
/// newest chain never frees its id for reuse.
#[derive(Debug)]
pub struct FileChainStore<S> {
    dir: PathBuf,
    allocate: Mutex<()>,
    _marker: PhantomData<fn() -> S>,
}

impl<S> FileChainStore<S> {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            allocate: Mutex::new(()),
            _marker: PhantomData,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn chain_path(&self, id: OperationId) -> PathBuf {
        self.dir.join(format!("{id}{CHAIN_EXTENSION}"))
    }

    fn temp_path(&self, id: OperationId) -> PathBuf {
        self.dir.join(format!(".{id}{CHAIN_EXTENSION}.tmp"))
    }

    fn next_id_path(&self) -> PathBuf {
        self.dir.join(NEXT_ID_FILE)
    }

    fn read_next_id(&self) -> Result<u64, StoreError> {
        let path = self.next_id_path();
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(content.trim())
                .map_err(|source| StoreError::Parse { path, source }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(1),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn write_next_id(&self, next: u64) -> Result<(), StoreError> {
        let path = self.next_id_path();
        let temp = self.dir.join(format!(".{NEXT_ID_FILE}.tmp"));
        fs::write(&temp, next.to_string()).map_err(|source| StoreError::Write {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, &path).map_err(|source| StoreError::Write { path, source })
    }

    fn list_ids(&self) -> Result<Vec<OperationId>, StoreError> {
        let list_err = |source: std::io::Error| StoreError::List {
            path: self.dir.clone(),
            source,
        };

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(CHAIN_EXTENSION) else {
                continue;
            };
            if !stem.starts_with(CHAIN_PREFIX) {
                continue;
            }
            let Ok(id) = stem.parse() else {
                continue;
            };
            // Left by a crash in a create that predates the linked claim.
            if entry.metadata().map_err(list_err)?.len() == 0 {
                warn!(operation = %id, "skipping empty chain file");
                continue;
            }
            ids.push(id);
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl<S> ChainStore<S> for FileChainStore<S>
where
    S: Serialize + DeserializeOwned,
{
    fn create(&self, first: S) -> Result<OperationId, StoreError> {
        let _guard = self.allocate.lock().map_err(|_| StoreError::Poisoned)?;

        let listed = self
            .list_ids()?
            .last()
            .map_or(1, |id| id.as_u64().saturating_add(1));
        let mut next = self.read_next_id()?.max(listed);

        let mut record = ChainRecord::new(OperationId::new(next), first);
        loop {
            let content =
                serde_json::to_vec_pretty(&record).map_err(|source| StoreError::Serialize {
                    operation: record.id,
                    source,
                })?;
            let temp = self.temp_path(record.id);
            fs::write(&temp, content).map_err(|source| StoreError::Write {
                path: temp.clone(),
                source,
            })?;
            self.write_next_id(next.saturating_add(1))?;

            // Linking fails if the name exists, so a complete record claims the id.
            let path = self.chain_path(record.id);
            let claimed = fs::hard_link(&temp, &path);
            if let Err(e) = fs::remove_file(&temp) {
                warn!(path = %temp.display(), error = %e, "failed to remove temporary chain file");
            }
            match claimed {
                Ok(()) => break,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    next = next.saturating_add(1);
                    record.id = OperationId::new(next);
                }
                Err(source) => return Err(StoreError::Write { path, source }),
            }
        }

        trace!(operation = %record.id, "created chain");
        Ok(record.id)
    }

    fn load(&self, id: OperationId) -> Result<ChainRecord<S>, StoreError> {
        let path = self.chain_path(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(id)),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Parse { path, source })
    }

    fn save(&self, record: &ChainRecord<S>) -> Result<(), StoreError> {
        let content =
            serde_json::to_vec_pretty(record).map_err(|source| StoreError::Serialize {
                operation: record.id,
                source,
            })?;

        let temp = self.temp_path(record.id);
        fs::write(&temp, content).map_err(|source| StoreError::Write {
            path: temp.clone(),
            source,
        })?;

        let path = self.chain_path(record.id);
        fs::rename(&temp, &path).map_err(|source| StoreError::Write { path, source })?;

        trace!(operation = %record.id, status = ?record.status, depth = record.stack.len(), "saved chain");
        Ok(())
    }

    fn remove(&self, id: OperationId) -> Result<(), StoreError> {
        let path = self.chain_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write { path, source }),
        }
    }

    fn list(&self) -> Result<Vec<OperationId>, StoreError> {
        self.list_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChainStatus;

    fn setup() -> (tempfile::TempDir, FileChainStore<String>) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = FileChainStore::open(dir.path().join("chains")).expect("open store");
        (dir, store)
    }

    #[test]
    fn create_writes_chain_file() -> anyhow::Result<()> {
        let (_dir, store) = setup();

        let id = store.create("first".to_string())?;

        assert!(store.dir().join(format!("{id}.json")).exists());
        let record = store.load(id)?;
        assert_eq!(record.stack, vec!["first".to_string()]);
        assert_eq!(record.status, ChainStatus::New);
        Ok(())
    }

    #[test]
    fn ids_continue_after_existing_files() -> anyhow::Result<()> {
        let (dir, store) = setup();
        let first = store.create("a".to_string())?;

        let reopened: FileChainStore<String> = FileChainStore::open(dir.path().join("chains"))?;
        let second = reopened.create("b".to_string())?;

        assert!(second > first);
        assert_eq!(reopened.list()?, vec![first, second]);
        Ok(())
    }

    #[test]
    fn removed_newest_id_is_not_reused() -> anyhow::Result<()> {
        let (dir, store) = setup();
        let first = store.create("a".to_string())?;
        store.remove(first)?;

        let second = store.create("b".to_string())?;
        assert!(second > first);

        store.remove(second)?;
        let reopened: FileChainStore<String> = FileChainStore::open(dir.path().join("chains"))?;
        let third = reopened.create("c".to_string())?;

        assert!(third > second);
        assert_eq!(reopened.list()?, vec![third]);
        Ok(())
    }

    #[test]
    fn ids_skip_files_created_without_the_counter() -> anyhow::Result<()> {
        let (_dir, store) = setup();
        let first = store.create("a".to_string())?;
        fs::remove_file(store.dir().join(NEXT_ID_FILE))?;

        let second = store.create("b".to_string())?;

        assert!(second > first);
        Ok(())
    }

    #[test]
    fn empty_chain_file_is_skipped() -> anyhow::Result<()> {
        let (_dir, store) = setup();
        let id = store.create("a".to_string())?;
        let empty = OperationId::new(id.as_u64() + 1);
        fs::write(store.dir().join(format!("{empty}.json")), "")?;

        assert_eq!(store.list()?, vec![id]);

        let next = store.create("b".to_string())?;
        assert!(next > empty);
        assert_eq!(store.load(next)?.stack, vec!["b".to_string()]);
        Ok(())
    }

    #[test]
    fn save_leaves_no_temp_file_behind() -> anyhow::Result<()> {
        let (_dir, store) = setup();
        let id = store.create("a".to_string())?;
        let mut record = store.load(id)?;
        record.stack.push("b".to_string());

        store.save(&record)?;

        let names: Vec<_> = fs::read_dir(store.dir())?
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with('.'))
            .collect();
        assert!(names.is_empty(), "leftover files: {names:?}");
        assert_eq!(store.list()?, vec![id]);
        Ok(())
    }

    #[test]
    fn list_ignores_unrelated_files() -> anyhow::Result<()> {
        let (_dir, store) = setup();
        let id = store.create("a".to_string())?;
        fs::write(store.dir().join("notes.json"), "{}")?;
        fs::write(store.dir().join("README"), "hi")?;

        assert_eq!(store.list()?, vec![id]);
        Ok(())
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_dir, store) = setup();

        let err = store.load(OperationId::new(5)).expect_err("should fail");

        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn load_corrupt_file_is_parse_error() -> anyhow::Result<()> {
        let (_dir, store) = setup();
        let id = store.create("a".to_string())?;
        fs::write(store.dir().join(format!("{id}.json")), "not json")?;

        let err = store.load(id).expect_err("should fail");

        assert!(matches!(err, StoreError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn remove_deletes_file_and_tolerates_missing() -> anyhow::Result<()> {
        let (_dir, store) = setup();
        let id = store.create("a".to_string())?;

        store.remove(id)?;
        store.remove(id)?;

        assert!(store.list()?.is_empty());
        Ok(())
    }
}
