use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{PollError, StorageError};
use crate::model::Poll;

/// How many entries the recent-polls list surfaces.
pub const RECENT_LIMIT: usize = 5;

/// Durable, synchronous persistence of the whole poll collection as one
/// serialized blob under a single fixed location. Implementations stand in
/// for the browser's local storage.
pub trait StorageBackend: Send + Sync {
    /// The stored blob, or `None` if nothing has been written yet.
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&self, blob: &str) -> Result<(), StorageError>;
}

/// In-memory backend. The default for guest/non-persistent contexts and for
/// tests; clones share the same blob.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    blob: Arc<Mutex<Option<String>>>,
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let guard = self.blob.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn write(&self, blob: &str) -> Result<(), StorageError> {
        let mut guard = self.blob.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(blob.to_string());
        Ok(())
    }
}

/// Single-file backend; an absent file reads as "no data yet".
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBackend { path: path.into() }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, blob: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// Handle over the poll collection. Cheap to clone; every clone sees the same
/// backend. Reads never fail from the caller's point of view: an absent,
/// corrupt, or unreadable blob is an empty collection. Write failures are
/// logged and dropped.
#[derive(Clone)]
pub struct PollStore {
    backend: Arc<dyn StorageBackend>,
    // Serializes read-modify-write cycles so `update_with` can enforce its
    // guards atomically.
    write_lock: Arc<Mutex<()>>,
}

impl PollStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        PollStore {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(path)))
    }

    /// Every poll ever created here, most recently created first.
    pub fn get_all(&self) -> Vec<Poll> {
        let blob = match self.backend.read() {
            Ok(blob) => blob,
            Err(e) => {
                error!("poll storage read failed: {e}");
                return Vec::new();
            }
        };
        match blob {
            None => Vec::new(),
            Some(data) => match serde_json::from_str(&data) {
                Ok(polls) => polls,
                Err(e) => {
                    error!("stored poll data is corrupt, treating as empty: {e}");
                    Vec::new()
                }
            },
        }
    }

    /// Overwrites the whole collection.
    pub fn save(&self, polls: &[Poll]) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.persist(polls);
    }

    /// Prepends, so the newest poll sorts first.
    pub fn add(&self, poll: Poll) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut polls = self.get_all();
        polls.insert(0, poll);
        self.persist(&polls);
    }

    pub fn get_by_id(&self, id: &str) -> Option<Poll> {
        self.get_all().into_iter().find(|poll| poll.id == id)
    }

    /// Replaces the stored poll with the same id; no-op when absent.
    pub fn update(&self, updated: &Poll) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut polls = self.get_all();
        match polls.iter_mut().find(|poll| poll.id == updated.id) {
            Some(slot) => {
                *slot = updated.clone();
                self.persist(&polls);
            }
            None => warn!("update for unknown poll {} dropped", updated.id),
        }
    }

    pub fn get_recent(&self, limit: usize) -> Vec<Poll> {
        let mut polls = self.get_all();
        polls.truncate(limit);
        polls
    }

    /// Applies `mutate` to the poll with the given id and persists the result,
    /// all under the store's write lock. An `Err` from the closure aborts
    /// without persisting anything, which is what lets vote guards run
    /// atomically with their commit.
    pub fn update_with<F>(&self, id: &str, mutate: F) -> Result<Poll, PollError>
    where
        F: FnOnce(&mut Poll) -> Result<(), PollError>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut polls = self.get_all();
        let poll = polls
            .iter_mut()
            .find(|poll| poll.id == id)
            .ok_or(PollError::PollNotFound)?;
        mutate(poll)?;
        let updated = poll.clone();
        self.persist(&polls);
        Ok(updated)
    }

    fn persist(&self, polls: &[Poll]) {
        match serde_json::to_string(polls) {
            Ok(blob) => {
                if let Err(e) = self.backend.write(&blob) {
                    error!("failed to save polls, write dropped: {e}");
                }
            }
            Err(e) => error!("failed to serialize polls, write dropped: {e}"),
        }
    }
}
