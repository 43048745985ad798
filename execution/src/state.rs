use commonware_codec::{Encode, ReadRangeExt};
use parlor_types::store::{Entry, Key, Value};
use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on records accepted when decoding a journal.
const MAX_ENTRIES: usize = 1024;

pub trait Store {
    fn get(&self, key: &Key) -> Option<Value>;
    fn insert(&mut self, key: Key, value: Value);
    fn delete(&mut self, key: &Key);
}

#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl Store for Memory {
    fn get(&self, key: &Key) -> Option<Value> {
        self.state.get(key).cloned()
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.state.insert(key, value);
    }

    fn delete(&mut self, key: &Key) {
        self.state.remove(key);
    }
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to read journal: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode journal: {0}")]
    Codec(#[from] commonware_codec::Error),
    #[error("journal has {0} trailing bytes")]
    TrailingBytes(usize),
}

/// A file-backed store.
///
/// The whole record set is re-encoded on every write and swapped in with a rename, so
/// a crash mid-write leaves the previous snapshot intact. Write failures are logged
/// and the in-memory view stays authoritative for the rest of the process.
pub struct Journal {
    path: PathBuf,
    state: BTreeMap<Key, Value>,
}

impl Journal {
    /// Open the journal at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        let state = match fs::read(&path) {
            Ok(bytes) => decode(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), records = state.len(), "opened journal");
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> io::Result<()> {
        let entries: Vec<Entry> = self
            .state
            .iter()
            .map(|(key, value)| Entry {
                key: *key,
                value: *value,
            })
            .collect();
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, entries.encode())?;
        fs::rename(&tmp, &self.path)
    }
}

fn decode(bytes: &[u8]) -> Result<BTreeMap<Key, Value>, JournalError> {
    let mut reader = bytes;
    let entries = Vec::<Entry>::read_range(&mut reader, 0..=MAX_ENTRIES)?;
    if !reader.is_empty() {
        return Err(JournalError::TrailingBytes(reader.len()));
    }
    Ok(entries
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect())
}

impl Store for Journal {
    fn get(&self, key: &Key) -> Option<Value> {
        self.state.get(key).cloned()
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.state.insert(key, value);
        if let Err(e) = self.flush() {
            warn!(key = key.name(), error = %e, "failed to persist journal");
        }
    }

    fn delete(&mut self, key: &Key) {
        if self.state.remove(key).is_some() {
            if let Err(e) = self.flush() {
                warn!(key = key.name(), error = %e, "failed to persist journal");
            }
        }
    }
}
