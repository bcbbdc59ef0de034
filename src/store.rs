use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;
use tracing::{debug, warn};

/// Host key-value facility: string keys, string values, synchronous.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Encode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
            StoreError::Encode(e) => write!(f, "store encode error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

// ── In-memory backend ────────────────────────────────────────────

pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ── File backend ─────────────────────────────────────────────────

/// JSON object file holding every key. The whole file is rewritten on each
/// mutation: written to `<path>.tmp`, fsynced, then renamed over `path`.
/// Memory only changes once the file write has succeeded.
pub struct FileStore {
    entries: DashMap<String, String>,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or start) the store at `path`. A missing file is an empty store;
    /// an unreadable JSON body is logged and treated as empty.
    pub fn open(path: &Path) -> io::Result<Self> {
        let entries = DashMap::new();
        match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(map) => {
                    for (k, v) in map {
                        entries.insert(k, v);
                    }
                }
                Err(e) => warn!("ignoring corrupt store file {}: {e}", path.display()),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        debug!("opened store {} with {} keys", path.display(), entries.len());
        Ok(Self {
            entries,
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Write the current contents with `change` applied, then apply it in
    /// memory. On error the in-memory contents are untouched.
    fn commit(&self, key: &str, change: Option<&str>) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Io("store writer poisoned".into()))?;
        let mut snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        match change {
            Some(value) => snapshot.insert(key.to_string(), value.to_string()),
            None => snapshot.remove(key),
        };
        self.persist(&snapshot)?;
        match change {
            Some(value) => {
                self.entries.insert(key.to_string(), value.to_string());
            }
            None => {
                self.entries.remove(key);
            }
        }
        Ok(())
    }

    fn persist(&self, snapshot: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Encode(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&body)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.commit(key, Some(value))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        self.commit(key, None)
    }
}
