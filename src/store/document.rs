//! JSON Document Store
//! Mission: Load and persist one JSON collection per file, crash-consistently
//!
//! The file is the only source of truth. Every save rewrites the whole
//! collection through a temp file + rename, so a crash leaves either the old
//! or the new content on disk, never a torn write.

use super::StoreError;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::PrettyFormatter;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const INDENT: &[u8] = b"    ";

lazy_static! {
    // One writer lock per backing file, shared by every store handle in the process
    static ref FILE_LOCKS: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> = Mutex::new(HashMap::new());
}

/// Absolute, lexically normalized form of `path`, so every spelling of the
/// same file maps to one lock.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut key = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                key.pop();
            }
            other => key.push(other),
        }
    }
    key
}

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    FILE_LOCKS
        .lock()
        .entry(lock_key(path))
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Typed handle on a single JSON collection file.
///
/// `T::default()` is the empty collection returned when the file does not exist.
pub struct DocumentStore<T> {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    _collection: PhantomData<fn() -> T>,
}

impl<T> Clone for DocumentStore<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            lock: self.lock.clone(),
            _collection: PhantomData,
        }
    }
}

impl<T> DocumentStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = lock_for(&path);
        Self {
            path,
            lock,
            _collection: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection. A missing file is the empty collection;
    /// a present but malformed file is `CorruptStore`.
    pub fn load(&self) -> Result<T, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file absent, using empty collection");
                return Ok(T::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the file with `collection`.
    pub fn save(&self, collection: &T) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        self.write_atomic(collection)
    }

    /// Load, mutate and save while holding the file's writer lock.
    ///
    /// If `mutate` fails nothing is written and its error is returned as is.
    pub fn update<R, F>(&self, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut T) -> Result<R, StoreError>,
    {
        let _guard = self.lock.lock();
        let mut collection = self.load()?;
        let out = mutate(&mut collection)?;
        self.write_atomic(&collection)?;
        Ok(out)
    }

    fn encode(&self, collection: &T) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        collection
            .serialize(&mut ser)
            .map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
        Ok(buf)
    }

    fn write_atomic(&self, collection: &T) -> Result<(), StoreError> {
        let bytes = self.encode(collection)?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let temp_path = self.temp_path();
        let written = (|| -> std::io::Result<()> {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            writer.write_all(&bytes)?;
            writer.flush()?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            drop(file);
            fs::rename(&temp_path, &self.path)
        })();

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), "Failed to remove temp file: {}", cleanup);
                }
            }
            return Err(io_err(e));
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Collection saved");
        Ok(())
    }

    // Sibling of the target so the rename never crosses filesystems
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "collection".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
    }
}
