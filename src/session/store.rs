use crate::auth::types::Session;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable, synchronous storage for the single serialized session record.
///
/// Implementations only move raw strings; parsing and the fail-closed policy
/// for corrupt records live in the guard functions.
pub trait SessionStore {
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn read_raw(&self) -> Result<Option<String>, StoreError>;

    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn write_raw(&self, value: &str) -> Result<(), StoreError>;

    /// Removes the record. Erasing an empty store is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be modified.
    fn erase(&self) -> Result<(), StoreError>;

    /// # Errors
    /// Returns an error if the session cannot be encoded or written.
    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(session)?;
        self.write_raw(&encoded)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        (**self).read_raw()
    }

    fn write_raw(&self, value: &str) -> Result<(), StoreError> {
        (**self).write_raw(value)
    }

    fn erase(&self) -> Result<(), StoreError> {
        (**self).erase()
    }
}

/// Session record kept in a JSON file, readable only by the owner on Unix.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_raw(&self, value: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a crash never leaves a half-written record.
        let temp = self.temp_path();
        write_private(&temp, value)?;
        fs::rename(&temp, &self.path)?;

        debug!("session written to {}", self.path.display());

        Ok(())
    }

    fn erase(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("session removed from {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, value: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, value: &str) -> io::Result<()> {
    fs::write(path, value)
}

/// In-process store, used by tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    value: Mutex<Option<String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw record, valid or not.
    #[must_use]
    pub fn with_raw(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write_raw(&self, value: &str) -> Result<(), StoreError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }

    fn erase(&self) -> Result<(), StoreError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
