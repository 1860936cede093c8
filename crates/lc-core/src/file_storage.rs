use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::debug;

use crate::errors::StorageError;
use crate::storage::StateStorage;

/// How long to wait for another process to release the lock
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// File-based state storage
///
/// Each record lives in its own JSON file. Writes go through a temp file
/// and an atomic rename while holding an advisory lock.
///
/// # Directory Structure
/// ```text
/// ~/.local/share/lectern/state/
/// ├── lock            # Advisory lock file
/// ├── session.json    # Authentication session
/// └── progress.json   # Reading progress
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStorage {
    storage_dir: PathBuf,
    lock_file: PathBuf,
    lock_timeout: Duration,
}

impl FileStateStorage {
    /// Create a file-based store rooted at `storage_dir`, creating it if needed
    pub fn new(storage_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        let lock_file = storage_dir.join("lock");

        fs::create_dir_all(&storage_dir).map_err(|source| StorageError::Io {
            path: storage_dir.clone(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&storage_dir, perms).map_err(|source| StorageError::Io {
                path: storage_dir.clone(),
                source,
            })?;
        }

        Ok(Self {
            storage_dir,
            lock_file,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Override how long writes wait for a contended lock
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Get default storage directory for the current platform
    pub fn default_storage_dir() -> Result<PathBuf, StorageError> {
        let project_dirs = directories::ProjectDirs::from("", "", "lectern")
            .ok_or(StorageError::DirectoryUnavailable)?;

        Ok(project_dirs.data_dir().join("state"))
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.storage_dir.join(format!("{}.json", key)))
    }

    fn acquire_lock(&self) -> Result<fs::File, StorageError> {
        let lock_file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_file)
            .map_err(|source| StorageError::Io {
                path: self.lock_file.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.lock_timeout;
        while lock_file.try_lock_exclusive().is_err() {
            if Instant::now() >= deadline {
                return Err(StorageError::LockTimeout);
            }
            thread::sleep(LOCK_RETRY_INTERVAL);
        }

        Ok(lock_file)
    }
}

impl StateStorage for FileStateStorage {
    fn load_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save_raw(&self, key: &str, json: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        let _lock = self.acquire_lock()?;

        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        let temp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&temp_path).map_err(io_err)?;
            file.write_all(json.as_bytes()).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }

        fs::rename(&temp_path, &path).map_err(io_err)?;
        debug!("Persisted record '{}' to {}", key, path.display());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        let _lock = self.acquire_lock()?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}
