use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use super::StoredResponse;

const FILE_PREFIX: &str = "prvw-";
const FILE_EXTENSION: &str = ".bin";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] io::Error),

    #[error("cache record encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Preview responses persisted on disk, one file per cache key.
///
/// There is no in-memory index: a lookup is an attempt to open the record
/// file. Reads share the record lock, writes take it exclusively. `clear`
/// holds its own lock and the exclusive side of the record lock.
///
/// `max_files` is kept for reporting only. Records are never evicted; `clear`
/// is the only way they go away.
pub struct DiskCache {
    dir: PathBuf,
    max_files: usize,
    clear_lock: Mutex<()>,
    records: RwLock<()>,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_files,
            clear_lock: Mutex::new(()),
            records: RwLock::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Remove every record file, returning how many were deleted.
    /// Files not following the record naming scheme are left alone.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let _clearing = self.clear_lock.lock();
        let _records = self.records.write();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let is_record = name
                .to_str()
                .map(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_EXTENSION))
                .unwrap_or(false);

            if is_record {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Look up a record. Missing, truncated or corrupt files all read as a miss.
    pub fn get(&self, key: &str) -> Option<StoredResponse> {
        let _records = self.records.read();

        match self.load(key) {
            Ok(record) => Some(record),
            Err(CacheError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("cache miss for {}", key);
                None
            }
            Err(e) => {
                warn!("unreadable cache record {}: {}", key, e);
                None
            }
        }
    }

    /// Write a record, replacing any previous one. Failures are logged and dropped.
    pub fn set(&self, key: &str, record: &StoredResponse) {
        let _records = self.records.write();

        match self.store(key, record) {
            Ok(()) => debug!("cached {} ({} bytes)", key, record.len()),
            Err(e) => warn!("failed to cache {}: {}", key, e),
        }
    }

    fn load(&self, key: &str) -> Result<StoredResponse, CacheError> {
        let bytes = fs::read(self.filename(key))?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn store(&self, key: &str, record: &StoredResponse) -> Result<(), CacheError> {
        let bytes = bincode::serialize(record)?;
        fs::write(self.filename(key), bytes)?;
        Ok(())
    }

    fn filename(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", FILE_PREFIX, key, FILE_EXTENSION))
    }
}
