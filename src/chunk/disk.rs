use std::fs;
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use crate::chunk::{ChunkError, ChunkKey, ChunkStore, KeySeries, is_key_shaped};

const FILE_PREFIX: &str = "scry-";
const FILE_SUFFIX: &str = ".chunk";
const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60);

static SWEEP: Once = Once::new();

/// Chunk store backed by one file per chunk in a spool directory.
///
/// The directory is shared across processes; key prefixes keep runs apart.
/// The first `put` of the process sweeps chunk files older than the
/// retention window, so files orphaned by crashed runs do not pile up.
pub struct DiskChunkStore {
    dir: PathBuf,
    keys: KeySeries,
    written: Vec<PathBuf>,
    retention: Duration,
}

impl Default for DiskChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskChunkStore {
    /// Spools chunks under the platform temp directory.
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keys: KeySeries::new(),
            written: Vec::new(),
            retention: DEFAULT_RETENTION,
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{key}{FILE_SUFFIX}"))
    }

    /// Deletes chunk files older than the retention window, from any run.
    /// Returns how many were removed. Unreadable entries are skipped.
    pub fn sweep_stale(&self) -> usize {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(FILE_PREFIX) || !name.ends_with(FILE_SUFFIX) {
                continue;
            }
            let stale = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|age| age > self.retention);
            if stale && fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

impl ChunkStore for DiskChunkStore {
    fn put(&mut self, content: &str) -> Result<ChunkKey, ChunkError> {
        fs::create_dir_all(&self.dir)?;
        SWEEP.call_once(|| {
            let removed = self.sweep_stale();
            if removed > 0 {
                tracing::debug!(removed, dir = %self.dir.display(), "swept stale chunk files");
            }
        });
        let key = self.keys.next();
        let path = self.path_for(key.as_str());
        fs::write(&path, content)?;
        self.written.push(path);
        Ok(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        if !is_key_shaped(key) {
            return None;
        }
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn clear_run(&mut self) {
        for path in self.written.drain(..) {
            let _ = fs::remove_file(path);
        }
    }

    fn run_prefix(&self) -> &str {
        self.keys.prefix()
    }
}
