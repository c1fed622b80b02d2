use std::collections::HashMap;

use crate::chunk::{ChunkError, ChunkKey, ChunkStore, KeySeries};

/// Chunk store that keeps everything in a map.
///
/// For tests and for embedded hosts that must not touch the filesystem.
/// Chunks survive exactly as long as the store.
pub struct MemoryChunkStore {
    chunks: HashMap<String, String>,
    keys: KeySeries,
}

impl Default for MemoryChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
            keys: KeySeries::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn put(&mut self, content: &str) -> Result<ChunkKey, ChunkError> {
        let key = self.keys.next();
        self.chunks.insert(key.as_str().to_string(), content.to_string());
        Ok(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.chunks.get(key).cloned()
    }

    fn clear_run(&mut self) {
        self.chunks.clear();
    }

    fn run_prefix(&self) -> &str {
        self.keys.prefix()
    }
}
