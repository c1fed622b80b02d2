//! Write-once chunk storage for oversized rendered blocks.
//!
//! A block bigger than the configured threshold is parked in a store and
//! replaced in its parent's text by a marker, `@@@<key>@@@`. Emission scans
//! for markers and splices stored content back in, outside the traversal's
//! own resource window.
//!
//! Keys are `<secs>x<pid>x<nonce>-<counter>`: wall-clock seconds, process id
//! and a per-store nonce isolate concurrent runs from one another, the
//! counter orders chunks within a run. No key is ever written twice.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub mod disk;
pub mod memory;

pub use disk::DiskChunkStore;
pub use memory::MemoryChunkStore;

/// Fence delimiting a chunk marker on both sides.
pub const MARKER_FENCE: &str = "@@@";

static RUN_NONCE: AtomicU64 = AtomicU64::new(0);

/// Key of one stored chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkKey(String);

impl ChunkKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("chunk storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Write-once key/value storage for rendered blocks.
///
/// `put` always mints a fresh key; existing chunks are immutable. `get`
/// takes a raw key string because keys at emission time come out of marker
/// text, not out of live [`ChunkKey`] values.
pub trait ChunkStore {
    fn put(&mut self, content: &str) -> Result<ChunkKey, ChunkError>;
    fn get(&self, key: &str) -> Option<String>;
    /// Best-effort removal of every chunk this store instance wrote.
    fn clear_run(&mut self);
    /// Key prefix shared by every chunk this store instance writes.
    fn run_prefix(&self) -> &str;
}

/// Wraps a key in marker fences for splicing into rendered text.
pub fn marker_for(key: &ChunkKey) -> String {
    format!("{MARKER_FENCE}{key}{MARKER_FENCE}")
}

/// Stores `text` as a chunk when it exceeds `threshold`, returning the
/// marker; otherwise returns `text` unchanged. A store failure is logged and
/// the block stays inline, so output degrades to "bigger" rather than
/// "missing".
pub fn chunk_or_keep(store: &mut dyn ChunkStore, threshold: usize, text: String) -> String {
    if text.len() <= threshold {
        return text;
    }
    match store.put(&text) {
        Ok(key) => marker_for(&key),
        Err(err) => {
            tracing::warn!(
                error = %err,
                bytes = text.len(),
                "chunk store unavailable; keeping oversized block inline"
            );
            text
        }
    }
}

/// First chunk marker in `text`, if any.
///
/// Fences can appear in user strings, so the span between them must look
/// like a minted key before it counts as a marker; otherwise the fence is
/// literal text and the scan resumes past it.
pub(crate) fn find_marker(text: &str) -> Option<MarkerSpan<'_>> {
    let mut from = 0;
    while let Some(found) = text[from..].find(MARKER_FENCE) {
        let open = from + found;
        let key_start = open + MARKER_FENCE.len();
        let close = text[key_start..].find(MARKER_FENCE)?;
        let key = &text[key_start..key_start + close];
        if is_key_shaped(key) {
            return Some(MarkerSpan {
                start: open,
                end: key_start + close + MARKER_FENCE.len(),
                key,
            });
        }
        from = key_start;
    }
    None
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MarkerSpan<'a> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) key: &'a str,
}

pub(crate) fn is_key_shaped(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'x' || b == b'-')
}

/// Mints run-scoped chunk keys. One series per store instance.
pub(crate) struct KeySeries {
    prefix: String,
    counter: u64,
}

impl KeySeries {
    pub(crate) fn new() -> Self {
        let nonce = RUN_NONCE.fetch_add(1, Ordering::Relaxed);
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            prefix: format!("{}x{}x{}", secs, std::process::id(), nonce),
            counter: 0,
        }
    }

    pub(crate) fn next(&mut self) -> ChunkKey {
        self.counter += 1;
        ChunkKey(format!("{}-{}", self.prefix, self.counter))
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_series_mints_distinct_ordered_keys() {
        let mut series = KeySeries::new();
        let a = series.next();
        let b = series.next();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with(series.prefix()));
        assert!(a.as_str().ends_with("-1"));
        assert!(b.as_str().ends_with("-2"));
        assert!(is_key_shaped(a.as_str()));
    }

    #[test]
    fn two_series_never_share_a_prefix() {
        let a = KeySeries::new();
        let b = KeySeries::new();
        assert_ne!(a.prefix(), b.prefix());
    }

    #[test]
    fn finds_a_well_formed_marker() {
        let key = ChunkKey("12x34x0-1".to_string());
        let text = format!("head {} tail", marker_for(&key));
        let span = find_marker(&text).unwrap();
        assert_eq!(span.key, "12x34x0-1");
        assert_eq!(&text[span.start..span.end], "@@@12x34x0-1@@@");
        assert_eq!(&text[..span.start], "head ");
        assert_eq!(&text[span.end..], " tail");
    }

    #[test]
    fn stray_fences_in_user_text_are_not_markers() {
        assert_eq!(find_marker("mail@@@host and more"), None);
        assert_eq!(find_marker("a @@@ b @@@ c"), None);
        assert_eq!(find_marker("@@@not a key!@@@"), None);
    }

    #[test]
    fn literal_fence_before_a_real_marker_is_skipped() {
        let text = "x@@@y @@@12x34x0-7@@@ z";
        let span = find_marker(text).unwrap();
        assert_eq!(span.key, "12x34x0-7");
    }

    #[test]
    fn adjacent_fences_resolve_to_the_inner_marker() {
        let text = "@@@@@@12x34x0-1@@@";
        let span = find_marker(text).unwrap();
        assert_eq!(span.key, "12x34x0-1");
        assert_eq!(span.start, 3);
    }

    #[test]
    fn small_blocks_stay_inline() {
        let mut store = MemoryChunkStore::new();
        let text = chunk_or_keep(&mut store, 16, "short".to_string());
        assert_eq!(text, "short");
    }

    #[test]
    fn oversized_blocks_become_markers() {
        let mut store = MemoryChunkStore::new();
        let block = "x".repeat(64);
        let text = chunk_or_keep(&mut store, 16, block.clone());
        let span = find_marker(&text).unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(span.end, text.len());
        assert_eq!(store.get(span.key), Some(block));
    }
}
