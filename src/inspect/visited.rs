use std::collections::HashSet;

use crate::value::Handle;

/// Identity set of containers entered during one top-level call.
///
/// Entries are inserted when a container is entered and never removed until
/// the next call begins, so a container reached twice along *any* path, cycle
/// or mere aliasing, renders as a back-reference the second time. Removing
/// entries on exit would detect only true cycles and re-render shared
/// subtrees once per path.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    seen: HashSet<Handle>,
    sentinel: Option<Handle>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the registry for a fresh top-level call.
    pub fn begin(&mut self, sentinel: Option<Handle>) {
        self.seen.clear();
        self.sentinel = sentinel;
    }

    /// Records a container as entered. Returns `false` if it was already in.
    pub fn insert(&mut self, handle: Handle) -> bool {
        self.seen.insert(handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.seen.contains(&handle)
    }

    /// `true` when `handle` is the host's root registry container.
    pub fn is_sentinel(&self, handle: Handle) -> bool {
        self.sentinel == Some(handle)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
