use std::rc::Rc;

use crate::value::Value;

/// Identity tag of an arena-allocated container.
///
/// A `Handle` is a lightweight, copyable index into the [`ValueArena`]. It is
/// the only identity the engine ever compares: handle equality means "same
/// container", regardless of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct Handle(pub(crate) u32);

impl Handle {
    /// Returns the raw arena slot index backing this handle.
    pub fn index(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub fn new_for_test(index: u32) -> Self {
        Self(index)
    }
}

/// Container payload stored in one arena slot.
#[derive(Debug, Clone, PartialEq)]
pub enum HeapValue {
    Seq(Vec<Value>),
    Composite(Composite),
}

/// Keyed record with a host-supplied type name.
///
/// Entries keep insertion order; duplicate keys are the host's problem and
/// are rendered as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub type_name: Rc<str>,
    pub entries: Vec<(Rc<str>, Value)>,
}

/// Slot-vector arena holding every container of one value graph.
///
/// Slots are append-only. Nothing is ever freed or compacted while the arena
/// is alive, so a [`Handle`] is stable and never aliases a different
/// container later. Cycles are expressed by pushing a `Value::Seq`/
/// `Value::Composite` whose handle points back at an earlier slot.
#[derive(Debug, Default)]
pub struct ValueArena {
    entries: Vec<HeapValue>,
    sentinel: Option<Handle>,
}

impl ValueArena {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            sentinel: None,
        }
    }

    /// Allocates a sequence and returns its identity.
    pub fn alloc_seq(&mut self, items: Vec<Value>) -> Handle {
        self.push_slot(HeapValue::Seq(items))
    }

    /// Allocates an empty composite with the given type name.
    pub fn alloc_composite(&mut self, type_name: &str) -> Handle {
        self.push_slot(HeapValue::Composite(Composite {
            type_name: Rc::from(type_name),
            entries: Vec::new(),
        }))
    }

    fn push_slot(&mut self, slot: HeapValue) -> Handle {
        let idx = self.entries.len() as u32;
        self.entries.push(slot);
        Handle(idx)
    }

    /// Returns the container behind a handle.
    ///
    /// Panics if the handle belongs to a different arena; handles are never
    /// dangling within their own arena.
    pub fn get(&self, handle: Handle) -> &HeapValue {
        self.entries
            .get(handle.0 as usize)
            .expect("ValueArena::get: foreign handle")
    }

    /// Appends an item to a sequence. Panics on a non-sequence handle.
    pub fn seq_push(&mut self, handle: Handle, value: Value) {
        match &mut self.entries[handle.0 as usize] {
            HeapValue::Seq(items) => items.push(value),
            HeapValue::Composite(_) => panic!("ValueArena::seq_push: handle is a composite"),
        }
    }

    /// Appends a keyed entry to a composite. Panics on a non-composite handle.
    pub fn composite_push(&mut self, handle: Handle, key: &str, value: Value) {
        match &mut self.entries[handle.0 as usize] {
            HeapValue::Composite(composite) => composite.entries.push((Rc::from(key), value)),
            HeapValue::Seq(_) => panic!("ValueArena::composite_push: handle is a sequence"),
        }
    }

    /// Number of direct entries in the container behind `handle`.
    pub fn entry_count(&self, handle: Handle) -> usize {
        match self.get(handle) {
            HeapValue::Seq(items) => items.len(),
            HeapValue::Composite(composite) => composite.entries.len(),
        }
    }

    /// Marks one container as the host's root registry.
    ///
    /// Sequence traversal skips entries whose identity equals the sentinel,
    /// so a process-global container that (directly or not) holds itself does
    /// not recurse through its own inspection machinery.
    pub fn set_sentinel(&mut self, handle: Handle) {
        self.sentinel = Some(handle);
    }

    pub fn sentinel(&self) -> Option<Handle> {
        self.sentinel
    }

    /// Returns the number of allocated containers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
