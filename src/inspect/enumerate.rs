use std::rc::Rc;

use thiserror::Error;

use crate::value::{Handle, HeapValue, Value, ValueArena};

/// One child of a container: display key plus value.
///
/// Sequence keys are positional indices rendered as text; composite keys are
/// the host's field names.
#[derive(Debug, Clone)]
pub struct Entry {
    pub key: Rc<str>,
    pub value: Value,
}

/// Raised by an enumerator that cannot produce a container's entries.
///
/// The traversal recovers from this by rendering the container with no
/// children; it never aborts a call.
#[derive(Debug, Error)]
#[error("entry enumeration failed: {reason}")]
pub struct EnumerateError {
    pub reason: String,
}

/// Produces the ordered child entries of a container.
///
/// Implementations must not mutate the container and must return entries in
/// the container's own order.
pub trait EntryEnumerator {
    fn entries(&self, arena: &ValueArena, handle: Handle) -> Result<Vec<Entry>, EnumerateError>;
}

/// Default enumerator: reads entries straight out of the arena.
#[derive(Debug, Default)]
pub struct ArenaEnumerator;

impl EntryEnumerator for ArenaEnumerator {
    fn entries(&self, arena: &ValueArena, handle: Handle) -> Result<Vec<Entry>, EnumerateError> {
        let entries = match arena.get(handle) {
            HeapValue::Seq(items) => items
                .iter()
                .enumerate()
                .map(|(idx, value)| Entry {
                    key: Rc::from(idx.to_string()),
                    value: value.clone(),
                })
                .collect(),
            HeapValue::Composite(composite) => composite
                .entries
                .iter()
                .map(|(key, value)| Entry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        };
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_get_positional_keys() {
        let mut arena = ValueArena::new();
        let seq = arena.alloc_seq(vec![Value::Int(10), Value::Bool(false)]);
        let entries = ArenaEnumerator.entries(&arena, seq).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(&*entries[0].key, "0");
        assert_eq!(entries[0].value, Value::Int(10));
        assert_eq!(&*entries[1].key, "1");
    }

    #[test]
    fn composites_keep_declaration_order() {
        let mut arena = ValueArena::new();
        let point = arena.alloc_composite("Point");
        arena.composite_push(point, "y", Value::Int(2));
        arena.composite_push(point, "x", Value::Int(1));
        let entries = ArenaEnumerator.entries(&arena, point).unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| &*e.key).collect();
        assert_eq!(keys, ["y", "x"]);
    }
}
