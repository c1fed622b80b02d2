//! Host-facing value model.
//!
//! # Identity Invariant
//! Scalar values are plain data and travel by value; `Rc` keeps string and
//! callable payloads cheap to clone. Containers (sequences and composites)
//! are *not* inlined: they live in a [`ValueArena`] and appear inside
//! [`Value`] only as a [`Handle`]. Two `Value::Seq`/`Value::Composite` refer
//! to the same container exactly when their handles are equal, which is what
//! lets the traversal detect cycles and aliasing instead of following them
//! forever.
//!
//! Arena slots are never reused, so a handle observed once stays valid and
//! unambiguous for the arena's whole lifetime.
use std::rc::Rc;

pub mod arena;

pub use arena::{Composite, Handle, HeapValue, ValueArena};

/// A value handed to the inspector by the host.
///
/// The set of variants is closed on purpose: dispatch is a total match over
/// this enum, and anything the host cannot express through it arrives as
/// [`Value::Opaque`] carrying a display label for the fallback handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Immutable string payload, shared rather than copied.
    Str(Rc<str>),
    /// Ordered sequence, stored in the arena.
    Seq(Handle),
    /// Keyed record with a type name, stored in the arena.
    Composite(Handle),
    /// Function-like value. Never invoked, only described.
    Callable(Rc<Callable>),
    /// Handle to an external resource (stream, socket, ...).
    Resource(Rc<Resource>),
    /// Anything the host could not classify; the payload is a display label.
    Opaque(Rc<str>),
}

/// Descriptive payload of a callable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callable {
    pub name: Rc<str>,
    pub arity: usize,
}

/// Descriptive payload of an external resource handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: Rc<str>,
}

impl Value {
    /// Canonical lowercase name of the variant, as shown in rendered output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Seq(_) => "seq",
            Value::Composite(_) => "composite",
            Value::Callable(_) => "callable",
            Value::Resource(_) => "resource",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Arena identity of this value, if it is a container.
    ///
    /// Scalars have no identity; equal scalars are indistinguishable.
    pub fn identity(&self) -> Option<Handle> {
        match self {
            Value::Seq(handle) | Value::Composite(handle) => Some(*handle),
            _ => None,
        }
    }

    /// `true` for values the traversal descends into.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Seq(_) | Value::Composite(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
