use crate::inspect::node::{Category, Node};
use crate::inspect::walk::Walk;
use crate::value::Value;

/// Characters of a string shown inline before the long form splits off.
pub const SHORT_STR_MAX: usize = 80;

/// One registered value handler.
///
/// The set is closed: adding a representation means adding a variant here
/// and an arm in [`Handler::handle`], and the compiler points at every match
/// that needs extending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    Composite,
    Callable,
    Resource,
    Fallback,
}

/// Handlers in dispatch priority order.
///
/// Specific handlers come first; [`Handler::Fallback`] accepts everything and
/// must stay last.
pub const HANDLERS: &[Handler] = &[
    Handler::Null,
    Handler::Bool,
    Handler::Int,
    Handler::Float,
    Handler::Str,
    Handler::Seq,
    Handler::Composite,
    Handler::Callable,
    Handler::Resource,
    Handler::Fallback,
];

/// Routes a value to the first handler that accepts it.
///
/// Total: every value produces exactly one node, because the fallback
/// accepts anything the specific handlers declined.
pub(crate) fn dispatch(walk: &mut Walk<'_>, value: &Value, label: &str) -> Node {
    for handler in HANDLERS {
        if handler.can_handle(value) {
            return handler.handle(walk, value, label);
        }
    }
    unreachable!("fallback handler accepts every value")
}

impl Handler {
    /// `true` when this handler knows how to render `value`.
    pub fn can_handle(self, value: &Value) -> bool {
        match self {
            Handler::Null => matches!(value, Value::Null),
            Handler::Bool => matches!(value, Value::Bool(_)),
            Handler::Int => matches!(value, Value::Int(_)),
            Handler::Float => matches!(value, Value::Float(_)),
            Handler::Str => matches!(value, Value::Str(_)),
            Handler::Seq => matches!(value, Value::Seq(_)),
            Handler::Composite => matches!(value, Value::Composite(_)),
            Handler::Callable => matches!(value, Value::Callable(_)),
            Handler::Resource => matches!(value, Value::Resource(_)),
            Handler::Fallback => true,
        }
    }

    /// Category stamped on nodes this handler produces.
    pub fn category(self) -> Category {
        match self {
            Handler::Null => Category::Null,
            Handler::Bool => Category::Bool,
            Handler::Int => Category::Int,
            Handler::Float => Category::Float,
            Handler::Str => Category::Str,
            Handler::Seq => Category::Seq,
            Handler::Composite => Category::Composite,
            Handler::Callable => Category::Callable,
            Handler::Resource => Category::Resource,
            Handler::Fallback => Category::Other,
        }
    }

    pub(crate) fn handle(self, walk: &mut Walk<'_>, value: &Value, label: &str) -> Node {
        let depth = walk.depth();
        let node = match (self, value) {
            (Handler::Null, Value::Null) => {
                let mut node = Node::new(label, Category::Null, depth);
                node.short = "null".to_string();
                node
            }
            (Handler::Bool, Value::Bool(b)) => {
                let mut node = Node::new(label, Category::Bool, depth);
                node.short = b.to_string();
                node
            }
            (Handler::Int, Value::Int(n)) => {
                let mut node = Node::new(label, Category::Int, depth);
                node.short = n.to_string();
                node
            }
            (Handler::Float, Value::Float(x)) => {
                let mut node = Node::new(label, Category::Float, depth);
                node.short = x.to_string();
                node
            }
            (Handler::Str, Value::Str(s)) => {
                let mut node = Node::new(label, Category::Str, depth);
                if s.chars().count() > SHORT_STR_MAX {
                    let prefix: String = s.chars().take(SHORT_STR_MAX).collect();
                    node.short = format!("\"{}...\"", prefix.escape_debug());
                    node.full = Some(s.to_string());
                } else {
                    node.short = format!("\"{}\"", s.escape_debug());
                }
                node
            }
            (Handler::Seq, Value::Seq(handle)) => return walk.expand_seq(*handle, label),
            (Handler::Composite, Value::Composite(handle)) => {
                return walk.expand_composite(*handle, label);
            }
            (Handler::Callable, Value::Callable(call)) => {
                let mut node = Node::new(label, Category::Callable, depth);
                node.short = format!("<callable {}/{}>", call.name, call.arity);
                node
            }
            (Handler::Resource, Value::Resource(res)) => {
                let mut node = Node::new(label, Category::Resource, depth);
                node.short = format!("<resource {}>", res.kind);
                node.type_name = Some(res.kind.to_string());
                node
            }
            // The fallback arm, and the landing spot for any value a
            // specific handler accepted but cannot destructure.
            (_, value) => {
                let kind = match value {
                    Value::Opaque(kind) => kind.to_string(),
                    other => other.type_name().to_string(),
                };
                let mut node = Node::new(label, Category::Other, depth);
                node.short = format!("unhandled type: {kind}");
                node
            }
        };
        walk.finish(node)
    }
}
