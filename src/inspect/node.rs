use serde::Serialize;

use crate::value::Handle;

/// Handler category a value was dispatched to.
///
/// Skins key their styling off this; [`Category::Seq`] and
/// [`Category::Composite`] are the only categories whose nodes carry children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    Composite,
    Callable,
    Resource,
    Other,
}

impl Category {
    /// Lowercase label used in rendered output. Matches the serde name.
    pub fn label(self) -> &'static str {
        match self {
            Category::Null => "null",
            Category::Bool => "bool",
            Category::Int => "int",
            Category::Float => "float",
            Category::Str => "str",
            Category::Seq => "seq",
            Category::Composite => "composite",
            Category::Callable => "callable",
            Category::Resource => "resource",
            Category::Other => "other",
        }
    }
}

/// Why a node stopped short of a plain rendering.
///
/// Markers are ordinary output, not errors: a capped traversal is still a
/// successful inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Descent was cut off at the nesting cap.
    DepthLimit,
    /// The container was already entered during this call; rendered as a
    /// back-reference to the first occurrence.
    Recursion,
    /// The resource budget tripped while this node's children were being
    /// produced; the child list is incomplete.
    Truncated,
    /// Entry of an oversized sequence, rendered as name and type only.
    Simplified,
}

/// One node of the analysis tree.
///
/// `text` is the node's rendered block: whole lines, each ending in a
/// newline, possibly containing chunk markers in place of oversized
/// sub-blocks. Parents embed child blocks verbatim, which is what keeps a
/// marker valid no matter how deep the node sits.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub label: String,
    pub category: Category,
    /// Host-declared type name; composites and resources have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Single-line rendering of the value (or of the marker message).
    pub short: String,
    /// Long form of a value whose short form was abbreviated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Arena identity for containers; anchors and back-references use it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Handle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    /// Nesting depth this node sits at; the analysis root is depth 0.
    pub depth: usize,
    /// Declared entry count of a container, independent of how many children
    /// were actually produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_count: Option<usize>,
    #[serde(skip)]
    pub text: String,
}

impl Node {
    pub(crate) fn new(label: &str, category: Category, depth: usize) -> Self {
        Self {
            label: label.to_string(),
            category,
            type_name: None,
            short: String::new(),
            full: None,
            children: Vec::new(),
            identity: None,
            marker: None,
            depth,
            entry_count: None,
            text: String::new(),
        }
    }

    /// `true` when a skin can offer further detail for this node: child
    /// entries, or a long form behind an abbreviated one.
    pub fn is_expandable(&self) -> bool {
        !self.children.is_empty() || self.full.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_match_serde_names() {
        let categories = [
            Category::Null,
            Category::Bool,
            Category::Int,
            Category::Float,
            Category::Str,
            Category::Seq,
            Category::Composite,
            Category::Callable,
            Category::Resource,
            Category::Other,
        ];
        for category in categories {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, serde_json::Value::from(category.label()));
        }
    }

    #[test]
    fn expandable_means_children_or_full_form() {
        let mut node = Node::new("x", Category::Int, 0);
        assert!(!node.is_expandable());
        node.full = Some("very long".to_string());
        assert!(node.is_expandable());

        let mut parent = Node::new("p", Category::Seq, 0);
        parent.children.push(Node::new("0", Category::Int, 1));
        assert!(parent.is_expandable());
    }

    #[test]
    fn serialization_omits_empty_fields() {
        let node = Node::new("x", Category::Null, 2);
        let json = serde_json::to_value(&node).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("type_name"));
        assert!(!object.contains_key("children"));
        assert!(!object.contains_key("identity"));
        assert!(!object.contains_key("marker"));
        assert!(!object.contains_key("text"));
        assert_eq!(object["depth"], 2);
    }
}
