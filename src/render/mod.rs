//! Text skin over analysis nodes.
//!
//! Each node renders to a self-contained block of whole lines, indented by
//! the node's own depth. Parents splice child blocks in verbatim, so a block
//! reads the same whether it ends up inline or behind a chunk marker.
use std::fmt::Write;

pub mod anchor;

use crate::inspect::node::{Category, Marker, Node};
use crate::render::anchor::anchor_for;

const INDENT: &str = "    ";

/// Turns one node (with already-rendered children) into its text block.
pub trait Renderer {
    fn render(&self, node: &Node) -> String;
}

/// The default plain-text skin.
///
/// Containers open with a header line carrying their anchor and close with a
/// lone bracket; every other node is a single line, except strings with a
/// long form, which carry an indented quote block.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TextRenderer {
    fn render(&self, node: &Node) -> String {
        let pad = INDENT.repeat(node.depth);
        let mut out = String::new();
        match node.marker {
            Some(Marker::Recursion) => {
                let anchor = node.identity.map(anchor_for).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{pad}{} ({}) &recursion -> #{anchor}",
                    node.label,
                    node.category.label()
                );
            }
            Some(Marker::DepthLimit) => {
                let _ = writeln!(
                    out,
                    "{pad}{} ({}) !{}",
                    node.label,
                    node.category.label(),
                    node.short
                );
            }
            Some(Marker::Simplified) => {
                let _ = writeln!(out, "{pad}{} => {}", node.label, node.short);
            }
            // A budget trip at descent: the container was never opened.
            Some(Marker::Truncated) if node.entry_count.is_none() => {
                let _ = writeln!(
                    out,
                    "{pad}{} ({}) !{}",
                    node.label,
                    node.category.label(),
                    node.short
                );
            }
            _ => match node.category {
                Category::Seq | Category::Composite => render_container(&mut out, node, &pad),
                _ => render_leaf(&mut out, node, &pad),
            },
        }
        out
    }
}

fn render_container(out: &mut String, node: &Node, pad: &str) {
    let anchor = node.identity.map(anchor_for).unwrap_or_default();
    let (open, close) = match node.category {
        Category::Seq => ('[', ']'),
        _ => ('{', '}'),
    };
    match node.category {
        Category::Seq => {
            let count = node.entry_count.unwrap_or(node.children.len());
            let _ = writeln!(
                out,
                "{pad}{} (seq, {count} entries) [#{anchor}] {open}",
                node.label
            );
        }
        _ => {
            let type_name = node.type_name.as_deref().unwrap_or("?");
            let _ = writeln!(
                out,
                "{pad}{} (composite {type_name}) [#{anchor}] {open}",
                node.label
            );
        }
    }
    for child in &node.children {
        out.push_str(&child.text);
    }
    if node.marker == Some(Marker::Truncated) {
        let _ = writeln!(out, "{pad}{INDENT}!resource budget exceeded");
    }
    let _ = writeln!(out, "{pad}{close}");
}

fn render_leaf(out: &mut String, node: &Node, pad: &str) {
    match &node.full {
        Some(full) => {
            let chars = full.chars().count();
            let _ = writeln!(
                out,
                "{pad}{} ({}, {chars} chars) => {}",
                node.label,
                node.category.label(),
                node.short
            );
            for line in full.lines() {
                let _ = writeln!(out, "{pad}{INDENT}| {line}");
            }
        }
        None => {
            let _ = writeln!(
                out,
                "{pad}{} ({}) => {}",
                node.label,
                node.category.label(),
                node.short
            );
        }
    }
}
