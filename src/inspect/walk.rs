use crate::chunk::{ChunkStore, chunk_or_keep};
use crate::inspect::enumerate::{Entry, EntryEnumerator};
use crate::inspect::governor::ResourceGovernor;
use crate::inspect::node::{Category, Marker, Node};
use crate::inspect::router;
use crate::inspect::visited::VisitedRegistry;
use crate::render::Renderer;
use crate::value::{Handle, HeapValue, ValueArena};

/// Per-call traversal context, threaded through every handler.
///
/// Borrows the engine's moving parts for the duration of one `analyze` call
/// so handlers can recurse through [`router::dispatch`] without the engine
/// owning any per-call state between calls.
pub(crate) struct Walk<'a> {
    pub(crate) arena: &'a ValueArena,
    pub(crate) visited: &'a mut VisitedRegistry,
    pub(crate) governor: &'a mut ResourceGovernor,
    pub(crate) store: &'a mut dyn ChunkStore,
    pub(crate) enumerator: &'a dyn EntryEnumerator,
    pub(crate) renderer: &'a dyn Renderer,
    pub(crate) seq_threshold: usize,
    pub(crate) chunk_threshold: usize,
}

impl Walk<'_> {
    pub(crate) fn depth(&self) -> usize {
        self.governor.depth()
    }

    /// Renders the node's block and chunks it if oversized. Every handler
    /// funnels its node through here exactly once.
    pub(crate) fn finish(&mut self, mut node: Node) -> Node {
        let rendered = self.renderer.render(&node);
        node.text = chunk_or_keep(self.store, self.chunk_threshold, rendered);
        node
    }

    pub(crate) fn expand_seq(&mut self, handle: Handle, label: &str) -> Node {
        self.expand_container(handle, label, Category::Seq)
    }

    pub(crate) fn expand_composite(&mut self, handle: Handle, label: &str) -> Node {
        self.expand_container(handle, label, Category::Composite)
    }

    fn expand_container(&mut self, handle: Handle, label: &str, category: Category) -> Node {
        let depth = self.depth();

        // Terminal outcomes first; none of them enter the container or
        // touch the visited registry.
        if self.governor.at_depth_limit() {
            let mut node = Node::new(label, category, depth);
            node.short = "maximum nesting level reached".to_string();
            node.marker = Some(Marker::DepthLimit);
            node.identity = Some(handle);
            return self.finish(node);
        }
        if self.governor.budget_exceeded() {
            let mut node = Node::new(label, category, depth);
            node.short = "resource budget exceeded".to_string();
            node.marker = Some(Marker::Truncated);
            node.identity = Some(handle);
            return self.finish(node);
        }
        if self.visited.contains(handle) {
            let mut node = Node::new(label, category, depth);
            node.short = "recursion".to_string();
            node.marker = Some(Marker::Recursion);
            node.identity = Some(handle);
            return self.finish(node);
        }

        self.visited.insert(handle);
        self.governor.enter();

        // No early return between enter and exit; depth stays balanced even
        // when the loop below breaks off.
        let entry_count = self.arena.entry_count(handle);
        let mut children = Vec::new();
        let mut marker = None;
        match self.enumerator.entries(self.arena, handle) {
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    container = handle.index(),
                    "entry enumeration failed; rendering container as empty"
                );
            }
            Ok(entries) => {
                let simplified =
                    category == Category::Seq && entries.len() > self.seq_threshold;
                for entry in &entries {
                    let skip = category == Category::Seq
                        && entry
                            .value
                            .identity()
                            .is_some_and(|h| self.visited.is_sentinel(h));
                    if skip {
                        continue;
                    }
                    if self.governor.budget_exceeded() {
                        marker = Some(Marker::Truncated);
                        break;
                    }
                    let child = if simplified && entry.value.is_container() {
                        self.simplified_entry(entry)
                    } else {
                        router::dispatch(self, &entry.value, &entry.key)
                    };
                    children.push(child);
                }
            }
        }

        self.governor.exit();

        let mut node = Node::new(label, category, depth);
        node.children = children;
        node.identity = Some(handle);
        node.marker = marker;
        node.entry_count = Some(entry_count);
        match self.arena.get(handle) {
            HeapValue::Composite(composite) => {
                node.type_name = Some(composite.type_name.to_string());
                node.short = composite.type_name.to_string();
            }
            HeapValue::Seq(_) => {
                node.short = format!("{entry_count} entries");
            }
        }
        self.finish(node)
    }

    /// Name-and-type rendering for entries of an oversized sequence.
    fn simplified_entry(&mut self, entry: &Entry) -> Node {
        let depth = self.depth();
        let handle = entry
            .value
            .identity()
            .expect("simplified_entry: scalar entry");
        let mut node = Node::new(&entry.key, Category::Seq, depth);
        node.identity = Some(handle);
        node.marker = Some(Marker::Simplified);
        node.entry_count = Some(self.arena.entry_count(handle));
        match self.arena.get(handle) {
            HeapValue::Composite(composite) => {
                node.category = Category::Composite;
                node.type_name = Some(composite.type_name.to_string());
                node.short = composite.type_name.to_string();
            }
            HeapValue::Seq(items) => {
                node.short = format!("seq({})", items.len());
            }
        }
        self.finish(node)
    }
}
