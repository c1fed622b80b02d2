//! The traversal-and-dispatch engine.
//!
//! # Depth Symmetry Invariant
//! Every container entry recorded by the governor is matched by exactly one
//! exit, on every path out of the expansion, including budget trips and
//! enumeration failures mid-walk. A call that returns with nonzero depth
//! would poison the depth budget of every later call on the same inspector,
//! so `expand_container` has no early return between `enter` and `exit`.
//!
//! Each top-level call starts a fresh visited registry and per-call clock;
//! only the call counter persists, and once it passes its cap the inspector
//! answers [`None`] for the rest of the process.
use crate::chunk::{ChunkStore, DiskChunkStore, MemoryChunkStore};
use crate::emit::{self, EmitError, EmitOutcome, Sink};
use crate::render::{Renderer, TextRenderer};
use crate::value::{Value, ValueArena};

pub mod enumerate;
pub mod governor;
pub mod limits;
pub mod node;
pub mod router;
pub mod visited;

pub(crate) mod walk;

pub use limits::Limits;
pub use node::{Category, Marker, Node};

use enumerate::{ArenaEnumerator, EntryEnumerator};
use governor::{MemoryProbe, ResourceGovernor, SystemMemoryProbe};
use visited::VisitedRegistry;
use walk::Walk;

/// How one full `inspect` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectOutcome {
    /// Analysis and emission both ran to completion.
    Completed,
    /// Output was cut off at the resource budget; the sink was told.
    Truncated,
    /// The process-lifetime call budget is exhausted; nothing was emitted.
    Skipped,
}

/// The inspection engine: analysis, storage and emission behind one handle.
///
/// An inspector is built once per host and reused; per-call state resets on
/// every [`Inspector::analyze`]. It is deliberately single-threaded, the
/// same as the values it inspects.
pub struct Inspector {
    limits: Limits,
    governor: ResourceGovernor,
    visited: VisitedRegistry,
    store: Box<dyn ChunkStore>,
    enumerator: Box<dyn EntryEnumerator>,
    renderer: Box<dyn Renderer>,
}

impl Inspector {
    /// Inspector with the default wiring: disk chunk spool, arena
    /// enumeration, plain-text rendering, platform memory probe.
    pub fn new(limits: Limits) -> Self {
        Self::with_parts(
            limits,
            Box::new(DiskChunkStore::new()),
            Box::new(ArenaEnumerator),
            Box::new(TextRenderer::new()),
            Box::new(SystemMemoryProbe),
        )
    }

    /// Inspector that never touches the filesystem.
    pub fn in_memory(limits: Limits) -> Self {
        Self::with_parts(
            limits,
            Box::new(MemoryChunkStore::new()),
            Box::new(ArenaEnumerator),
            Box::new(TextRenderer::new()),
            Box::new(SystemMemoryProbe),
        )
    }

    pub fn with_parts(
        limits: Limits,
        store: Box<dyn ChunkStore>,
        enumerator: Box<dyn EntryEnumerator>,
        renderer: Box<dyn Renderer>,
        probe: Box<dyn MemoryProbe>,
    ) -> Self {
        let governor = ResourceGovernor::with_probe(&limits, probe);
        Self {
            limits,
            governor,
            visited: VisitedRegistry::new(),
            store,
            enumerator,
            renderer,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn governor(&self) -> &ResourceGovernor {
        &self.governor
    }

    /// Analyzes one value into a node tree.
    ///
    /// Returns [`None`] once the call budget is exhausted; that answer is
    /// permanent for this process. The returned root's `text` may contain
    /// chunk markers; [`Inspector::emit`] resolves them.
    pub fn analyze(&mut self, arena: &ValueArena, value: &Value, label: &str) -> Option<Node> {
        self.governor.tick();
        if self.governor.call_budget_exhausted() {
            tracing::debug!(
                calls = self.governor.calls(),
                "call budget exhausted; skipping inspection"
            );
            return None;
        }
        self.visited.begin(arena.sentinel());
        let mut walk = Walk {
            arena,
            visited: &mut self.visited,
            governor: &mut self.governor,
            store: self.store.as_mut(),
            enumerator: self.enumerator.as_ref(),
            renderer: self.renderer.as_ref(),
            seq_threshold: self.limits.seq_threshold,
            chunk_threshold: self.limits.chunk_threshold,
        };
        Some(router::dispatch(&mut walk, value, label))
    }

    /// Expands rendered text into `sink`, resolving chunk markers.
    pub fn emit(&mut self, text: &str, sink: &mut dyn Sink) -> Result<EmitOutcome, EmitError> {
        emit::emit(text, self.store.as_mut(), &self.governor, sink)
    }

    /// Analyze-then-emit in one call.
    pub fn inspect(
        &mut self,
        arena: &ValueArena,
        value: &Value,
        label: &str,
        sink: &mut dyn Sink,
    ) -> Result<InspectOutcome, EmitError> {
        match self.analyze(arena, value, label) {
            None => Ok(InspectOutcome::Skipped),
            Some(node) => match self.emit(&node.text, sink)? {
                EmitOutcome::Completed => Ok(InspectOutcome::Completed),
                EmitOutcome::Truncated => Ok(InspectOutcome::Truncated),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_resets_per_call_state() {
        let mut arena = ValueArena::new();
        let point = arena.alloc_composite("Point");
        arena.composite_push(point, "x", Value::Int(1));
        let value = Value::Composite(point);

        let mut inspector = Inspector::in_memory(Limits::default());
        let first = inspector.analyze(&arena, &value, "p").unwrap();
        let second = inspector.analyze(&arena, &value, "p").unwrap();
        // The registry was cleared in between: no stale recursion marker.
        assert!(first.marker.is_none());
        assert!(second.marker.is_none());
        assert_eq!(inspector.governor().depth(), 0);
    }

    #[test]
    fn exhausted_call_budget_skips_permanently() {
        let mut limits = Limits::default();
        limits.max_calls = 1;
        let mut inspector = Inspector::in_memory(limits);
        let arena = ValueArena::new();

        assert!(inspector.analyze(&arena, &Value::Int(1), "n").is_some());
        assert!(inspector.analyze(&arena, &Value::Int(2), "n").is_none());
        assert!(inspector.analyze(&arena, &Value::Int(3), "n").is_none());

        let mut sink = emit::StreamSink::new(Vec::new());
        let outcome = inspector
            .inspect(&arena, &Value::Int(4), "n", &mut sink)
            .unwrap();
        assert_eq!(outcome, InspectOutcome::Skipped);
        assert!(sink.into_inner().is_empty());
    }
}
