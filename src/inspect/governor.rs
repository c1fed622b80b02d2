use std::time::{Duration, Instant};

use crate::inspect::limits::Limits;

/// Where the governor asks how much memory the platform has left.
///
/// Injected so hosts can wire in their own accounting and tests can trip the
/// floor deterministically.
pub trait MemoryProbe {
    /// Currently available memory in bytes, or `None` when the platform
    /// offers no figure. Unknown never trips the floor.
    fn available_bytes(&self) -> Option<u64>;
}

/// Probe backed by `/proc/meminfo` (`MemAvailable`).
#[derive(Debug, Default)]
pub struct SystemMemoryProbe;

impl MemoryProbe for SystemMemoryProbe {
    fn available_bytes(&self) -> Option<u64> {
        let text = std::fs::read_to_string("/proc/meminfo").ok()?;
        parse_mem_available(&text)
    }
}

fn parse_mem_available(text: &str) -> Option<u64> {
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("MemAvailable:") {
            let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kib * 1024);
        }
    }
    None
}

/// Probe that always reports the same figure. For tests and for hosts that
/// meter memory themselves.
#[derive(Debug)]
pub struct FixedMemoryProbe(pub u64);

impl MemoryProbe for FixedMemoryProbe {
    fn available_bytes(&self) -> Option<u64> {
        Some(self.0)
    }
}

/// Enforces the caps in [`Limits`] over one inspector's lifetime.
///
/// Depth and the per-call clock reset with every top-level call; the call
/// counter does not. Once `calls` has passed `max_calls` the governor stays
/// latched for the rest of the process, however long it idles in between.
pub struct ResourceGovernor {
    max_depth: usize,
    max_elapsed: Duration,
    memory_floor: u64,
    max_calls: usize,
    depth: usize,
    calls: usize,
    started: Instant,
    probe: Box<dyn MemoryProbe>,
}

impl ResourceGovernor {
    pub fn new(limits: &Limits) -> Self {
        Self::with_probe(limits, Box::new(SystemMemoryProbe))
    }

    pub fn with_probe(limits: &Limits, probe: Box<dyn MemoryProbe>) -> Self {
        Self {
            max_depth: limits.max_depth,
            max_elapsed: elapsed_budget(limits.max_seconds),
            memory_floor: limits.memory_floor_bytes,
            max_calls: limits.max_calls,
            depth: 0,
            calls: 0,
            started: Instant::now(),
            probe,
        }
    }

    /// Registers one top-level call and restarts the per-call clock.
    pub fn tick(&mut self) {
        self.calls += 1;
        self.started = Instant::now();
    }

    /// `true` once more than `max_calls` calls have been registered.
    pub fn call_budget_exhausted(&self) -> bool {
        self.calls > self.max_calls
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Records entry into a container. Must be paired with [`Self::exit`].
    pub fn enter(&mut self) {
        self.depth += 1;
    }

    /// Records leaving a container.
    pub fn exit(&mut self) {
        debug_assert!(self.depth > 0, "ResourceGovernor::exit without enter");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn at_depth_limit(&self) -> bool {
        self.depth >= self.max_depth
    }

    pub fn elapsed_exceeded(&self) -> bool {
        self.started.elapsed() > self.max_elapsed
    }

    pub fn memory_low(&self) -> bool {
        match self.probe.available_bytes() {
            Some(available) => available < self.memory_floor,
            None => false,
        }
    }

    /// `true` when the time or memory budget has been crossed. Depth is not
    /// consulted: depth cuts a single branch, these caps end the whole call.
    pub fn budget_exceeded(&self) -> bool {
        self.elapsed_exceeded() || self.memory_low()
    }

    /// Combined stop signal: depth cap, elapsed time cap, or memory floor.
    pub fn should_break(&self) -> bool {
        self.at_depth_limit() || self.budget_exceeded()
    }
}

impl std::fmt::Debug for ResourceGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGovernor")
            .field("depth", &self.depth)
            .field("calls", &self.calls)
            .field("max_depth", &self.max_depth)
            .field("max_calls", &self.max_calls)
            .finish_non_exhaustive()
    }
}

fn elapsed_budget(max_seconds: f64) -> Duration {
    Duration::try_from_secs_f64(max_seconds).unwrap_or_else(|_| {
        tracing::warn!(max_seconds, "invalid time budget; using default");
        Duration::try_from_secs_f64(Limits::default().max_seconds)
            .unwrap_or(Duration::from_secs(30))
    })
}
