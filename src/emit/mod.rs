//! Output assembly: expanding chunk markers into a sink.
//!
//! Emission walks rendered text left to right. Literal spans are written
//! through as-is; each marker is replaced by its stored chunk, which is then
//! scanned the same way, so nested chunks expand in document order without
//! the assembler ever holding the whole output in memory. The governor is
//! polled between expansions, which is what bounds emission of output far
//! larger than the traversal budget allowed for.
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::chunk::{ChunkStore, find_marker};
use crate::inspect::governor::ResourceGovernor;

/// Written to the sink when emission stops at the resource budget.
pub const TRUNCATION_NOTICE: &str = "\n[output truncated: resource budget exceeded]\n";

/// Destination for assembled output.
///
/// Both styles of destination share the same scan/expand loop; the sink
/// decides what "flush after each segment" means for it.
pub trait Sink {
    fn write_segment(&mut self, bytes: &[u8]) -> io::Result<()>;
    /// Called after every written segment. Streaming sinks flush here;
    /// accumulating sinks may no-op.
    fn flush_segment(&mut self) -> io::Result<()>;
    /// Called once when emission completes.
    fn finish(&mut self) -> io::Result<()>;
    /// Called instead of [`Self::finish`] when emission stops early.
    fn truncated(&mut self) -> io::Result<()> {
        self.write_segment(TRUNCATION_NOTICE.as_bytes())?;
        self.finish()
    }
}

/// Sink that streams to any writer, flushing after every segment.
pub struct StreamSink<W: Write> {
    writer: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn write_segment(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn flush_segment(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Sink that appends to a file, buffering until emission completes.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Sink for FileSink {
    fn write_segment(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn flush_segment(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Completed,
    Truncated,
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("sink write failed: {0}")]
    Sink(#[from] io::Error),
}

/// Expands `text` into `sink`, splicing stored chunks over their markers.
///
/// A marker whose chunk is missing is dropped with a warning rather than
/// leaked into output. When the governor trips between expansions, the sink
/// gets a truncation notice and the store's current run is cleared, since
/// its remaining chunks can never be emitted.
pub fn emit(
    text: &str,
    store: &mut dyn ChunkStore,
    governor: &ResourceGovernor,
    sink: &mut dyn Sink,
) -> Result<EmitOutcome, EmitError> {
    let mut pending: Vec<String> = Vec::new();
    let mut current = text.to_string();
    let mut offset = 0usize;

    loop {
        match find_marker(&current[offset..]) {
            None => {
                sink.write_segment(current[offset..].as_bytes())?;
                sink.flush_segment()?;
                match pending.pop() {
                    Some(next) => {
                        current = next;
                        offset = 0;
                    }
                    None => break,
                }
            }
            Some(span) => {
                let (start, end) = (span.start, span.end);
                let key = span.key.to_string();
                sink.write_segment(current[offset..offset + start].as_bytes())?;
                sink.flush_segment()?;
                if governor.should_break() {
                    tracing::debug!("resource budget tripped mid-emission; truncating output");
                    sink.truncated()?;
                    store.clear_run();
                    return Ok(EmitOutcome::Truncated);
                }
                let after = offset + end;
                match store.get(&key) {
                    Some(content) => {
                        pending.push(current[after..].to_string());
                        current = content;
                        offset = 0;
                    }
                    None => {
                        tracing::warn!(key = %key, "chunk missing at emission; dropping marker");
                        offset = after;
                    }
                }
            }
        }
    }

    sink.finish()?;
    Ok(EmitOutcome::Completed)
}
