//! Execution timeline: the append-only log of CPU intervals.
//!
//! Every dispatch the engine performs lands here as an immutable
//! [`ExecutionBlock`]. The log can be hashed for replay comparison and
//! exported to / imported from a small deterministic text format.

use std::io::{self, BufRead, Write};

use crate::error::{FairShareError, FairShareResult};
use crate::process::{GroupId, ProcessId};
use crate::time::VirtualTime;

// ── Hash utility ──────────────────────────────────────────────────────

/// Combine two u64 hashes deterministically.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut h = a;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h = h.wrapping_add(b);
    h ^= h >> 32;
    h
}

// ── Execution Block ───────────────────────────────────────────────────

/// One contiguous interval `[start, end)` during which a process held
/// the CPU. `end > start` always holds for blocks the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionBlock {
    pub process: ProcessId,
    pub group: GroupId,
    pub start: VirtualTime,
    pub end: VirtualTime,
}

impl ExecutionBlock {
    pub fn new(process: ProcessId, group: GroupId, start: VirtualTime, end: VirtualTime) -> Self {
        ExecutionBlock {
            process,
            group,
            start,
            end,
        }
    }

    /// Ticks covered by this block.
    pub fn duration(&self) -> u64 {
        self.end.ticks().saturating_sub(self.start.ticks())
    }
}

impl std::fmt::Display for ExecutionBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} [{}, {})",
            self.process,
            self.group,
            self.start.ticks(),
            self.end.ticks()
        )
    }
}

// ── Timeline ──────────────────────────────────────────────────────────

/// Ordered, append-only sequence of execution blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    blocks: Vec<ExecutionBlock>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Timeline { blocks: Vec::new() }
    }

    /// Append a block. Blocks are never modified after this.
    pub fn record(&mut self, block: ExecutionBlock) {
        self.blocks.push(block);
    }

    /// All blocks in the order they were produced.
    pub fn blocks(&self) -> &[ExecutionBlock] {
        &self.blocks
    }

    /// Blocks belonging to one process, in chronological order.
    pub fn blocks_for(&self, process: ProcessId) -> impl Iterator<Item = &ExecutionBlock> + '_ {
        self.blocks.iter().filter(move |b| b.process == process)
    }

    /// Total ticks the CPU was busy.
    pub fn busy_time(&self) -> u64 {
        self.blocks.iter().map(ExecutionBlock::duration).sum()
    }

    /// End of the last block, or zero for an empty timeline.
    pub fn makespan(&self) -> VirtualTime {
        self.blocks.last().map(|b| b.end).unwrap_or(VirtualTime::ZERO)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Compute a deterministic hash of the entire timeline.
    pub fn timeline_hash(&self) -> u64 {
        let mut h: u64 = 0;
        for block in &self.blocks {
            h = hash_combine(h, block.process.raw());
            h = hash_combine(h, block.group.raw());
            h = hash_combine(h, block.start.ticks());
            h = hash_combine(h, block.end.ticks());
        }
        h
    }

    // ── Export / Import ───────────────────────────────────────────

    /// Export the timeline to a writer in a deterministic text format.
    pub fn export<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "# FAIRSHARE TIMELINE v1")?;
        writeln!(w, "# blocks: {}", self.blocks.len())?;
        for b in &self.blocks {
            writeln!(
                w,
                "B {} {} {} {}",
                b.process.raw(),
                b.group.raw(),
                b.start.ticks(),
                b.end.ticks()
            )?;
        }
        Ok(())
    }

    /// Export to a file path.
    pub fn export_to_file(&self, path: impl AsRef<std::path::Path>) -> FairShareResult<()> {
        let mut f = io::BufWriter::new(std::fs::File::create(path)?);
        self.export(&mut f)?;
        f.flush()?;
        Ok(())
    }

    /// Import a timeline from a reader.
    pub fn import<R: BufRead>(r: R) -> FairShareResult<Self> {
        let mut blocks = Vec::new();
        for (idx, line) in r.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let block = deserialize_block(line)
                .map_err(|e| FairShareError::InvalidTimeline(format!("line {}: {}", idx + 1, e)))?;
            blocks.push(block);
        }
        Ok(Timeline { blocks })
    }

    /// Import from a file path.
    pub fn import_from_file(path: impl AsRef<std::path::Path>) -> FairShareResult<Self> {
        let f = std::fs::File::open(path)?;
        Self::import(io::BufReader::new(f))
    }
}

// ── Verification ──────────────────────────────────────────────────────

/// Compare two timelines block by block.
pub fn timelines_match(a: &Timeline, b: &Timeline) -> bool {
    a.blocks == b.blocks
}

fn deserialize_block(line: &str) -> Result<ExecutionBlock, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 || parts[0] != "B" {
        return Err(format!("invalid block line: {}", line));
    }
    let field = |i: usize, label: &str| -> Result<u64, String> {
        parts[i].parse().map_err(|e| format!("{}: {}", label, e))
    };
    let start = field(3, "start")?;
    let end = field(4, "end")?;
    if end <= start {
        return Err(format!("empty or reversed interval [{}, {})", start, end));
    }
    Ok(ExecutionBlock::new(
        ProcessId::new(field(1, "process")?),
        GroupId::new(field(2, "group")?),
        VirtualTime::new(start),
        VirtualTime::new(end),
    ))
}
