//! Workload files: parsing process definitions and labelling groups.
//!
//! One process per line, whitespace separated:
//!
//! ```text
//! # pid arrival burst [group]
//! 1 0 5
//! 2 0 3 2
//! ```
//!
//! Blank lines and `#` comments are skipped; columns past the fourth are
//! ignored. Groups come from the configured [`GroupAssignment`].

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::config::GroupAssignment;
use crate::error::{FairShareError, FairShareResult};
use crate::process::{GroupId, Process, ProcessId};
use crate::rng::DeterministicRng;
use crate::time::VirtualTime;

/// A parsed line before group labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Record {
    line: usize,
    id: ProcessId,
    arrival: u64,
    burst: u64,
    group: Option<u64>,
}

/// Read and parse a workload file.
pub fn load_processes(
    path: impl AsRef<Path>,
    assignment: &GroupAssignment,
) -> FairShareResult<Vec<Process>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| FairShareError::Io(format!("{}: {}", path.display(), e)))?;
    let processes = parse_processes(&text, assignment)?;
    debug!(path = %path.display(), processes = processes.len(), "workload read");
    Ok(processes)
}

/// Parse workload text and label every process with a group.
///
/// Processes are returned in file order.
pub fn parse_processes(text: &str, assignment: &GroupAssignment) -> FairShareResult<Vec<Process>> {
    assignment.validate()?;

    let mut seen = BTreeSet::new();
    let mut records = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = parse_record(idx + 1, line)?;
        if !seen.insert(record.id) {
            return Err(FairShareError::DuplicateProcess(record.id));
        }
        records.push(record);
    }

    let mut labeler = GroupLabeler::new(assignment);
    let processes = records
        .into_iter()
        .map(|r| -> FairShareResult<Process> {
            let group = labeler.label(&r)?;
            Ok(Process::new(r.id, group, VirtualTime::new(r.arrival), r.burst))
        })
        .collect::<FairShareResult<Vec<_>>>()?;
    validate_processes(&processes)?;
    Ok(processes)
}

/// Check a workload the engine can run without breaking its guarantees.
///
/// Rejects zero bursts and duplicate pids, and any workload whose last
/// completion could pass `u64::MAX`: no run ends later than the latest
/// arrival plus the total burst.
pub fn validate_processes(processes: &[Process]) -> FairShareResult<()> {
    let mut seen = BTreeSet::new();
    let mut total_burst: u64 = 0;
    let mut latest_arrival = VirtualTime::ZERO;
    for p in processes {
        if p.burst() == 0 {
            return Err(FairShareError::ZeroBurst(p.id()));
        }
        if !seen.insert(p.id()) {
            return Err(FairShareError::DuplicateProcess(p.id()));
        }
        total_burst = total_burst
            .checked_add(p.burst())
            .ok_or(FairShareError::TimeOverflow)?;
        latest_arrival = latest_arrival.max(p.arrival());
    }
    latest_arrival
        .advance(total_burst)
        .map(|_| ())
        .ok_or(FairShareError::TimeOverflow)
}

fn parse_record(line: usize, text: &str) -> FairShareResult<Record> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(FairShareError::MalformedLine {
            line,
            reason: format!("expected `pid arrival burst [group]`, got {} field(s)", fields.len()),
        });
    }

    let number = |i: usize, label: &str| -> FairShareResult<u64> {
        fields[i].parse().map_err(|_| FairShareError::MalformedLine {
            line,
            reason: format!("invalid {} `{}`", label, fields[i]),
        })
    };

    let id = ProcessId::new(number(0, "pid")?);
    let arrival = number(1, "arrival")?;
    let burst = number(2, "burst")?;
    let group = if fields.len() > 3 {
        Some(number(3, "group")?)
    } else {
        None
    };

    if burst == 0 {
        return Err(FairShareError::ZeroBurst(id));
    }
    if arrival.checked_add(burst).is_none() {
        return Err(FairShareError::MalformedLine {
            line,
            reason: format!("arrival {} plus burst {} is out of range", arrival, burst),
        });
    }

    Ok(Record {
        line,
        id,
        arrival,
        burst,
        group,
    })
}

/// Applies a `GroupAssignment` to records in file order.
enum GroupLabeler {
    Random { groups: u64, rng: DeterministicRng },
    RoundRobin { groups: u64, next: u64 },
    FromInput,
}

impl GroupLabeler {
    fn new(assignment: &GroupAssignment) -> Self {
        match *assignment {
            GroupAssignment::Random { groups, seed } => GroupLabeler::Random {
                groups,
                rng: DeterministicRng::new(seed),
            },
            GroupAssignment::RoundRobin { groups } => GroupLabeler::RoundRobin { groups, next: 0 },
            GroupAssignment::FromInput => GroupLabeler::FromInput,
        }
    }

    fn label(&mut self, record: &Record) -> FairShareResult<GroupId> {
        let raw = match self {
            GroupLabeler::Random { groups, rng } => rng.next_inclusive(1, *groups),
            GroupLabeler::RoundRobin { groups, next } => {
                let g = *next % *groups + 1;
                *next += 1;
                g
            }
            GroupLabeler::FromInput => record.group.ok_or_else(|| FairShareError::MalformedLine {
                line: record.line,
                reason: format!("process {} has no group column", record.id),
            })?,
        };
        Ok(GroupId::new(raw))
    }
}
