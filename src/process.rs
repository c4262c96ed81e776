//! Processes and the identifiers that key them.
//!
//! A [`Process`] carries its static requirements (arrival, burst) and the
//! runtime counters the engine drives through [`Process::dispatch`]. The
//! completion metrics are write-once: they are filled in together at the
//! instant the remaining time reaches zero and never touched again.

use crate::time::VirtualTime;

// ── Identifiers ───────────────────────────────────────────────────────

/// Caller-assigned unique process identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessId(u64);

impl ProcessId {
    #[inline]
    pub fn new(id: u64) -> Self {
        ProcessId(id)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Opaque group key. The engine only compares and hashes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(u64);

impl GroupId {
    #[inline]
    pub fn new(id: u64) -> Self {
        GroupId(id)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "G{}", self.0)
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────

/// Observable lifecycle of a process.
///
/// There is no persisted "running" state: between dispatches a process
/// waits in its group's ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessState {
    /// Never dispatched.
    NotStarted,
    /// Dispatched at least once, CPU time still owed.
    Started,
    /// Remaining time reached zero.
    Completed,
}

/// Metrics fixed at the instant a process finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Completion {
    pub completed_at: VirtualTime,
    /// `completed_at − arrival`.
    pub turnaround: u64,
    /// `turnaround − burst`.
    pub waiting: u64,
}

/// Flat per-process metrics row for reporting and visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessMetrics {
    pub id: ProcessId,
    pub group: GroupId,
    pub arrival: VirtualTime,
    pub burst: u64,
    pub first_dispatch: VirtualTime,
    pub completed_at: VirtualTime,
    pub response: u64,
    pub waiting: u64,
    pub turnaround: u64,
}

// ── Process ───────────────────────────────────────────────────────────

/// A CPU-bound process.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Process {
    id: ProcessId,
    group: GroupId,
    arrival: VirtualTime,
    burst: u64,

    remaining: u64,
    first_dispatch: Option<VirtualTime>,
    response: Option<u64>,
    completion: Option<Completion>,
}

impl Process {
    /// Create a fresh, never-dispatched process.
    pub fn new(id: ProcessId, group: GroupId, arrival: VirtualTime, burst: u64) -> Self {
        Process {
            id,
            group,
            arrival,
            burst,
            remaining: burst,
            first_dispatch: None,
            response: None,
            completion: None,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn arrival(&self) -> VirtualTime {
        self.arrival
    }

    pub fn burst(&self) -> u64 {
        self.burst
    }

    /// CPU time still owed.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn first_dispatch(&self) -> Option<VirtualTime> {
        self.first_dispatch
    }

    /// Time from arrival to first dispatch, once dispatched.
    pub fn response(&self) -> Option<u64> {
        self.response
    }

    pub fn completion(&self) -> Option<Completion> {
        self.completion
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_some()
    }

    pub fn state(&self) -> ProcessState {
        match (self.first_dispatch, self.completion) {
            (_, Some(_)) => ProcessState::Completed,
            (Some(_), None) => ProcessState::Started,
            (None, None) => ProcessState::NotStarted,
        }
    }

    /// Run for up to `allotted` ticks starting at `now`.
    ///
    /// Returns the ticks actually consumed: `min(remaining, allotted)`.
    /// Records the response time on the first dispatch and the completion
    /// metrics when the remaining time hits zero.
    ///
    /// The caller guarantees `allotted > 0`, that the process has not
    /// completed, and that `now` is not before its arrival.
    pub fn dispatch(&mut self, allotted: u64, now: VirtualTime) -> u64 {
        debug_assert!(allotted > 0, "dispatch with a zero allotment");
        debug_assert!(!self.is_completed(), "dispatch of completed {}", self.id);
        debug_assert!(!now.is_before(self.arrival), "dispatch of {} before arrival", self.id);

        if self.first_dispatch.is_none() {
            self.first_dispatch = Some(now);
            self.response = now.duration_since(self.arrival);
        }

        let consumed = self.remaining.min(allotted);
        self.remaining -= consumed;

        if self.remaining == 0 {
            let completed_at = now
                .advance(consumed)
                .expect("VirtualTime overflow during dispatch");
            let turnaround = completed_at.ticks() - self.arrival.ticks();
            self.completion = Some(Completion {
                completed_at,
                turnaround,
                waiting: turnaround - self.burst,
            });
        }

        consumed
    }

    /// The flat metrics row, available once the process has completed.
    pub fn metrics(&self) -> Option<ProcessMetrics> {
        let completion = self.completion?;
        Some(ProcessMetrics {
            id: self.id,
            group: self.group,
            arrival: self.arrival,
            burst: self.burst,
            first_dispatch: self.first_dispatch?,
            completed_at: completion.completed_at,
            response: self.response?,
            waiting: completion.waiting,
            turnaround: completion.turnaround,
        })
    }
}
