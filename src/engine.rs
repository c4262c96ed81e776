//! The fair share engine: a two-level round-robin step machine.
//!
//! Groups take turns in a rotation. On its turn a group receives an equal
//! share of the global quantum, and that share is split again across the
//! processes ready in the group when the turn began. Each call to
//! [`FairShareEngine::step`] performs exactly one such turn.
//!
//! ```text
//!   pending (by arrival) ──admit──▶ ready[group] ──dispatch──▶ completed
//!                                      ▲    │
//!                                      └────┘ requeue if unfinished
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, info, trace};

use crate::error::{FairShareError, FairShareResult};
use crate::metrics::{self, MetricsSummary};
use crate::process::{GroupId, Process, ProcessId, ProcessMetrics};
use crate::timeline::{ExecutionBlock, Timeline};
use crate::time::VirtualTime;

// ── Turn report ───────────────────────────────────────────────────────

/// What happened during one group turn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnReport {
    /// 1-based turn counter.
    pub turn: u64,
    /// The group that held the CPU.
    pub group: GroupId,
    pub started_at: VirtualTime,
    pub ended_at: VirtualTime,
    /// Rotation length when the turn began, active group included.
    pub active_groups: usize,
    pub group_quantum: u64,
    pub process_quantum: u64,
    /// Processes dispatched this turn (the ready count at turn start).
    pub dispatched: usize,
    /// Processes that finished during this turn, in completion order.
    pub completed: Vec<ProcessId>,
}

// ── Engine ────────────────────────────────────────────────────────────

/// Deterministic fair share scheduler simulation.
///
/// Owns every process once loaded: each one lives in exactly one of the
/// pending queue, a group ready queue, or the completed list.
#[derive(Debug, Clone)]
pub struct FairShareEngine {
    quantum: u64,
    now: VirtualTime,

    /// Not yet arrived, ordered by arrival (input order on ties).
    pending: VecDeque<Process>,
    ready: BTreeMap<GroupId, VecDeque<Process>>,

    /// Whose turn is next. `in_rotation` mirrors it for membership tests.
    rotation: VecDeque<GroupId>,
    in_rotation: BTreeSet<GroupId>,

    completed: Vec<Process>,
    timeline: Timeline,

    loaded: usize,
    turns: u64,
    finished: bool,
}

impl FairShareEngine {
    /// Create an engine with the given global quantum.
    pub fn new(quantum: u64) -> FairShareResult<Self> {
        if quantum == 0 {
            return Err(FairShareError::InvalidQuantum);
        }
        Ok(FairShareEngine {
            quantum,
            now: VirtualTime::ZERO,
            pending: VecDeque::new(),
            ready: BTreeMap::new(),
            rotation: VecDeque::new(),
            in_rotation: BTreeSet::new(),
            completed: Vec::new(),
            timeline: Timeline::new(),
            loaded: 0,
            turns: 0,
            finished: false,
        })
    }

    /// Reset all state and seed the pending queue without running.
    ///
    /// Processes are ordered by arrival time; the sort is stable so equal
    /// arrivals keep their input order.
    pub fn load<I>(&mut self, processes: I)
    where
        I: IntoIterator<Item = Process>,
    {
        self.reset();
        let mut processes: Vec<Process> = processes.into_iter().collect();
        processes.sort_by_key(Process::arrival);
        self.loaded = processes.len();
        self.pending = processes.into();
        debug!(processes = self.loaded, quantum = self.quantum, "workload loaded");
    }

    /// Reset, load `processes`, and step until termination.
    ///
    /// Returns the number of turns executed.
    pub fn simulate<I>(&mut self, processes: I) -> u64
    where
        I: IntoIterator<Item = Process>,
    {
        self.load(processes);
        self.run()
    }

    /// Step until termination. Returns the number of turns executed
    /// during this call.
    pub fn run(&mut self) -> u64 {
        let start = self.turns;
        while self.step().is_some() {}
        self.turns - start
    }

    /// Step until termination **or** `max_turns` turns have run,
    /// whichever comes first. Returns the number of turns executed.
    pub fn run_for(&mut self, max_turns: u64) -> u64 {
        let start = self.turns;
        for _ in 0..max_turns {
            if self.step().is_none() {
                break;
            }
        }
        self.turns - start
    }

    /// Execute one group turn.
    ///
    /// Returns `None` once the simulation has terminated (no ready and no
    /// pending processes); further calls keep returning `None`.
    pub fn step(&mut self) -> Option<TurnReport> {
        if self.finished {
            return None;
        }

        self.admit_arrivals();
        self.prune_rotation();

        if self.rotation.is_empty() {
            let Some(next_arrival) = self.pending.front().map(Process::arrival) else {
                self.finished = true;
                info!(
                    completed = self.completed.len(),
                    turns = self.turns,
                    blocks = self.timeline.len(),
                    "simulation finished at {}",
                    self.now
                );
                return None;
            };
            debug!("cpu idle, fast-forwarding {} -> {}", self.now, next_arrival);
            self.now = next_arrival;
            self.admit_arrivals();
            self.prune_rotation();
        }

        let active_groups = self.rotation.len();
        let group = self.rotation.pop_front()?;
        self.rotation.push_back(group);

        let ready_at_start = self.ready_count(group);
        let group_quantum = self.quantum / active_groups as u64;
        let process_quantum = (group_quantum / ready_at_start.max(1) as u64).max(1);

        let started_at = self.now;
        let mut completed = Vec::new();

        // Only the processes queued at turn start take part; anything
        // admitted or requeued below lands behind them.
        for _ in 0..ready_at_start {
            let Some(mut process) = self.ready.get_mut(&group).and_then(VecDeque::pop_front) else {
                break;
            };

            let start = self.now;
            let consumed = process.dispatch(process_quantum, start);
            self.now = start
                .advance(consumed)
                .expect("VirtualTime overflow during dispatch");
            self.timeline
                .record(ExecutionBlock::new(process.id(), process.group(), start, self.now));
            trace!(
                process = %process.id(),
                %group,
                consumed,
                remaining = process.remaining(),
                "dispatched [{}, {})",
                start.ticks(),
                self.now.ticks()
            );

            self.admit_arrivals();

            if process.is_completed() {
                trace!(process = %process.id(), "completed at {}", self.now);
                completed.push(process.id());
                self.completed.push(process);
            } else {
                self.ready.entry(group).or_default().push_back(process);
            }
        }

        self.turns += 1;
        debug!(
            turn = self.turns,
            %group,
            active_groups,
            group_quantum,
            process_quantum,
            dispatched = ready_at_start,
            "turn [{}, {})",
            started_at.ticks(),
            self.now.ticks()
        );

        Some(TurnReport {
            turn: self.turns,
            group,
            started_at,
            ended_at: self.now,
            active_groups,
            group_quantum,
            process_quantum,
            dispatched: ready_at_start,
            completed,
        })
    }

    // ── Internals ─────────────────────────────────────────────

    fn reset(&mut self) {
        self.now = VirtualTime::ZERO;
        self.pending.clear();
        self.ready.clear();
        self.rotation.clear();
        self.in_rotation.clear();
        self.completed.clear();
        self.timeline.clear();
        self.loaded = 0;
        self.turns = 0;
        self.finished = false;
    }

    /// Move every arrived process into its group's ready queue, appending
    /// the group to the rotation if it is not already there.
    fn admit_arrivals(&mut self) {
        while self
            .pending
            .front()
            .is_some_and(|p| !self.now.is_before(p.arrival()))
        {
            let Some(process) = self.pending.pop_front() else {
                break;
            };
            let group = process.group();
            trace!(process = %process.id(), %group, "admitted at {}", self.now);
            self.ready.entry(group).or_default().push_back(process);
            if self.in_rotation.insert(group) {
                self.rotation.push_back(group);
            }
        }
    }

    /// Drop groups with nothing ready from the rotation.
    fn prune_rotation(&mut self) {
        let ready = &self.ready;
        let in_rotation = &mut self.in_rotation;
        self.rotation.retain(|group| {
            let keep = ready.get(group).is_some_and(|q| !q.is_empty());
            if !keep {
                in_rotation.remove(group);
            }
            keep
        });
    }

    // ── Inspection ────────────────────────────────────────────

    /// The global quantum.
    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    /// Current virtual time.
    pub fn current_time(&self) -> VirtualTime {
        self.now
    }

    /// Returns `true` once the termination predicate has been observed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Turns executed since the last load.
    pub fn turns_executed(&self) -> u64 {
        self.turns
    }

    /// Number of processes handed to the last `load`/`simulate`.
    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    /// Processes that have not arrived yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Processes waiting in `group`'s ready queue.
    pub fn ready_count(&self, group: GroupId) -> usize {
        self.ready.get(&group).map_or(0, VecDeque::len)
    }

    /// Processes waiting across all ready queues.
    pub fn ready_total(&self) -> usize {
        self.ready.values().map(VecDeque::len).sum()
    }

    /// Every group seen so far, in ascending id order.
    pub fn known_groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.ready.keys().copied()
    }

    /// Current rotation, head first.
    pub fn rotation(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.rotation.iter().copied()
    }

    /// Processes that are admitted but unfinished, grouped by ready queue.
    pub fn ready_processes(&self) -> impl Iterator<Item = &Process> + '_ {
        self.ready.values().flat_map(|q| q.iter())
    }

    /// Completed processes in completion order.
    pub fn completed(&self) -> &[Process] {
        &self.completed
    }

    /// Metric rows for completed processes, in completion order.
    pub fn completed_metrics(&self) -> Vec<ProcessMetrics> {
        self.completed.iter().filter_map(Process::metrics).collect()
    }

    /// The execution timeline produced so far.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Global and per-group averages, or `None` with nothing completed.
    pub fn summary(&self) -> Option<MetricsSummary> {
        metrics::summarize(&self.completed)
    }
}

#[cfg(test)]
mod tests;
