//! Fluent builder for scheduling scenarios.
//!
//! Hides the boilerplate of constructing processes and engines while
//! keeping every run deterministic.

use crate::engine::FairShareEngine;
use crate::error::FairShareResult;
use crate::process::{GroupId, Process, ProcessId};
use crate::time::VirtualTime;
use crate::verify::QuantumSweep;
use crate::workload::validate_processes;

/// Quantum used when none is set explicitly.
pub const DEFAULT_QUANTUM: u64 = 4;

// ── ScenarioBuilder ───────────────────────────────────────────────────

/// Fluent builder for a workload plus the engine that runs it.
///
/// # Example
/// ```rust
/// use fairshare::dsl::ScenarioBuilder;
///
/// let (engine, turns) = ScenarioBuilder::new()
///     .quantum(4)
///     .process(1, 1, 0, 5)
///     .process(2, 2, 0, 3)
///     .run()
///     .unwrap();
/// assert_eq!(turns, 5);
/// assert_eq!(engine.completed().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    quantum: u64,
    processes: Vec<Process>,
}

impl ScenarioBuilder {
    /// Create a builder with [`DEFAULT_QUANTUM`] and no processes.
    pub fn new() -> Self {
        ScenarioBuilder {
            quantum: DEFAULT_QUANTUM,
            processes: Vec::new(),
        }
    }

    /// Set the global quantum.
    pub fn quantum(mut self, quantum: u64) -> Self {
        self.quantum = quantum;
        self
    }

    // ── Processes ─────────────────────────────────────────────

    /// Add one process.
    pub fn process(mut self, pid: u64, group: u64, arrival: u64, burst: u64) -> Self {
        self.processes.push(Process::new(
            ProcessId::new(pid),
            GroupId::new(group),
            VirtualTime::new(arrival),
            burst,
        ));
        self
    }

    /// Add `(pid, arrival, burst)` triples, all in `group`.
    pub fn group<I>(mut self, group: u64, members: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64, u64)>,
    {
        for (pid, arrival, burst) in members {
            self = self.process(pid, group, arrival, burst);
        }
        self
    }

    /// Add already-constructed processes, e.g. from a workload file.
    pub fn processes<I>(mut self, processes: I) -> Self
    where
        I: IntoIterator<Item = Process>,
    {
        self.processes.extend(processes);
        self
    }

    /// The processes added so far, in insertion order.
    pub fn workload(&self) -> &[Process] {
        &self.processes
    }

    // ── Build ─────────────────────────────────────────────────

    /// Build an engine with the workload loaded but not yet run.
    ///
    /// The workload is checked like a parsed file: zero bursts, duplicate
    /// pids and runs past the end of simulation time are errors.
    pub fn build(self) -> FairShareResult<FairShareEngine> {
        validate_processes(&self.processes)?;
        let mut engine = FairShareEngine::new(self.quantum)?;
        engine.load(self.processes);
        Ok(engine)
    }

    /// Build and run to completion, returning the engine and the number
    /// of turns executed.
    pub fn run(self) -> FairShareResult<(FairShareEngine, u64)> {
        let mut engine = self.build()?;
        let turns = engine.run();
        Ok((engine, turns))
    }

    /// Turn the workload into a sweep over `quanta`. The builder's own
    /// quantum is ignored.
    pub fn sweep<I>(self, quanta: I) -> QuantumSweep
    where
        I: IntoIterator<Item = u64>,
    {
        let mut sweep = QuantumSweep::new(self.processes);
        sweep.quanta(quanta);
        sweep
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}
