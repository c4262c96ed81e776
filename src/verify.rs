//! Invariant checking and quantum sweeps.
//!
//! A [`Property`] inspects an engine (finished or mid-run) and reports
//! whether an invariant holds. [`standard_properties`] covers the
//! guarantees every run must uphold; [`QuantumSweep`] replays one workload
//! under many quanta and checks properties after each run.

use std::collections::BTreeSet;

use crate::engine::FairShareEngine;
use crate::error::FairShareResult;
use crate::metrics::MetricsSummary;
use crate::process::Process;
use crate::time::VirtualTime;
use crate::workload::validate_processes;

// ── Property ──────────────────────────────────────────────────────────

/// An invariant checked against an engine's state.
pub trait Property {
    /// Name of the property (for violation reports).
    fn name(&self) -> &str;

    /// Returns `Ok(())` if satisfied, `Err(message)` if violated.
    fn check(&self, engine: &FairShareEngine) -> Result<(), String>;
}

/// Convenience wrapper for closure-based properties.
pub struct NamedProperty {
    name: String,
    check_fn: Box<dyn Fn(&FairShareEngine) -> Result<(), String>>,
}

impl NamedProperty {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&FairShareEngine) -> Result<(), String> + 'static,
    {
        NamedProperty {
            name: name.to_string(),
            check_fn: Box::new(f),
        }
    }
}

impl Property for NamedProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, engine: &FairShareEngine) -> Result<(), String> {
        (self.check_fn)(engine)
    }
}

// ── Standard properties ───────────────────────────────────────────────

/// Every process's blocks add up to the CPU time it has consumed; for
/// completed processes that is exactly the burst.
pub fn conservation(engine: &FairShareEngine) -> Result<(), String> {
    let in_flight = engine.ready_processes();
    for p in engine.completed().iter().chain(in_flight) {
        let executed: u64 = engine
            .timeline()
            .blocks_for(p.id())
            .map(|b| b.duration())
            .sum();
        let consumed = p.burst() - p.remaining();
        if executed != consumed {
            return Err(format!(
                "{} executed {} ticks but consumed {} of burst {}",
                p.id(),
                executed,
                consumed,
                p.burst()
            ));
        }
    }
    Ok(())
}

/// Completion metrics agree with each other and never run backwards.
pub fn consistent_times(engine: &FairShareEngine) -> Result<(), String> {
    for m in engine.completed_metrics() {
        if m.first_dispatch.is_before(m.arrival) {
            return Err(format!("{} dispatched before it arrived", m.id));
        }
        if m.turnaround != m.waiting + m.burst {
            return Err(format!(
                "{}: turnaround {} != waiting {} + burst {}",
                m.id, m.turnaround, m.waiting, m.burst
            ));
        }
        if m.response > m.waiting {
            return Err(format!(
                "{}: response {} exceeds waiting {}",
                m.id, m.response, m.waiting
            ));
        }
    }
    Ok(())
}

/// Blocks are produced in time order and never overlap on the one CPU.
pub fn timeline_monotonic(engine: &FairShareEngine) -> Result<(), String> {
    for pair in engine.timeline().blocks().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start.is_before(a.end) {
            return Err(format!("{} overlaps or precedes {}", b, a));
        }
    }
    Ok(())
}

/// No dispatch is ever shorter than one tick.
pub fn quantum_floor(engine: &FairShareEngine) -> Result<(), String> {
    match engine.timeline().blocks().iter().find(|b| b.duration() == 0) {
        Some(b) => Err(format!("zero-length block {}", b)),
        None => Ok(()),
    }
}

/// No process is lost or duplicated; once finished, all have completed.
pub fn completeness(engine: &FairShareEngine) -> Result<(), String> {
    let accounted = engine.completed().len() + engine.ready_total() + engine.pending_count();
    if accounted != engine.loaded_count() {
        return Err(format!(
            "{} processes loaded but {} accounted for",
            engine.loaded_count(),
            accounted
        ));
    }

    let mut seen = BTreeSet::new();
    if let Some(dup) = engine.completed().iter().find(|p| !seen.insert(p.id())) {
        return Err(format!("{} completed twice", dup.id()));
    }

    if engine.is_finished() && engine.completed().len() != engine.loaded_count() {
        return Err(format!(
            "finished with {} of {} processes completed",
            engine.completed().len(),
            engine.loaded_count()
        ));
    }
    Ok(())
}

/// The properties every simulation must satisfy.
pub fn standard_properties() -> Vec<Box<dyn Property>> {
    vec![
        Box::new(NamedProperty::new("conservation", conservation)),
        Box::new(NamedProperty::new("consistent-times", consistent_times)),
        Box::new(NamedProperty::new("timeline-monotonic", timeline_monotonic)),
        Box::new(NamedProperty::new("quantum-floor", quantum_floor)),
        Box::new(NamedProperty::new("completeness", completeness)),
    ]
}

// ── Violation ─────────────────────────────────────────────────────────

/// A property violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the violated property.
    pub property: String,
    /// Quantum of the run that violated it.
    pub quantum: u64,
    /// Human-readable violation message.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[q={}] {}: {}", self.quantum, self.property, self.message)
    }
}

/// Check `properties` against `engine` and collect every failure.
pub fn check_all(engine: &FairShareEngine, properties: &[Box<dyn Property>]) -> Vec<Violation> {
    properties
        .iter()
        .filter_map(|prop| {
            prop.check(engine).err().map(|message| Violation {
                property: prop.name().to_string(),
                quantum: engine.quantum(),
                message,
            })
        })
        .collect()
}

// ── Quantum sweep ─────────────────────────────────────────────────────

/// Outcome of one run in a sweep.
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub quantum: u64,
    pub turns: u64,
    pub makespan: VirtualTime,
    pub timeline_hash: u64,
    pub summary: Option<MetricsSummary>,
}

/// Summary of a completed sweep.
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub runs: Vec<SweepRun>,
    pub violations: Vec<Violation>,
}

impl SweepResult {
    /// Whether all properties held in every run.
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Runs one workload under a series of quanta.
pub struct QuantumSweep {
    workload: Vec<Process>,
    quanta: Vec<u64>,
    properties: Vec<Box<dyn Property>>,
}

impl QuantumSweep {
    /// Sweep `workload` with the standard properties installed.
    pub fn new(workload: Vec<Process>) -> Self {
        QuantumSweep {
            workload,
            quanta: Vec::new(),
            properties: standard_properties(),
        }
    }

    /// Add quanta to try, in order.
    pub fn quanta<I: IntoIterator<Item = u64>>(&mut self, quanta: I) -> &mut Self {
        self.quanta.extend(quanta);
        self
    }

    /// Add a property to check after every run.
    pub fn add_property(&mut self, prop: Box<dyn Property>) -> &mut Self {
        self.properties.push(prop);
        self
    }

    /// Add a closure-based property.
    pub fn check<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&FairShareEngine) -> Result<(), String> + 'static,
    {
        self.properties.push(Box::new(NamedProperty::new(name, f)));
        self
    }

    /// Run every quantum to completion and check all properties.
    ///
    /// Fails if the workload is invalid or a quantum is zero.
    pub fn run(&self) -> FairShareResult<SweepResult> {
        validate_processes(&self.workload)?;
        let mut runs = Vec::with_capacity(self.quanta.len());
        let mut violations = Vec::new();

        for &quantum in &self.quanta {
            let mut engine = FairShareEngine::new(quantum)?;
            let turns = engine.simulate(self.workload.iter().cloned());
            violations.extend(check_all(&engine, &self.properties));
            runs.push(SweepRun {
                quantum,
                turns,
                makespan: engine.timeline().makespan(),
                timeline_hash: engine.timeline().timeline_hash(),
                summary: engine.summary(),
            });
        }

        Ok(SweepResult { runs, violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FairShareError;
    use crate::process::{GroupId, ProcessId};

    fn workload() -> Vec<Process> {
        [(1, 1, 0, 5), (2, 2, 0, 3), (3, 1, 2, 8), (4, 3, 9, 2), (5, 2, 40, 6)]
            .into_iter()
            .map(|(id, g, a, b)| {
                Process::new(ProcessId::new(id), GroupId::new(g), VirtualTime::new(a), b)
            })
            .collect()
    }

    #[test]
    fn test_standard_properties_hold_after_run() {
        let mut engine = FairShareEngine::new(4).unwrap();
        engine.simulate(workload());
        let violations = check_all(&engine, &standard_properties());
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_standard_properties_hold_mid_run() {
        let mut engine = FairShareEngine::new(3).unwrap();
        engine.load(workload());
        for _ in 0..4 {
            engine.step();
            let violations = check_all(&engine, &standard_properties());
            assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    #[test]
    fn test_named_property_reports_violation() {
        let mut engine = FairShareEngine::new(4).unwrap();
        engine.simulate(workload());
        let props: Vec<Box<dyn Property>> = vec![Box::new(NamedProperty::new(
            "finishes-by-10",
            |e: &FairShareEngine| {
                if e.timeline().makespan() <= VirtualTime::new(10) {
                    Ok(())
                } else {
                    Err(format!("makespan {}", e.timeline().makespan()))
                }
            },
        ))];
        let violations = check_all(&engine, &props);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].property, "finishes-by-10");
        assert_eq!(violations[0].quantum, 4);
        assert!(violations[0].to_string().starts_with("[q=4] finishes-by-10:"));
    }

    #[test]
    fn test_quantum_sweep() {
        let mut sweep = QuantumSweep::new(workload());
        sweep
            .quanta([1, 2, 3, 5, 8, 13])
            .check("all-complete", |e: &FairShareEngine| {
                if e.completed().len() == 5 {
                    Ok(())
                } else {
                    Err("missing completions".into())
                }
            });
        let result = sweep.run().unwrap();

        assert!(result.is_safe(), "{:?}", result.violations);
        assert_eq!(result.runs.len(), 6);
        // Total CPU demand is 24 and the CPU idles from 24 to 40, so
        // every run ends at 46 regardless of quantum.
        assert!(result.runs.iter().all(|r| r.makespan == VirtualTime::new(46)));
    }

    #[test]
    fn test_sweep_rejects_zero_burst() {
        let mut bad = workload();
        bad.push(Process::new(ProcessId::new(9), GroupId::new(1), VirtualTime::ZERO, 0));
        let mut sweep = QuantumSweep::new(bad);
        sweep.quanta([4]);
        assert_eq!(
            sweep.run().unwrap_err(),
            FairShareError::ZeroBurst(ProcessId::new(9))
        );
    }

    #[test]
    fn test_sweep_rejects_zero_quantum() {
        let mut sweep = QuantumSweep::new(workload());
        sweep.quanta([0]);
        assert_eq!(sweep.run().unwrap_err(), FairShareError::InvalidQuantum);
    }
}
