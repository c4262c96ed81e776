//! Step-by-step scheduling API for external interfaces.
//!
//! Wraps an engine with turn-level control, state inspection and JSON
//! export. This is what the CLI's `--json` mode and the WASM binding sit
//! on. With the `serialize` feature JSON goes through `serde_json`;
//! without it the same documents are built by hand.

use crate::config::SimulationConfig;
use crate::engine::{FairShareEngine, TurnReport};
use crate::error::FairShareResult;
use crate::workload;

// ── StepResult ────────────────────────────────────────────────────────

/// Result of a single group turn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StepResult {
    /// 1-based turn number.
    pub turn: u64,
    pub group: u64,
    pub started_at: u64,
    pub ended_at: u64,
    pub process_quantum: u64,
    /// Processes that finished during the turn.
    pub completed: Vec<u64>,
    /// Short human-readable summary of the turn.
    pub description: String,
}

impl From<&TurnReport> for StepResult {
    fn from(report: &TurnReport) -> Self {
        StepResult {
            turn: report.turn,
            group: report.group.raw(),
            started_at: report.started_at.ticks(),
            ended_at: report.ended_at.ticks(),
            process_quantum: report.process_quantum,
            completed: report.completed.iter().map(|p| p.raw()).collect(),
            description: describe_turn(report),
        }
    }
}

// ── SchedulerApi ──────────────────────────────────────────────────────

/// High-level API wrapping an engine for external consumption.
#[derive(Debug, Clone)]
pub struct SchedulerApi {
    engine: FairShareEngine,
}

impl SchedulerApi {
    /// Wrap an engine, typically one that is loaded but not yet run.
    pub fn new(engine: FairShareEngine) -> Self {
        SchedulerApi { engine }
    }

    /// Parse workload text under `config` and load it into a fresh engine.
    pub fn from_workload(text: &str, config: &SimulationConfig) -> FairShareResult<Self> {
        let mut engine = config.engine()?;
        engine.load(workload::parse_processes(text, &config.assignment)?);
        Ok(SchedulerApi { engine })
    }

    /// Execute one turn. Returns `None` once the simulation has finished.
    pub fn step(&mut self) -> Option<StepResult> {
        self.engine.step().as_ref().map(StepResult::from)
    }

    /// Run to completion. Returns the number of turns executed.
    pub fn run(&mut self) -> u64 {
        self.engine.run()
    }

    /// Run up to `n` turns. Returns the number actually executed.
    pub fn run_steps(&mut self, n: u64) -> u64 {
        self.engine.run_for(n)
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    /// Current virtual time in ticks.
    pub fn current_time(&self) -> u64 {
        self.engine.current_time().ticks()
    }

    pub fn turns_executed(&self) -> u64 {
        self.engine.turns_executed()
    }

    /// Access the underlying engine.
    pub fn engine(&self) -> &FairShareEngine {
        &self.engine
    }

    /// Fork: an independent copy that can be stepped separately.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    // ── JSON Export ───────────────────────────────────────────

    /// Export the scheduler state as a JSON string.
    #[cfg(feature = "serialize")]
    pub fn state_json(&self) -> String {
        #[derive(serde::Serialize)]
        struct ReadyQueue {
            group: u64,
            ready: usize,
        }

        #[derive(serde::Serialize)]
        struct ApiState {
            current_time: u64,
            quantum: u64,
            turns_executed: u64,
            rotation: Vec<u64>,
            ready: Vec<ReadyQueue>,
            pending: usize,
            completed: usize,
            is_finished: bool,
        }

        let e = &self.engine;
        let state = ApiState {
            current_time: e.current_time().ticks(),
            quantum: e.quantum(),
            turns_executed: e.turns_executed(),
            rotation: e.rotation().map(|g| g.raw()).collect(),
            ready: e
                .known_groups()
                .map(|g| ReadyQueue {
                    group: g.raw(),
                    ready: e.ready_count(g),
                })
                .collect(),
            pending: e.pending_count(),
            completed: e.completed().len(),
            is_finished: e.is_finished(),
        };

        serde_json::to_string_pretty(&state).unwrap_or_else(|_| "{}".into())
    }

    /// Export the scheduler state as a JSON string.
    #[cfg(not(feature = "serialize"))]
    pub fn state_json(&self) -> String {
        let e = &self.engine;
        let rotation: Vec<String> = e.rotation().map(|g| g.raw().to_string()).collect();
        let ready: Vec<String> = e
            .known_groups()
            .map(|g| format!("{{\"group\": {}, \"ready\": {}}}", g.raw(), e.ready_count(g)))
            .collect();

        let mut s = String::from("{\n");
        s.push_str(&format!(
            "  \"current_time\": {},\n  \"quantum\": {},\n  \"turns_executed\": {},\n",
            e.current_time().ticks(),
            e.quantum(),
            e.turns_executed()
        ));
        s.push_str(&format!("  \"rotation\": [{}],\n", rotation.join(", ")));
        s.push_str(&format!("  \"ready\": [{}],\n", ready.join(", ")));
        s.push_str(&format!(
            "  \"pending\": {},\n  \"completed\": {},\n  \"is_finished\": {}\n",
            e.pending_count(),
            e.completed().len(),
            e.is_finished()
        ));
        s.push('}');
        s
    }

    /// Export the execution timeline as a JSON array string.
    #[cfg(feature = "serialize")]
    pub fn timeline_json(&self) -> String {
        serde_json::to_string_pretty(self.engine.timeline().blocks())
            .unwrap_or_else(|_| "[]".into())
    }

    /// Export the execution timeline as a JSON array string.
    #[cfg(not(feature = "serialize"))]
    pub fn timeline_json(&self) -> String {
        let blocks = self.engine.timeline().blocks();
        let mut s = String::from("[\n");
        for (i, b) in blocks.iter().enumerate() {
            s.push_str(&format!(
                "  {{\"process\": {}, \"group\": {}, \"start\": {}, \"end\": {}}}",
                b.process.raw(),
                b.group.raw(),
                b.start.ticks(),
                b.end.ticks()
            ));
            if i + 1 < blocks.len() {
                s.push(',');
            }
            s.push('\n');
        }
        s.push(']');
        s
    }

    /// Export per-process metrics and averages as a JSON string.
    #[cfg(feature = "serialize")]
    pub fn metrics_json(&self) -> String {
        #[derive(serde::Serialize)]
        struct Metrics {
            processes: Vec<crate::process::ProcessMetrics>,
            summary: Option<crate::metrics::MetricsSummary>,
        }

        let metrics = Metrics {
            processes: self.engine.completed_metrics(),
            summary: self.engine.summary(),
        };
        serde_json::to_string_pretty(&metrics).unwrap_or_else(|_| "{}".into())
    }

    /// Export per-process metrics and averages as a JSON string.
    #[cfg(not(feature = "serialize"))]
    pub fn metrics_json(&self) -> String {
        let rows: Vec<String> = self
            .engine
            .completed_metrics()
            .iter()
            .map(|m| {
                format!(
                    "    {{\"id\": {}, \"group\": {}, \"arrival\": {}, \"burst\": {}, \
                     \"first_dispatch\": {}, \"completed_at\": {}, \"response\": {}, \
                     \"waiting\": {}, \"turnaround\": {}}}",
                    m.id.raw(),
                    m.group.raw(),
                    m.arrival.ticks(),
                    m.burst,
                    m.first_dispatch.ticks(),
                    m.completed_at.ticks(),
                    m.response,
                    m.waiting,
                    m.turnaround
                )
            })
            .collect();

        let summary = match self.engine.summary() {
            None => "null".to_string(),
            Some(summary) => {
                let groups: Vec<String> = summary
                    .per_group
                    .iter()
                    .map(|(g, avg)| format!("\"{}\": {}", g.raw(), averages_json(avg)))
                    .collect();
                format!(
                    "{{\"overall\": {}, \"per_group\": {{{}}}}}",
                    averages_json(&summary.overall),
                    groups.join(", ")
                )
            }
        };

        let mut s = String::from("{\n  \"processes\": [\n");
        s.push_str(&rows.join(",\n"));
        if !rows.is_empty() {
            s.push('\n');
        }
        s.push_str("  ],\n  \"summary\": ");
        s.push_str(&summary);
        s.push_str("\n}");
        s
    }

    /// Export a complete snapshot (state + timeline + metrics).
    #[cfg(feature = "serialize")]
    pub fn snapshot_json(&self) -> String {
        #[derive(serde::Serialize)]
        struct Snapshot {
            state: serde_json::Value,
            timeline: serde_json::Value,
            metrics: serde_json::Value,
        }

        let snap = Snapshot {
            state: serde_json::from_str(&self.state_json()).unwrap_or(serde_json::Value::Null),
            timeline: serde_json::from_str(&self.timeline_json())
                .unwrap_or(serde_json::Value::Null),
            metrics: serde_json::from_str(&self.metrics_json()).unwrap_or(serde_json::Value::Null),
        };

        serde_json::to_string_pretty(&snap).unwrap_or_else(|_| "{}".into())
    }

    /// Export a complete snapshot (state + timeline + metrics).
    #[cfg(not(feature = "serialize"))]
    pub fn snapshot_json(&self) -> String {
        let mut s = String::from("{\n");
        s.push_str("  \"state\": ");
        s.push_str(&self.state_json());
        s.push_str(",\n  \"timeline\": ");
        s.push_str(&self.timeline_json());
        s.push_str(",\n  \"metrics\": ");
        s.push_str(&self.metrics_json());
        s.push_str("\n}");
        s
    }
}

// ── Describe helpers ──────────────────────────────────────────────────

fn describe_turn(report: &TurnReport) -> String {
    let mut s = format!(
        "{} ran {} process(es) at {} each [{}, {})",
        report.group,
        report.dispatched,
        report.process_quantum,
        report.started_at.ticks(),
        report.ended_at.ticks()
    );
    if !report.completed.is_empty() {
        let done: Vec<String> = report.completed.iter().map(|p| p.to_string()).collect();
        s.push_str(&format!("; completed {}", done.join(", ")));
    }
    s
}

#[cfg(not(feature = "serialize"))]
fn averages_json(avg: &crate::metrics::Averages) -> String {
    format!(
        "{{\"count\": {}, \"response\": {}, \"waiting\": {}, \"turnaround\": {}}}",
        avg.count, avg.response, avg.waiting, avg.turnaround
    )
}
