//! # Fairshare: Deterministic Fair Share CPU Scheduling Simulator
//!
//! Simulates a single CPU shared between groups of CPU-bound processes.
//! Groups take equal turns; within a turn the group's share is split
//! evenly across its ready processes. No threads, no wall-clock time:
//! the engine is a pure step machine driven by a virtual clock, so the
//! same workload and quantum always produce the same timeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  CLI / SchedulerApi / WASM    │ ← reports, JSON, Gantt chart
//! │  ┌────────────────────────┐  │
//! │  │    FairShareEngine      │  │ ← one group turn per step
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ Process          │  │  │ ← remaining time + metrics
//! │  │  └──────────────────┘  │  │
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ Timeline         │  │  │ ← append-only execution blocks
//! │  │  └──────────────────┘  │  │
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ VirtualTime      │  │  │ ← logical clock
//! │  │  └──────────────────┘  │  │
//! │  └────────────────────────┘  │
//! └──────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod gantt;
pub mod metrics;
pub mod process;
pub mod report;
pub mod rng;
pub mod time;
pub mod timeline;
pub mod verify;
pub mod workload;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience.
pub use api::{SchedulerApi, StepResult};
pub use config::{GroupAssignment, SimulationConfig};
pub use dsl::ScenarioBuilder;
pub use engine::{FairShareEngine, TurnReport};
pub use error::{FairShareError, FairShareResult};
pub use gantt::GanttChart;
pub use metrics::{Averages, MetricsSummary};
pub use process::{GroupId, Process, ProcessId, ProcessMetrics, ProcessState};
pub use time::VirtualTime;
pub use timeline::{ExecutionBlock, Timeline};
pub use verify::{NamedProperty, Property, QuantumSweep, Violation};
