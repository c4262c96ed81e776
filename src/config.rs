//! Simulation configuration.
//!
//! Everything a run needs besides the workload itself: the global quantum
//! and the policy used to label processes with groups before the engine
//! sees them.

use crate::engine::FairShareEngine;
use crate::error::{FairShareError, FairShareResult};

// ── Group assignment ──────────────────────────────────────────────────

/// How processes read from a workload get their group id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupAssignment {
    /// Uniform draw in `1..=groups` from a seeded RNG, in file order.
    Random { groups: u64, seed: u64 },
    /// `1, 2, …, groups, 1, 2, …` in file order.
    RoundRobin { groups: u64 },
    /// Take the group from the optional fourth column of each line.
    FromInput,
}

impl GroupAssignment {
    /// Seeded random labelling.
    pub fn random(groups: u64, seed: u64) -> Self {
        GroupAssignment::Random { groups, seed }
    }

    /// Deterministic cyclic labelling.
    pub fn round_robin(groups: u64) -> Self {
        GroupAssignment::RoundRobin { groups }
    }

    pub fn validate(&self) -> FairShareResult<()> {
        match self {
            GroupAssignment::Random { groups, .. } | GroupAssignment::RoundRobin { groups }
                if *groups == 0 =>
            {
                Err(FairShareError::InvalidGroupCount)
            }
            _ => Ok(()),
        }
    }
}

impl Default for GroupAssignment {
    fn default() -> Self {
        GroupAssignment::FromInput
    }
}

// ── Simulation config ─────────────────────────────────────────────────

/// Configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Global CPU quantum shared by the active groups each turn.
    pub quantum: u64,
    pub assignment: GroupAssignment,
}

impl SimulationConfig {
    pub fn new(quantum: u64, assignment: GroupAssignment) -> Self {
        SimulationConfig {
            quantum,
            assignment,
        }
    }

    /// Reject a zero quantum or a zero group count.
    pub fn validate(&self) -> FairShareResult<()> {
        if self.quantum == 0 {
            return Err(FairShareError::InvalidQuantum);
        }
        self.assignment.validate()
    }

    /// Validate and build an empty engine for this configuration.
    pub fn engine(&self) -> FairShareResult<FairShareEngine> {
        self.validate()?;
        FairShareEngine::new(self.quantum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantum() {
        let cfg = SimulationConfig::new(0, GroupAssignment::FromInput);
        assert_eq!(cfg.validate(), Err(FairShareError::InvalidQuantum));
        assert!(cfg.engine().is_err());
    }

    #[test]
    fn test_validate_group_count() {
        for assignment in [GroupAssignment::random(0, 1), GroupAssignment::round_robin(0)] {
            let cfg = SimulationConfig::new(4, assignment);
            assert_eq!(cfg.validate(), Err(FairShareError::InvalidGroupCount));
        }
    }

    #[test]
    fn test_valid_config_builds_engine() {
        let cfg = SimulationConfig::new(6, GroupAssignment::random(3, 42));
        let engine = cfg.engine().unwrap();
        assert_eq!(engine.quantum(), 6);
        assert!(!engine.is_finished());
    }
}
