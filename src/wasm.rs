#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::api::SchedulerApi;
use crate::config::{GroupAssignment, SimulationConfig};
use crate::dsl::{ScenarioBuilder, DEFAULT_QUANTUM};

/// WASM binding for the scheduler API.
///
/// Exposes [`SchedulerApi`] to JavaScript. Errors surface as thrown
/// strings.
#[wasm_bindgen]
pub struct FairShareSimulator {
    api: SchedulerApi,
}

#[wasm_bindgen]
impl FairShareSimulator {
    /// A small built-in scenario: three groups with staggered arrivals.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<FairShareSimulator, JsValue> {
        console_error_panic_hook::set_once();

        let engine = ScenarioBuilder::new()
            .quantum(DEFAULT_QUANTUM)
            .group(1, [(1, 0, 6), (2, 0, 3)])
            .group(2, [(3, 1, 5)])
            .group(3, [(4, 4, 2), (5, 9, 4)])
            .build()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(FairShareSimulator {
            api: SchedulerApi::new(engine),
        })
    }

    /// Load workload text (`pid arrival burst group` per line).
    #[wasm_bindgen(js_name = fromWorkload)]
    pub fn from_workload(text: &str, quantum: u32) -> Result<FairShareSimulator, JsValue> {
        console_error_panic_hook::set_once();

        let config = SimulationConfig::new(u64::from(quantum), GroupAssignment::FromInput);
        let api = SchedulerApi::from_workload(text, &config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(FairShareSimulator { api })
    }

    /// Execute one group turn.
    /// Returns a JSON string describing it, or null if finished.
    pub fn step(&mut self) -> Option<String> {
        let result = self.api.step()?;
        serde_json::to_string(&result).ok()
    }

    /// Run up to `n` turns.
    pub fn run_steps(&mut self, n: u32) -> u32 {
        self.api.run_steps(u64::from(n)) as u32
    }

    /// Run until completion.
    pub fn run_all(&mut self) -> u32 {
        self.api.run() as u32
    }

    pub fn state_json(&self) -> String {
        self.api.state_json()
    }

    pub fn timeline_json(&self) -> String {
        self.api.timeline_json()
    }

    pub fn metrics_json(&self) -> String {
        self.api.metrics_json()
    }

    pub fn is_finished(&self) -> bool {
        self.api.is_finished()
    }

    /// Current virtual time.
    pub fn current_time(&self) -> u32 {
        self.api.current_time() as u32
    }
}
