use std::fmt::Debug;

use serde::Serialize;

use crate::api::params::ParamSet;
use crate::api::types::{Halt, ScenarioKind, SimEvent};

/// Default nominal timestep (one display refresh at 60 Hz).
pub const DEFAULT_FIXED_DT: f64 = 1.0 / 60.0;
/// Default number of retained trail samples.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
/// Default trail sampling cadence, in ticks.
pub const DEFAULT_HISTORY_INTERVAL: u64 = 5;

/// Stepping configuration, provided by the scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioConfig {
    /// Nominal timestep in seconds, supplied to every tick regardless of wall time.
    pub fixed_dt: f64,
    /// Maximum number of trail samples kept (scenarios without a trail ignore it).
    pub history_capacity: usize,
    /// A trail sample is taken every `history_interval` ticks.
    pub history_interval: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            fixed_dt: DEFAULT_FIXED_DT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_interval: DEFAULT_HISTORY_INTERVAL,
        }
    }
}

/// Per-tick information handed to the event detector.
pub struct StepContext<'a> {
    /// Index of the tick just integrated (first tick is 1).
    pub tick: u64,
    /// Simulated time after this tick.
    pub elapsed: f64,
    events: &'a mut Vec<SimEvent>,
}

impl<'a> StepContext<'a> {
    pub fn new(tick: u64, elapsed: f64, events: &'a mut Vec<SimEvent>) -> Self {
        Self { tick, elapsed, events }
    }

    /// Forward an event to the host.
    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// True on every `interval`-th tick. A zero interval never samples.
    pub fn every(&self, interval: u64) -> bool {
        interval > 0 && self.tick % interval == 0
    }
}

/// The contract every simulated system fulfils.
///
/// One implementation per [`ScenarioKind`]. The integrator is a pure function of
/// `(state, params, dt)`; the event detector runs once after it on the new state.
pub trait Scenario {
    type Params: ParamSet;
    type State: Clone + Debug + Serialize;
    type Metrics: Debug + Serialize;

    const KIND: ScenarioKind;

    /// Return stepping configuration. Called once when the simulation is built.
    fn config(&self) -> ScenarioConfig {
        ScenarioConfig::default()
    }

    /// State at activation and after every reset.
    fn initial_state(&self, params: &Self::Params) -> Self::State;

    /// True when a denominator of the law has collapsed for these inputs.
    fn degenerate(&self, _params: &Self::Params, _state: &Self::State) -> bool {
        false
    }

    /// Advance the state by one fixed step.
    fn integrate(&self, state: &Self::State, params: &Self::Params, dt: f64) -> Self::State;

    /// Post-step boundary, impact and collision handling.
    fn detect(
        &mut self,
        _state: &mut Self::State,
        _params: &Self::Params,
        _ctx: &mut StepContext,
    ) -> Option<Halt> {
        None
    }

    /// Clear auxiliary data (trails) when the simulation resets.
    fn on_reset(&mut self) {}

    /// Whether every kinematic quantity is finite.
    fn is_finite(&self, state: &Self::State) -> bool;

    /// Display quantities, recomputed from scratch on every call.
    fn metrics(&self, state: &Self::State, params: &Self::Params) -> Self::Metrics;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_samples_on_multiples() {
        let mut events = Vec::new();
        let ctx = StepContext::new(10, 1.0, &mut events);
        assert!(ctx.every(5));
        assert!(!ctx.every(3));
        assert!(!ctx.every(0));
    }

    #[test]
    fn emit_collects_events() {
        let mut events = Vec::new();
        let mut ctx = StepContext::new(1, 0.1, &mut events);
        ctx.emit(SimEvent::new(SimEvent::COLLISION, 1.0, 2.0, 0.0));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn default_config_runs_at_sixty_hz() {
        let config = ScenarioConfig::default();
        assert!((config.fixed_dt - 1.0 / 60.0).abs() < 1e-15);
        assert_eq!(config.history_capacity, 100);
    }
}
