use serde::Serialize;
use serde_json::Value;

use crate::api::params::{merge_patch, ParamError, ParamSet};
use crate::api::scenario::{Scenario, ScenarioConfig, StepContext};
use crate::api::types::{Halt, Phase, ScenarioKind, SimEvent, TickOutcome};
use crate::core::scheduler::{FrameHost, FrameScheduler};
use crate::core::time::FixedStep;

/// Read-only view of a simulation for renderers.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a, T: Serialize> {
    pub kind: ScenarioKind,
    pub phase: Phase,
    pub tick: u64,
    pub elapsed: f64,
    pub state: &'a T,
}

/// One scenario instance: its parameters, state, clock and frame registration.
///
/// State only changes inside [`Simulation::step`], which runs the scenario's
/// integrator and then its event detector, and only while the phase is Running.
pub struct Simulation<S: Scenario> {
    scenario: S,
    params: S::Params,
    state: S::State,
    phase: Phase,
    config: ScenarioConfig,
    clock: FixedStep,
    scheduler: FrameScheduler,
    /// Events since the host last drained them.
    events: Vec<SimEvent>,
}

impl<S: Scenario> Simulation<S> {
    pub fn new(scenario: S, params: S::Params) -> Self {
        let config = scenario.config();
        let state = scenario.initial_state(&params);
        Self {
            scenario,
            params,
            state,
            phase: Phase::Idle,
            config,
            clock: FixedStep::new(config.fixed_dt),
            scheduler: FrameScheduler::new(),
            events: Vec::new(),
        }
    }

    /// Build with the scenario's default parameter set.
    pub fn with_defaults(scenario: S) -> Self {
        Self::new(scenario, S::Params::default())
    }

    // -- Lifecycle --

    /// Begin ticking. No-op when already running or terminal.
    pub fn start(&mut self, host: &mut dyn FrameHost) -> bool {
        match self.phase {
            Phase::Running => false,
            Phase::Terminal(halt) => {
                log::debug!("{}: start ignored, halted ({:?}); reset first", S::KIND, halt);
                false
            }
            Phase::Idle | Phase::Paused => {
                self.scheduler.start(host);
                self.phase = Phase::Running;
                self.emit(SimEvent::STARTED, 0.0, 0.0);
                log::info!("{}: running from tick {}", S::KIND, self.clock.ticks());
                true
            }
        }
    }

    /// Pause ticking and cancel the pending frame. Idempotent.
    pub fn stop(&mut self, host: &mut dyn FrameHost) {
        self.scheduler.stop(host);
        if self.phase.is_running() {
            self.phase = Phase::Paused;
            self.emit(SimEvent::PAUSED, 0.0, 0.0);
            log::info!("{}: paused at tick {}", S::KIND, self.clock.ticks());
        }
    }

    /// Stop, then return to the default state derived from the current parameters.
    pub fn reset(&mut self, host: &mut dyn FrameHost) {
        self.scheduler.stop(host);
        self.scenario.on_reset();
        self.state = self.scenario.initial_state(&self.params);
        self.clock.reset();
        self.phase = Phase::Idle;
        self.emit(SimEvent::RESET, 0.0, 0.0);
        log::info!("{}: reset", S::KIND);
    }

    /// Frame callback: run one tick, then re-register while still running.
    pub fn on_frame(&mut self, host: &mut dyn FrameHost) -> TickOutcome {
        if !self.scheduler.begin_frame() {
            return TickOutcome::Skipped;
        }
        let outcome = self.step();
        if self.phase.is_running() {
            self.scheduler.end_frame(host);
        } else {
            self.scheduler.stop(host);
        }
        outcome
    }

    /// Run one fixed-`dt` tick: integrate, then detect events.
    /// Does nothing unless the phase is Running.
    pub fn step(&mut self) -> TickOutcome {
        if !self.phase.is_running() {
            return TickOutcome::Skipped;
        }
        // Parameters are read once per tick; edits land between ticks.
        let params = &self.params;
        if self.scenario.degenerate(params, &self.state) {
            log::warn!("{}: degenerate parameters, halting", S::KIND);
            return self.halt(Halt::Degenerate);
        }

        let mut next = self.scenario.integrate(&self.state, params, self.clock.dt());
        let tick = self.clock.advance();
        let queued = self.events.len();
        let mut ctx = StepContext::new(tick, self.clock.elapsed(), &mut self.events);
        let halt = self.scenario.detect(&mut next, params, &mut ctx);

        if !self.scenario.is_finite(&next) {
            // The step is discarded, and so are the events it raised.
            self.events.truncate(queued);
            log::warn!("{}: non-finite state at tick {}, halting", S::KIND, tick);
            return self.halt(Halt::Degenerate);
        }
        self.state = next;

        match halt {
            Some(halt) => self.halt(halt),
            None => TickOutcome::Advanced,
        }
    }

    /// Step up to `ticks` times, stopping early on a halt or when not running.
    pub fn advance(&mut self, ticks: u64) -> TickOutcome {
        let mut outcome = TickOutcome::Skipped;
        for _ in 0..ticks {
            outcome = self.step();
            if outcome != TickOutcome::Advanced {
                break;
            }
        }
        outcome
    }

    fn halt(&mut self, halt: Halt) -> TickOutcome {
        self.phase = Phase::Terminal(halt);
        self.emit(SimEvent::TERMINAL, halt.code() as f32, self.clock.ticks() as f32);
        log::debug!("{}: halted ({:?}) at tick {}", S::KIND, halt, self.clock.ticks());
        TickOutcome::Halted(halt)
    }

    fn emit(&mut self, kind: f32, a: f32, b: f32) {
        self.events.push(SimEvent::new(kind, a, b, 0.0));
    }

    // -- Parameters --

    /// Replace the whole parameter set; effective from the next tick.
    /// While Idle the initial state is re-derived from the new parameters.
    pub fn set_params(&mut self, params: S::Params) -> Result<(), ParamError> {
        if let Err(err) = params.validate() {
            log::warn!("{}: rejected parameters: {}", S::KIND, err);
            return Err(err);
        }
        self.params = params;
        if self.phase == Phase::Idle {
            self.state = self.scenario.initial_state(&self.params);
        }
        log::debug!("{}: parameters replaced", S::KIND);
        Ok(())
    }

    /// Merge a JSON object of field updates over the current parameters.
    pub fn patch_params(&mut self, patch: &Value) -> Result<(), ParamError> {
        let next = merge_patch(&self.params, patch)?;
        self.set_params(next)
    }

    /// Edit a copy of the parameters and commit it atomically.
    pub fn update_params(&mut self, edit: impl FnOnce(&mut S::Params)) -> Result<(), ParamError> {
        let mut next = self.params.clone();
        edit(&mut next);
        self.set_params(next)
    }

    // -- Read-only accessors --

    pub fn kind(&self) -> ScenarioKind {
        S::KIND
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_running()
    }

    pub fn params(&self) -> &S::Params {
        &self.params
    }

    pub fn state(&self) -> &S::State {
        &self.state
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn snapshot(&self) -> Snapshot<'_, S::State> {
        Snapshot {
            kind: S::KIND,
            phase: self.phase,
            tick: self.clock.ticks(),
            elapsed: self.clock.elapsed(),
            state: &self.state,
        }
    }

    pub fn metrics(&self) -> S::Metrics {
        self.scenario.metrics(&self.state, &self.params)
    }

    /// Take all events emitted since the previous drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::params::ParamSpec;
    use crate::core::scheduler::ManualHost;
    use serde::Deserialize;
    use serde_json::json;

    /// Constant-velocity counter that stops at `limit`.
    struct Counter;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct CounterParams {
        start: f64,
        rate: f64,
        limit: f64,
    }

    impl Default for CounterParams {
        fn default() -> Self {
            Self { start: 0.0, rate: 1.0, limit: 10.0 }
        }
    }

    impl ParamSet for CounterParams {
        fn fields(&self) -> Vec<(&'static str, f64)> {
            vec![("start", self.start), ("rate", self.rate), ("limit", self.limit)]
        }

        fn specs() -> &'static [ParamSpec] {
            &[]
        }
    }

    impl Scenario for Counter {
        type Params = CounterParams;
        type State = f64;
        type Metrics = f64;

        const KIND: ScenarioKind = ScenarioKind::Ramp;

        fn config(&self) -> ScenarioConfig {
            ScenarioConfig { fixed_dt: 1.0, ..ScenarioConfig::default() }
        }

        fn initial_state(&self, params: &CounterParams) -> f64 {
            params.start
        }

        fn degenerate(&self, params: &CounterParams, _state: &f64) -> bool {
            params.rate == 0.0
        }

        fn integrate(&self, state: &f64, params: &CounterParams, dt: f64) -> f64 {
            state + params.rate * dt
        }

        fn detect(&mut self, state: &mut f64, params: &CounterParams, ctx: &mut StepContext) -> Option<Halt> {
            if *state > params.limit {
                ctx.emit(SimEvent::new(SimEvent::WALL_BOUNCE, 0.0, *state as f32, 0.0));
            }
            (*state >= params.limit).then_some(Halt::ReachedEnd)
        }

        fn is_finite(&self, state: &f64) -> bool {
            state.is_finite()
        }

        fn metrics(&self, state: &f64, params: &CounterParams) -> f64 {
            state * params.rate
        }
    }

    fn running() -> (Simulation<Counter>, ManualHost) {
        let mut host = ManualHost::new();
        let mut sim = Simulation::with_defaults(Counter);
        assert!(sim.start(&mut host));
        (sim, host)
    }

    #[test]
    fn idle_does_not_step() {
        let mut sim = Simulation::with_defaults(Counter);
        assert_eq!(sim.step(), TickOutcome::Skipped);
        assert_eq!(*sim.state(), 0.0);
        assert_eq!(sim.phase(), Phase::Idle);
    }

    #[test]
    fn frames_drive_ticks_until_halt() {
        let (mut sim, mut host) = running();
        let delivered = host.pump(100, |host| {
            sim.on_frame(host);
        });
        assert_eq!(delivered, 10);
        assert_eq!(sim.phase(), Phase::Terminal(Halt::ReachedEnd));
        assert!(host.pending().is_empty(), "halt must not re-register");
    }

    #[test]
    fn paused_state_never_mutates() {
        let (mut sim, mut host) = running();
        sim.step();
        sim.stop(&mut host);
        let frozen = *sim.state();
        assert_eq!(sim.step(), TickOutcome::Skipped);
        assert_eq!(sim.on_frame(&mut host), TickOutcome::Skipped);
        assert_eq!(*sim.state(), frozen);
        assert_eq!(sim.phase(), Phase::Paused);
    }

    #[test]
    fn stop_cancels_the_pending_frame() {
        let (mut sim, mut host) = running();
        assert_eq!(host.pending().len(), 1);
        sim.stop(&mut host);
        assert!(host.pending().is_empty());
        sim.stop(&mut host);
        assert_eq!(host.cancelled(), 1);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let (mut sim, mut host) = running();
        assert!(!sim.start(&mut host));
        assert_eq!(host.pending().len(), 1);
    }

    #[test]
    fn paused_resumes() {
        let (mut sim, mut host) = running();
        sim.step();
        sim.stop(&mut host);
        assert!(sim.start(&mut host));
        sim.step();
        assert_eq!(*sim.state(), 2.0);
    }

    #[test]
    fn terminal_refuses_start_until_reset() {
        let (mut sim, mut host) = running();
        assert_eq!(sim.advance(50), TickOutcome::Halted(Halt::ReachedEnd));
        assert!(!sim.start(&mut host));
        sim.reset(&mut host);
        assert_eq!(sim.phase(), Phase::Idle);
        assert!(sim.start(&mut host));
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut sim, mut host) = running();
        sim.advance(4);
        sim.reset(&mut host);
        let once = (*sim.state(), sim.tick(), sim.phase());
        sim.reset(&mut host);
        assert_eq!((*sim.state(), sim.tick(), sim.phase()), once);
        assert_eq!(once, (0.0, 0, Phase::Idle));
    }

    #[test]
    fn idle_param_edit_rederives_state() {
        let mut sim = Simulation::with_defaults(Counter);
        sim.patch_params(&json!({ "start": 3.0 })).unwrap();
        assert_eq!(*sim.state(), 3.0);
    }

    #[test]
    fn running_param_edit_applies_next_tick_only() {
        let (mut sim, _host) = running();
        sim.step();
        sim.update_params(|p| p.rate = 5.0).unwrap();
        assert_eq!(*sim.state(), 1.0);
        sim.step();
        assert_eq!(*sim.state(), 6.0);
    }

    #[test]
    fn rejected_params_leave_old_set() {
        let mut sim = Simulation::with_defaults(Counter);
        let err = sim.update_params(|p| p.rate = f64::INFINITY).unwrap_err();
        assert!(matches!(err, ParamError::NotFinite { name: "rate", .. }));
        assert_eq!(sim.params().rate, 1.0);
    }

    #[test]
    fn degenerate_params_halt() {
        let (mut sim, _host) = running();
        sim.update_params(|p| p.rate = 0.0).unwrap();
        assert_eq!(sim.step(), TickOutcome::Halted(Halt::Degenerate));
        assert_eq!(*sim.state(), 0.0);
    }

    #[test]
    fn events_follow_transitions() {
        let (mut sim, mut host) = running();
        sim.advance(20);
        sim.reset(&mut host);
        let kinds: Vec<f32> = sim.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![SimEvent::STARTED, SimEvent::TERMINAL, SimEvent::RESET]);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn overflowing_step_drops_its_events() {
        let mut host = ManualHost::new();
        let params = CounterParams { start: f64::MAX, rate: f64::MAX, limit: 1.0 };
        let mut sim = Simulation::new(Counter, params);
        sim.start(&mut host);
        assert_eq!(sim.step(), TickOutcome::Halted(Halt::Degenerate));
        assert_eq!(*sim.state(), f64::MAX);
        let kinds: Vec<f32> = sim.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![SimEvent::STARTED, SimEvent::TERMINAL]);
    }

    #[test]
    fn snapshot_serializes() {
        let (mut sim, _host) = running();
        sim.step();
        let json = serde_json::to_value(sim.snapshot()).unwrap();
        assert_eq!(json["phase"], "running");
        assert_eq!(json["tick"], 1);
        assert_eq!(json["state"], 1.0);
    }
}
