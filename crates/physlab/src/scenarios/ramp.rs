//! Block sliding down a rough incline.

use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::{Scenario, ScenarioConfig, StepContext};
use crate::api::types::{Halt, ScenarioKind};
use crate::scenarios::MIN_DENOMINATOR;

pub const RAMP_DT: f64 = 0.016;

const SPECS: [ParamSpec; 3] = [
    ParamSpec::new("angle", "Ramp Angle", 5.0, 60.0, 1.0, "°"),
    ParamSpec::new("mass", "Mass", 1.0, 50.0, 1.0, "kg"),
    ParamSpec::new("mu", "Friction Coeff (μ)", 0.0, 1.0, 0.05, ""),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RampParams {
    /// Incline angle in degrees.
    pub angle: f64,
    pub mass: f64,
    /// Kinetic friction coefficient.
    pub mu: f64,
    pub g: f64,
    /// Distance along the incline before the block leaves it.
    pub length: f64,
}

impl Default for RampParams {
    fn default() -> Self {
        Self { angle: 30.0, mass: 5.0, mu: 0.2, g: 9.8, length: 600.0 }
    }
}

impl ParamSet for RampParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("angle", self.angle),
            ("mass", self.mass),
            ("mu", self.mu),
            ("g", self.g),
            ("length", self.length),
        ]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

/// Force decomposition along the incline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RampForces {
    /// Gravity component along the slope, `m·g·sinθ`.
    pub parallel: f64,
    /// Normal reaction, `m·g·cosθ`.
    pub normal: f64,
    /// Friction magnitude, `μ·N`.
    pub friction: f64,
    /// Driving force, never negative: friction cannot push the block uphill.
    pub net: f64,
}

impl RampParams {
    pub fn forces(&self) -> RampForces {
        let rad = self.angle.to_radians();
        let parallel = self.mass * self.g * rad.sin();
        let normal = self.mass * self.g * rad.cos();
        let friction = self.mu * normal;
        RampForces {
            parallel,
            normal,
            friction,
            net: (parallel - friction).max(0.0),
        }
    }

    pub fn acceleration(&self) -> f64 {
        if self.mass <= MIN_DENOMINATOR {
            return 0.0;
        }
        self.forces().net / self.mass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RampState {
    /// Distance travelled along the incline.
    pub x: f64,
    pub v: f64,
    pub t: f64,
    /// Set once the block reaches the end of the ramp.
    pub at_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RampMetrics {
    pub velocity: f64,
    pub distance: f64,
    pub elapsed: f64,
    pub acceleration: f64,
    pub forces: RampForces,
}

pub struct Ramp;

impl Scenario for Ramp {
    type Params = RampParams;
    type State = RampState;
    type Metrics = RampMetrics;

    const KIND: ScenarioKind = ScenarioKind::Ramp;

    fn config(&self) -> ScenarioConfig {
        ScenarioConfig { fixed_dt: RAMP_DT, ..ScenarioConfig::default() }
    }

    fn initial_state(&self, _params: &RampParams) -> RampState {
        RampState::default()
    }

    fn degenerate(&self, params: &RampParams, _state: &RampState) -> bool {
        params.mass <= MIN_DENOMINATOR
    }

    fn integrate(&self, state: &RampState, params: &RampParams, dt: f64) -> RampState {
        let a = params.acceleration();
        RampState {
            x: state.x + state.v * dt + 0.5 * a * dt * dt,
            v: state.v + a * dt,
            t: state.t + dt,
            at_end: state.at_end,
        }
    }

    fn detect(&mut self, state: &mut RampState, params: &RampParams, _ctx: &mut StepContext) -> Option<Halt> {
        if state.x > params.length {
            state.x = params.length;
            state.at_end = true;
            return Some(Halt::ReachedEnd);
        }
        None
    }

    fn is_finite(&self, state: &RampState) -> bool {
        state.x.is_finite() && state.v.is_finite() && state.t.is_finite()
    }

    fn metrics(&self, state: &RampState, params: &RampParams) -> RampMetrics {
        RampMetrics {
            velocity: state.v,
            distance: state.x,
            elapsed: state.t,
            acceleration: params.acceleration(),
            forces: params.forces(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Phase, TickOutcome};
    use crate::core::scheduler::ManualHost;
    use crate::core::simulation::Simulation;

    fn started(params: RampParams) -> Simulation<Ramp> {
        let mut host = ManualHost::new();
        let mut sim = Simulation::new(Ramp, params);
        sim.start(&mut host);
        sim
    }

    #[test]
    fn acceleration_matches_incline_formula() {
        let p = RampParams::default();
        let rad = 30f64.to_radians();
        let expected = 9.8 * (rad.sin() - 0.2 * rad.cos());
        assert!((p.acceleration() - expected).abs() < 1e-12);
    }

    #[test]
    fn static_friction_holds_block_in_place() {
        // tan(10°) ≈ 0.176 < 0.5
        let mut sim = started(RampParams { angle: 10.0, mu: 0.5, ..RampParams::default() });
        assert_eq!(sim.advance(1_000), TickOutcome::Advanced);
        assert_eq!(sim.state().x, 0.0);
        assert_eq!(sim.state().v, 0.0);
        assert_eq!(sim.metrics().forces.net, 0.0);
        assert!(sim.is_running());
    }

    #[test]
    fn block_stops_at_ramp_end() {
        let mut sim = started(RampParams { length: 5.0, ..RampParams::default() });
        let outcome = sim.advance(10_000);
        assert_eq!(outcome, TickOutcome::Halted(Halt::ReachedEnd));
        assert_eq!(sim.state().x, 5.0);
        assert!(sim.state().at_end);
        assert_eq!(sim.phase(), Phase::Terminal(Halt::ReachedEnd));
    }

    #[test]
    fn distance_follows_constant_acceleration() {
        let mut sim = started(RampParams::default());
        sim.advance(125); // 2 s
        let a = RampParams::default().acceleration();
        let t = sim.state().t;
        assert!((t - 2.0).abs() < 1e-9);
        assert!((sim.state().x - 0.5 * a * t * t).abs() < 1e-9);
    }

    #[test]
    fn steeper_ramp_goes_faster() {
        let shallow = RampParams { angle: 20.0, ..RampParams::default() };
        let steep = RampParams { angle: 50.0, ..RampParams::default() };
        assert!(steep.acceleration() > shallow.acceleration());
    }

    #[test]
    fn zero_mass_is_degenerate() {
        let mut sim = started(RampParams { mass: 0.0, ..RampParams::default() });
        assert_eq!(sim.step(), TickOutcome::Halted(Halt::Degenerate));
    }
}
