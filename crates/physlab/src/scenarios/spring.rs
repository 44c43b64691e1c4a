//! Damped mass on a spring.

use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::Scenario;
use crate::api::types::ScenarioKind;
use crate::scenarios::{oscillation_period, MIN_DENOMINATOR};

const SPECS: [ParamSpec; 3] = [
    ParamSpec::new("stiffness", "Spring Constant (k)", 1.0, 10.0, 0.5, "N/m"),
    ParamSpec::new("mass", "Mass", 1.0, 10.0, 0.5, "kg"),
    ParamSpec::new("damping", "Damping", 0.0, 2.0, 0.1, "N·s/m"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpringParams {
    /// Spring constant `k`.
    pub stiffness: f64,
    pub mass: f64,
    /// Viscous damping coefficient `c`.
    pub damping: f64,
    /// Displacement from equilibrium at release.
    pub initial_displacement: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self { stiffness: 5.0, mass: 2.0, damping: 0.5, initial_displacement: 1.5 }
    }
}

impl ParamSet for SpringParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("stiffness", self.stiffness),
            ("mass", self.mass),
            ("damping", self.damping),
            ("initial_displacement", self.initial_displacement),
        ]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SpringState {
    /// Displacement from equilibrium, positive downwards.
    pub y: f64,
    pub v: f64,
}

impl SpringState {
    pub fn potential_energy(&self, params: &SpringParams) -> f64 {
        0.5 * params.stiffness * self.y * self.y
    }

    pub fn kinetic_energy(&self, params: &SpringParams) -> f64 {
        0.5 * params.mass * self.v * self.v
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpringMetrics {
    pub displacement: f64,
    pub velocity: f64,
    pub potential: f64,
    pub kinetic: f64,
    pub total: f64,
    /// Undamped natural period `2π·sqrt(m/k)`.
    pub period: Option<f64>,
}

pub struct Spring;

impl Scenario for Spring {
    type Params = SpringParams;
    type State = SpringState;
    type Metrics = SpringMetrics;

    const KIND: ScenarioKind = ScenarioKind::Spring;

    fn initial_state(&self, params: &SpringParams) -> SpringState {
        SpringState { y: params.initial_displacement, v: 0.0 }
    }

    fn degenerate(&self, params: &SpringParams, _state: &SpringState) -> bool {
        params.mass <= MIN_DENOMINATOR
    }

    // Semi-implicit: the new velocity moves the mass.
    fn integrate(&self, state: &SpringState, params: &SpringParams, dt: f64) -> SpringState {
        let force = -params.stiffness * state.y - params.damping * state.v;
        let v = state.v + force / params.mass * dt;
        SpringState { y: state.y + v * dt, v }
    }

    fn is_finite(&self, state: &SpringState) -> bool {
        state.y.is_finite() && state.v.is_finite()
    }

    fn metrics(&self, state: &SpringState, params: &SpringParams) -> SpringMetrics {
        let potential = state.potential_energy(params);
        let kinetic = state.kinetic_energy(params);
        SpringMetrics {
            displacement: state.y,
            velocity: state.v,
            potential,
            kinetic,
            total: potential + kinetic,
            period: oscillation_period(params.mass, params.stiffness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Halt, Phase, TickOutcome};
    use crate::core::scheduler::ManualHost;
    use crate::core::simulation::Simulation;

    fn started(params: SpringParams) -> Simulation<Spring> {
        let mut host = ManualHost::new();
        let mut sim = Simulation::new(Spring, params);
        sim.start(&mut host);
        sim
    }

    #[test]
    fn released_from_initial_displacement() {
        let sim = Simulation::with_defaults(Spring);
        assert_eq!(*sim.state(), SpringState { y: 1.5, v: 0.0 });
        let m = sim.metrics();
        assert!((m.potential - 5.625).abs() < 1e-12);
        assert_eq!(m.kinetic, 0.0);
    }

    #[test]
    fn damped_energy_never_increases() {
        let mut sim = started(SpringParams::default());
        let mut prev = sim.metrics().total;
        for _ in 0..3_000 {
            sim.step();
            let total = sim.metrics().total;
            assert!(total <= prev + 1e-12, "energy rose from {prev} to {total}");
            prev = total;
        }
        assert!(prev < 0.05 * 5.625);
    }

    #[test]
    fn undamped_energy_is_bounded() {
        let mut sim = started(SpringParams { damping: 0.0, ..SpringParams::default() });
        let initial = sim.metrics().total;
        for _ in 0..24_000 {
            sim.step();
            let drift = (sim.metrics().total - initial).abs() / initial;
            assert!(drift < 0.03, "energy drifted {drift}");
        }
    }

    #[test]
    fn runs_indefinitely() {
        let mut sim = started(SpringParams::default());
        assert_eq!(sim.advance(100_000), TickOutcome::Advanced);
        assert_eq!(sim.phase(), Phase::Running);
    }

    #[test]
    fn period_from_mass_and_stiffness() {
        let period = Simulation::with_defaults(Spring).metrics().period.unwrap();
        assert!((period - std::f64::consts::TAU * (0.4f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn zero_mass_halts_instead_of_blowing_up() {
        let mut sim = started(SpringParams { mass: 0.0, ..SpringParams::default() });
        assert_eq!(sim.step(), TickOutcome::Halted(Halt::Degenerate));
        assert_eq!(sim.state().y, 1.5);
    }

    #[test]
    fn idle_edit_moves_release_point() {
        let mut sim = Simulation::with_defaults(Spring);
        sim.update_params(|p| p.initial_displacement = -0.5).unwrap();
        assert_eq!(sim.state().y, -0.5);
    }
}
