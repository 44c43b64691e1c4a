//! Simple pendulum with the full nonlinear restoring torque.

use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::Scenario;
use crate::api::types::ScenarioKind;
use crate::scenarios::{oscillation_period, MIN_DENOMINATOR};

/// Angular velocity is multiplied by this after every step.
pub const PENDULUM_DAMPING: f64 = 0.995;

const SPECS: [ParamSpec; 3] = [
    ParamSpec::new("length", "Length", 1.0, 3.0, 0.1, "m"),
    ParamSpec::new("mass", "Mass", 1.0, 10.0, 1.0, "kg"),
    ParamSpec::new("start_angle", "Start Angle", -90.0, 90.0, 5.0, "°"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PendulumParams {
    pub length: f64,
    pub mass: f64,
    /// Release angle in degrees from the vertical.
    pub start_angle: f64,
    pub g: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self { length: 2.0, mass: 2.0, start_angle: 45.0, g: 9.81 }
    }
}

impl ParamSet for PendulumParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("length", self.length),
            ("mass", self.mass),
            ("start_angle", self.start_angle),
            ("g", self.g),
        ]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PendulumState {
    /// Angle from the vertical in radians.
    pub theta: f64,
    pub omega: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendulumMetrics {
    pub angle_deg: f64,
    pub angular_velocity: f64,
    pub bob_speed: f64,
    /// `m·g·L·(1 − cos θ)`, zero at the bottom of the swing.
    pub potential: f64,
    pub kinetic: f64,
    /// Small-angle period `2π·sqrt(L/g)`.
    pub period: Option<f64>,
}

pub struct Pendulum;

impl Scenario for Pendulum {
    type Params = PendulumParams;
    type State = PendulumState;
    type Metrics = PendulumMetrics;

    const KIND: ScenarioKind = ScenarioKind::Pendulum;

    fn initial_state(&self, params: &PendulumParams) -> PendulumState {
        PendulumState { theta: params.start_angle.to_radians(), omega: 0.0 }
    }

    fn degenerate(&self, params: &PendulumParams, _state: &PendulumState) -> bool {
        params.length <= MIN_DENOMINATOR
    }

    fn integrate(&self, state: &PendulumState, params: &PendulumParams, dt: f64) -> PendulumState {
        let alpha = -(params.g / params.length) * state.theta.sin();
        let omega = state.omega + alpha * dt;
        PendulumState {
            theta: state.theta + omega * dt,
            omega: omega * PENDULUM_DAMPING,
        }
    }

    fn is_finite(&self, state: &PendulumState) -> bool {
        state.theta.is_finite() && state.omega.is_finite()
    }

    fn metrics(&self, state: &PendulumState, params: &PendulumParams) -> PendulumMetrics {
        let bob_speed = state.omega * params.length;
        PendulumMetrics {
            angle_deg: state.theta.to_degrees(),
            angular_velocity: state.omega,
            bob_speed,
            potential: params.mass * params.g * params.length * (1.0 - state.theta.cos()),
            kinetic: 0.5 * params.mass * bob_speed * bob_speed,
            period: oscillation_period(params.length, params.g),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Halt, TickOutcome};
    use crate::core::scheduler::ManualHost;
    use crate::core::simulation::Simulation;

    fn started(params: PendulumParams) -> Simulation<Pendulum> {
        let mut host = ManualHost::new();
        let mut sim = Simulation::new(Pendulum, params);
        sim.start(&mut host);
        sim
    }

    #[test]
    fn released_at_start_angle() {
        let sim = Simulation::with_defaults(Pendulum);
        assert!((sim.state().theta - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert_eq!(sim.state().omega, 0.0);
    }

    #[test]
    fn swing_decays() {
        let mut sim = started(PendulumParams::default());
        sim.advance(600);
        let angle = sim.metrics().angle_deg;
        assert!((angle + 9.69).abs() < 0.05, "angle after 10 s {angle}");
    }

    #[test]
    fn amplitude_shrinks_every_swing() {
        let mut sim = started(PendulumParams::default());
        let mut peaks = Vec::new();
        let mut prev = *sim.state();
        for _ in 0..3_000 {
            sim.step();
            let cur = *sim.state();
            // ω changes sign at a turning point
            if prev.omega != 0.0 && prev.omega.signum() != cur.omega.signum() {
                peaks.push(cur.theta.abs());
            }
            prev = cur;
        }
        assert!(peaks.len() > 4);
        assert!(peaks.windows(2).all(|w| w[1] < w[0]), "{peaks:?}");
    }

    #[test]
    fn hanging_straight_down_stays_put() {
        let mut sim = started(PendulumParams { start_angle: 0.0, ..PendulumParams::default() });
        sim.advance(500);
        assert_eq!(*sim.state(), PendulumState::default());
    }

    #[test]
    fn small_angle_period() {
        let period = Simulation::with_defaults(Pendulum).metrics().period.unwrap();
        assert!((period - std::f64::consts::TAU * (2.0f64 / 9.81).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn zero_length_is_degenerate() {
        let mut sim = started(PendulumParams { length: 0.0, ..PendulumParams::default() });
        assert_eq!(sim.step(), TickOutcome::Halted(Halt::Degenerate));
    }
}
