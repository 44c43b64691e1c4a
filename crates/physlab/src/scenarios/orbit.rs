//! A planet around a fixed star under inverse-square gravity.
//!
//! The star sits at the origin. Integration is semi-implicit Euler: velocity
//! is updated from the current acceleration, then position from the new
//! velocity. A sampled trail of recent positions is kept for drawing.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::{Scenario, ScenarioConfig, StepContext};
use crate::api::types::{Halt, ScenarioKind};
use crate::core::history::History;
use crate::core::simulation::Simulation;
use crate::scenarios::MIN_DENOMINATOR;

pub const ORBIT_DT: f64 = 0.5;
/// Gravitational constant in scene units.
pub const G: f64 = 1.0;
/// The planet's launch point.
pub const START: DVec2 = DVec2::new(200.0, 0.0);
/// Distance from the star below which the planet is considered crashed.
pub const CRASH_RADIUS: f64 = 30.0;

const SPECS: [ParamSpec; 2] = [
    ParamSpec::new("star_mass", "Star Mass", 500.0, 2000.0, 50.0, ""),
    ParamSpec::new("v0", "Initial Velocity", 1.0, 8.0, 0.5, ""),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrbitParams {
    pub star_mass: f64,
    pub planet_mass: f64,
    /// Launch speed, perpendicular to the star direction.
    pub v0: f64,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self { star_mass: 1000.0, planet_mass: 10.0, v0: 4.0 }
    }
}

impl ParamSet for OrbitParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("star_mass", self.star_mass),
            ("planet_mass", self.planet_mass),
            ("v0", self.v0),
        ]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

impl OrbitParams {
    /// Gravitational acceleration at `position`, or `None` at the singularity.
    pub fn acceleration(&self, position: DVec2) -> Option<DVec2> {
        let r = position.length();
        if r <= MIN_DENOMINATOR {
            return None;
        }
        Some(-G * self.star_mass * position / (r * r * r))
    }

    /// Speed of a circular orbit at distance `r`.
    pub fn circular_speed(&self, r: f64) -> f64 {
        if r <= MIN_DENOMINATOR {
            return 0.0;
        }
        (G * self.star_mass / r).sqrt()
    }

    pub fn escape_speed(&self, r: f64) -> f64 {
        std::f64::consts::SQRT_2 * self.circular_speed(r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitState {
    pub position: DVec2,
    pub velocity: DVec2,
    pub crashed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitMetrics {
    pub distance: f64,
    pub speed: f64,
    /// Magnitude of the attraction, `G·M·m / r²`.
    pub force: f64,
    pub circular_speed: f64,
    pub escape_speed: f64,
    /// Energy per unit planet mass; negative while bound.
    pub specific_energy: f64,
}

pub struct Orbit {
    trail: History<DVec2>,
    sample_interval: u64,
}

impl Orbit {
    pub fn new() -> Self {
        let config = ScenarioConfig::default();
        Self::with_trail(config.history_capacity, config.history_interval)
    }

    /// Keep up to `capacity` positions, one every `sample_interval` ticks.
    pub fn with_trail(capacity: usize, sample_interval: u64) -> Self {
        Self { trail: History::new(capacity), sample_interval }
    }

    pub fn trail(&self) -> &History<DVec2> {
        &self.trail
    }
}

impl Default for Orbit {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for Orbit {
    type Params = OrbitParams;
    type State = OrbitState;
    type Metrics = OrbitMetrics;

    const KIND: ScenarioKind = ScenarioKind::Orbit;

    fn config(&self) -> ScenarioConfig {
        ScenarioConfig {
            fixed_dt: ORBIT_DT,
            history_capacity: self.trail.capacity(),
            history_interval: self.sample_interval,
        }
    }

    fn initial_state(&self, params: &OrbitParams) -> OrbitState {
        OrbitState {
            position: START,
            velocity: DVec2::new(0.0, params.v0),
            crashed: false,
        }
    }

    fn degenerate(&self, _params: &OrbitParams, state: &OrbitState) -> bool {
        state.position.length() <= MIN_DENOMINATOR
    }

    fn integrate(&self, state: &OrbitState, params: &OrbitParams, dt: f64) -> OrbitState {
        let Some(accel) = params.acceleration(state.position) else {
            return *state;
        };
        let velocity = state.velocity + accel * dt;
        OrbitState {
            position: state.position + velocity * dt,
            velocity,
            crashed: state.crashed,
        }
    }

    fn detect(&mut self, state: &mut OrbitState, _params: &OrbitParams, ctx: &mut StepContext) -> Option<Halt> {
        if state.position.length() < CRASH_RADIUS {
            state.crashed = true;
            log::debug!("orbit: crashed at tick {}", ctx.tick);
            return Some(Halt::Crashed);
        }
        if ctx.every(self.sample_interval) {
            self.trail.push(state.position);
        }
        None
    }

    fn on_reset(&mut self) {
        self.trail.clear();
    }

    fn is_finite(&self, state: &OrbitState) -> bool {
        state.position.is_finite() && state.velocity.is_finite()
    }

    fn metrics(&self, state: &OrbitState, params: &OrbitParams) -> OrbitMetrics {
        let r = state.position.length();
        let speed = state.velocity.length();
        let (force, potential) = if r > MIN_DENOMINATOR {
            (
                G * params.star_mass * params.planet_mass / (r * r),
                -G * params.star_mass / r,
            )
        } else {
            (0.0, 0.0)
        };
        OrbitMetrics {
            distance: r,
            speed,
            force,
            circular_speed: params.circular_speed(r),
            escape_speed: params.escape_speed(r),
            specific_energy: 0.5 * speed * speed + potential,
        }
    }
}

impl Simulation<Orbit> {
    /// Recent planet positions, oldest first.
    pub fn history(&self) -> &History<DVec2> {
        self.scenario().trail()
    }

    /// The trail flattened to `x, y` pairs, oldest first.
    pub fn trail_coords(&self) -> Vec<f64> {
        let points = self.history().to_vec();
        let coords: &[f64] = bytemuck::cast_slice(&points);
        coords.to_vec()
    }
}
