//! Uniform circular motion.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::{Scenario, StepContext};
use crate::api::types::{Halt, ScenarioKind};
use crate::scenarios::{wrap_angle, MIN_DENOMINATOR};

/// Visual speed-up applied to the angular advance so slow settings still move.
pub const ANGLE_SCALE: f64 = 30.0;

const SPECS: [ParamSpec; 3] = [
    ParamSpec::new("radius", "Radius", 50.0, 200.0, 10.0, "px"),
    ParamSpec::new("speed", "Speed", 1.0, 20.0, 1.0, "m/s"),
    ParamSpec::new("mass", "Mass", 1.0, 10.0, 1.0, "kg"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircularParams {
    pub radius: f64,
    /// Tangential speed.
    pub speed: f64,
    pub mass: f64,
}

impl Default for CircularParams {
    fn default() -> Self {
        Self { radius: 100.0, speed: 5.0, mass: 2.0 }
    }
}

impl ParamSet for CircularParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![("radius", self.radius), ("speed", self.speed), ("mass", self.mass)]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

impl CircularParams {
    pub fn angular_velocity(&self) -> f64 {
        if self.radius <= MIN_DENOMINATOR {
            return 0.0;
        }
        self.speed / self.radius
    }

    /// `v² / r`.
    pub fn centripetal_acceleration(&self) -> f64 {
        if self.radius <= MIN_DENOMINATOR {
            return 0.0;
        }
        self.speed * self.speed / self.radius
    }

    /// Time for one revolution, `None` when the body does not move.
    pub fn period(&self) -> Option<f64> {
        if self.speed.abs() <= MIN_DENOMINATOR {
            return None;
        }
        Some(TAU * self.radius / self.speed.abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CircularState {
    /// Angle in radians, kept in `[0, 2π)`.
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircularMetrics {
    pub angle: f64,
    pub x: f64,
    pub y: f64,
    pub angular_velocity: f64,
    pub centripetal_acceleration: f64,
    pub centripetal_force: f64,
    pub period: Option<f64>,
}

pub struct Circular;

impl Scenario for Circular {
    type Params = CircularParams;
    type State = CircularState;
    type Metrics = CircularMetrics;

    const KIND: ScenarioKind = ScenarioKind::Circular;

    fn initial_state(&self, _params: &CircularParams) -> CircularState {
        CircularState::default()
    }

    fn degenerate(&self, params: &CircularParams, _state: &CircularState) -> bool {
        params.radius <= MIN_DENOMINATOR
    }

    fn integrate(&self, state: &CircularState, params: &CircularParams, dt: f64) -> CircularState {
        CircularState { angle: state.angle + params.angular_velocity() * dt * ANGLE_SCALE }
    }

    fn detect(
        &mut self,
        state: &mut CircularState,
        _params: &CircularParams,
        _ctx: &mut StepContext,
    ) -> Option<Halt> {
        state.angle = wrap_angle(state.angle);
        None
    }

    fn is_finite(&self, state: &CircularState) -> bool {
        state.angle.is_finite()
    }

    fn metrics(&self, state: &CircularState, params: &CircularParams) -> CircularMetrics {
        let (sin, cos) = state.angle.sin_cos();
        let accel = params.centripetal_acceleration();
        CircularMetrics {
            angle: state.angle,
            x: params.radius * cos,
            y: params.radius * sin,
            angular_velocity: params.angular_velocity(),
            centripetal_acceleration: accel,
            centripetal_force: params.mass * accel,
            period: params.period(),
        }
    }
}
