//! Two bodies on a track, colliding elastically with each other and the walls.

use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::{Scenario, ScenarioConfig, StepContext};
use crate::api::types::{Halt, ScenarioKind, SimEvent};
use crate::scenarios::MIN_DENOMINATOR;

/// Positions are in track units and velocities in track units per tick.
pub const COLLISION_DT: f64 = 1.0;

const SPECS: [ParamSpec; 4] = [
    ParamSpec::new("m1", "Mass 1", 1.0, 10.0, 1.0, "kg"),
    ParamSpec::new("v1", "Velocity 1", -10.0, 10.0, 1.0, "m/s"),
    ParamSpec::new("m2", "Mass 2", 1.0, 10.0, 1.0, "kg"),
    ParamSpec::new("v2", "Velocity 2", -10.0, 10.0, 1.0, "m/s"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollisionParams {
    pub m1: f64,
    /// Launch velocity of the first body.
    pub v1: f64,
    pub m2: f64,
    pub v2: f64,
    pub radius1: f64,
    pub radius2: f64,
    /// Start position of the first body.
    pub x1: f64,
    pub x2: f64,
    /// The track spans `[0, width]`.
    pub width: f64,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            m1: 2.0,
            v1: 5.0,
            m2: 2.0,
            v2: -3.0,
            radius1: 25.0,
            radius2: 25.0,
            x1: 100.0,
            x2: 500.0,
            width: 800.0,
        }
    }
}

impl ParamSet for CollisionParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("m1", self.m1),
            ("v1", self.v1),
            ("m2", self.m2),
            ("v2", self.v2),
            ("radius1", self.radius1),
            ("radius2", self.radius2),
            ("x1", self.x1),
            ("x2", self.x2),
            ("width", self.width),
        ]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Body {
    pub x: f64,
    pub v: f64,
}

impl Body {
    /// Reverse the velocity if the body is past a wall and still heading out.
    fn bounce(&mut self, radius: f64, width: f64) -> bool {
        let outward = (self.x < radius && self.v < 0.0) || (self.x > width - radius && self.v > 0.0);
        if outward {
            self.v = -self.v;
        }
        outward
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollisionState {
    pub a: Body,
    pub b: Body,
    /// Pairwise collisions resolved since the last reset.
    pub collisions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollisionMetrics {
    pub momentum: f64,
    pub kinetic_energy: f64,
    pub x1: f64,
    pub x2: f64,
    pub v1: f64,
    pub v2: f64,
}

/// Post-collision velocities of a 1-D elastic collision.
pub fn elastic_velocities(m1: f64, v1: f64, m2: f64, v2: f64) -> (f64, f64) {
    let total = m1 + m2;
    (
        ((m1 - m2) * v1 + 2.0 * m2 * v2) / total,
        ((m2 - m1) * v2 + 2.0 * m1 * v1) / total,
    )
}

pub struct Collision;

impl Collision {
    /// Resolve contact between the two bodies. Returns the exchanged impulse.
    fn resolve_pair(state: &mut CollisionState, params: &CollisionParams) -> Option<f64> {
        let gap = state.b.x - state.a.x;
        let contact = params.radius1 + params.radius2;
        let dir = if gap >= 0.0 { 1.0 } else { -1.0 };
        let closing = (state.b.v - state.a.v) * dir < 0.0;
        if gap.abs() > contact || !closing {
            return None;
        }

        let (v1, v2) = elastic_velocities(params.m1, state.a.v, params.m2, state.b.v);
        let impulse = params.m1 * (v1 - state.a.v).abs();
        state.a.v = v1;
        state.b.v = v2;

        // Back off to just touching, splitting the overlap.
        let half = 0.5 * (contact - gap.abs());
        state.a.x -= dir * half;
        state.b.x += dir * half;
        state.collisions += 1;
        Some(impulse)
    }
}

impl Scenario for Collision {
    type Params = CollisionParams;
    type State = CollisionState;
    type Metrics = CollisionMetrics;

    const KIND: ScenarioKind = ScenarioKind::Collision;

    fn config(&self) -> ScenarioConfig {
        ScenarioConfig { fixed_dt: COLLISION_DT, ..ScenarioConfig::default() }
    }

    fn initial_state(&self, params: &CollisionParams) -> CollisionState {
        CollisionState {
            a: Body { x: params.x1, v: params.v1 },
            b: Body { x: params.x2, v: params.v2 },
            collisions: 0,
        }
    }

    fn degenerate(&self, params: &CollisionParams, _state: &CollisionState) -> bool {
        params.m1 + params.m2 <= MIN_DENOMINATOR
    }

    fn integrate(&self, state: &CollisionState, _params: &CollisionParams, dt: f64) -> CollisionState {
        CollisionState {
            a: Body { x: state.a.x + state.a.v * dt, v: state.a.v },
            b: Body { x: state.b.x + state.b.v * dt, v: state.b.v },
            collisions: state.collisions,
        }
    }

    fn detect(
        &mut self,
        state: &mut CollisionState,
        params: &CollisionParams,
        ctx: &mut StepContext,
    ) -> Option<Halt> {
        if let Some(impulse) = Self::resolve_pair(state, params) {
            log::trace!("collision: impulse {:.3} at tick {}", impulse, ctx.tick);
            ctx.emit(SimEvent::new(SimEvent::COLLISION, impulse as f32, ctx.tick as f32, 0.0));
        }
        if state.a.bounce(params.radius1, params.width) {
            ctx.emit(SimEvent::new(SimEvent::WALL_BOUNCE, 0.0, state.a.x as f32, 0.0));
        }
        if state.b.bounce(params.radius2, params.width) {
            ctx.emit(SimEvent::new(SimEvent::WALL_BOUNCE, 1.0, state.b.x as f32, 0.0));
        }
        None
    }

    fn is_finite(&self, state: &CollisionState) -> bool {
        [state.a.x, state.a.v, state.b.x, state.b.v].iter().all(|v| v.is_finite())
    }

    fn metrics(&self, state: &CollisionState, params: &CollisionParams) -> CollisionMetrics {
        CollisionMetrics {
            momentum: params.m1 * state.a.v + params.m2 * state.b.v,
            kinetic_energy: 0.5 * params.m1 * state.a.v * state.a.v + 0.5 * params.m2 * state.b.v * state.b.v,
            x1: state.a.x,
            x2: state.b.x,
            v1: state.a.v,
            v2: state.b.v,
        }
    }
}
