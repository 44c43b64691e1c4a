//! Projectile launched at a target. Position is closed-form in time; only
//! the clock is integrated.

use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::{Scenario, ScenarioConfig, StepContext};
use crate::api::types::{Halt, ScenarioKind};
use crate::core::rng::Rng;
use crate::core::simulation::Simulation;
use crate::scenarios::MIN_DENOMINATOR;

pub const PROJECTILE_DT: f64 = 0.05;

/// Range of target centres drawn when repositioning, in metres.
const TARGET_CENTER_RANGE: (f64, f64) = (12.5, 162.5);
/// Range of target tolerances drawn when repositioning, in metres.
const TARGET_TOLERANCE_RANGE: (f64, f64) = (10.0, 20.0);

const SPECS: [ParamSpec; 3] = [
    ParamSpec::new("v0", "Velocity", 10.0, 100.0, 1.0, "m/s"),
    ParamSpec::new("angle", "Angle", 0.0, 90.0, 1.0, "°"),
    ParamSpec::new("h0", "Height", 0.0, 50.0, 1.0, "m"),
];

/// Landing zone on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Horizontal distance from the launch point to the middle of the zone.
    pub center: f64,
    /// A landing closer than this to `center` counts as a hit.
    pub tolerance: f64,
}

impl Default for Target {
    fn default() -> Self {
        Self { center: 67.5, tolerance: 10.0 }
    }
}

impl Target {
    /// Draw a fresh placement from `rng`.
    pub fn random(rng: &mut Rng) -> Self {
        Self {
            center: rng.range(TARGET_CENTER_RANGE.0, TARGET_CENTER_RANGE.1),
            tolerance: rng.range(TARGET_TOLERANCE_RANGE.0, TARGET_TOLERANCE_RANGE.1),
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        (x - self.center).abs() < self.tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectileParams {
    /// Launch speed.
    pub v0: f64,
    /// Launch elevation in degrees.
    pub angle: f64,
    /// Launch height above ground.
    pub h0: f64,
    pub g: f64,
    pub target: Target,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self { v0: 50.0, angle: 45.0, h0: 0.0, g: 9.81, target: Target::default() }
    }
}

impl ParamSet for ProjectileParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("v0", self.v0),
            ("angle", self.angle),
            ("h0", self.h0),
            ("g", self.g),
            ("target.center", self.target.center),
            ("target.tolerance", self.target.tolerance),
        ]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

impl ProjectileParams {
    /// Launch velocity components `(vx, vy)`.
    pub fn launch_velocity(&self) -> (f64, f64) {
        let rad = self.angle.to_radians();
        (self.v0 * rad.cos(), self.v0 * rad.sin())
    }

    /// `(x, y)` at time `t`.
    pub fn position_at(&self, t: f64) -> (f64, f64) {
        let (vx, vy) = self.launch_velocity();
        (vx * t, self.h0 + vy * t - 0.5 * self.g * t * t)
    }

    /// `(vx, vy)` at time `t`.
    pub fn velocity_at(&self, t: f64) -> (f64, f64) {
        let (vx, vy) = self.launch_velocity();
        (vx, vy - self.g * t)
    }

    /// Time until the analytic trajectory returns to ground level.
    pub fn flight_time(&self) -> Option<f64> {
        if self.g <= MIN_DENOMINATOR {
            return None;
        }
        let (_, vy) = self.launch_velocity();
        let disc = vy * vy + 2.0 * self.g * self.h0;
        if disc < 0.0 {
            return None;
        }
        Some((vy + disc.sqrt()) / self.g)
    }

    pub fn predicted_range(&self) -> Option<f64> {
        self.flight_time().map(|t| self.position_at(t).0)
    }

    /// Highest point of the trajectory above ground.
    pub fn apex_height(&self) -> Option<f64> {
        if self.g <= MIN_DENOMINATOR {
            return None;
        }
        let (_, vy) = self.launch_velocity();
        Some(self.h0 + (vy.max(0.0) * vy.max(0.0)) / (2.0 * self.g))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProjectileState {
    /// Time of flight so far. Frozen on landing.
    pub t: f64,
    pub landed: bool,
    /// Whether the landing point fell inside the target. Meaningful once landed.
    pub hit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileMetrics {
    pub time: f64,
    /// Height above ground, never negative.
    pub height: f64,
    pub range: f64,
    pub vx: f64,
    pub vy: f64,
    pub speed: f64,
    pub flight_time: Option<f64>,
    pub predicted_range: Option<f64>,
    pub apex_height: Option<f64>,
}

pub struct Projectile;

impl Scenario for Projectile {
    type Params = ProjectileParams;
    type State = ProjectileState;
    type Metrics = ProjectileMetrics;

    const KIND: ScenarioKind = ScenarioKind::Projectile;

    fn config(&self) -> ScenarioConfig {
        ScenarioConfig { fixed_dt: PROJECTILE_DT, ..ScenarioConfig::default() }
    }

    fn initial_state(&self, _params: &ProjectileParams) -> ProjectileState {
        ProjectileState::default()
    }

    fn integrate(&self, state: &ProjectileState, _params: &ProjectileParams, dt: f64) -> ProjectileState {
        if state.landed {
            return *state;
        }
        ProjectileState { t: state.t + dt, ..*state }
    }

    fn detect(
        &mut self,
        state: &mut ProjectileState,
        params: &ProjectileParams,
        _ctx: &mut StepContext,
    ) -> Option<Halt> {
        let (x, y) = params.position_at(state.t);
        if y < 0.0 {
            state.landed = true;
            state.hit = params.target.contains(x);
            log::debug!("projectile: landed at x={:.2} ({})", x, if state.hit { "hit" } else { "miss" });
            return Some(Halt::Landed);
        }
        None
    }

    fn is_finite(&self, state: &ProjectileState) -> bool {
        state.t.is_finite()
    }

    fn metrics(&self, state: &ProjectileState, params: &ProjectileParams) -> ProjectileMetrics {
        let (x, y) = params.position_at(state.t);
        let (vx, vy) = params.velocity_at(state.t);
        ProjectileMetrics {
            time: state.t,
            height: y.max(0.0),
            range: x,
            vx,
            vy,
            speed: vx.hypot(vy),
            flight_time: params.flight_time(),
            predicted_range: params.predicted_range(),
            apex_height: params.apex_height(),
        }
    }
}

impl Simulation<Projectile> {
    /// Move the target to a random spot. Takes effect for the next landing test.
    pub fn reposition_target(&mut self, rng: &mut Rng) -> Target {
        let target = Target::random(rng);
        let params = ProjectileParams { target, ..self.params().clone() };
        if let Err(err) = self.set_params(params) {
            log::warn!("projectile: target not moved: {}", err);
        }
        self.params().target
    }
}
