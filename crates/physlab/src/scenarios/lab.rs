//! Runtime-selected scenario. Hosts that switch between systems hold a `Lab`
//! and talk JSON; everything else can use `Simulation<S>` directly.

use glam::DVec2;

use crate::api::params::{ParamError, ParamSet, ParamSpec};
use crate::api::scenario::Scenario;
use crate::api::types::{Phase, ScenarioKind, SimEvent, TickOutcome};
use crate::core::history::History;
use crate::core::rng::Rng;
use crate::core::scheduler::FrameHost;
use crate::core::simulation::Simulation;
use crate::scenarios::{
    Circular, Collision, Orbit, Pendulum, Projectile, Ramp, Spring, Target, Waves,
};

/// The active simulation, one variant per scenario.
pub enum Lab {
    Ramp(Simulation<Ramp>),
    Projectile(Simulation<Projectile>),
    Circular(Simulation<Circular>),
    Orbit(Simulation<Orbit>),
    Waves(Simulation<Waves>),
    Spring(Simulation<Spring>),
    Pendulum(Simulation<Pendulum>),
    Collision(Simulation<Collision>),
}

macro_rules! each_sim {
    ($lab:expr, $sim:ident => $body:expr) => {
        match $lab {
            Lab::Ramp($sim) => $body,
            Lab::Projectile($sim) => $body,
            Lab::Circular($sim) => $body,
            Lab::Orbit($sim) => $body,
            Lab::Waves($sim) => $body,
            Lab::Spring($sim) => $body,
            Lab::Pendulum($sim) => $body,
            Lab::Collision($sim) => $body,
        }
    };
}

fn specs_of<S: Scenario>(_sim: &Simulation<S>) -> &'static [ParamSpec] {
    S::Params::specs()
}

impl Lab {
    /// Build `kind` with default parameters. The projectile target is placed from `rng`.
    pub fn activate(kind: ScenarioKind, rng: &mut Rng) -> Self {
        log::info!("lab: activating {} ({})", kind, kind.label());
        match kind {
            ScenarioKind::Ramp => Lab::Ramp(Simulation::with_defaults(Ramp)),
            ScenarioKind::Projectile => {
                let mut sim = Simulation::with_defaults(Projectile);
                sim.reposition_target(rng);
                Lab::Projectile(sim)
            }
            ScenarioKind::Circular => Lab::Circular(Simulation::with_defaults(Circular)),
            ScenarioKind::Orbit => Lab::Orbit(Simulation::with_defaults(Orbit::new())),
            ScenarioKind::Waves => Lab::Waves(Simulation::with_defaults(Waves)),
            ScenarioKind::Spring => Lab::Spring(Simulation::with_defaults(Spring)),
            ScenarioKind::Pendulum => Lab::Pendulum(Simulation::with_defaults(Pendulum)),
            ScenarioKind::Collision => Lab::Collision(Simulation::with_defaults(Collision)),
        }
    }

    /// Stop ticking and release the scenario. Nothing carries over to the next one.
    pub fn deactivate(mut self, host: &mut dyn FrameHost) {
        self.stop(host);
        log::info!("lab: deactivated {}", self.kind());
    }

    pub fn kind(&self) -> ScenarioKind {
        each_sim!(self, sim => sim.kind())
    }

    pub fn phase(&self) -> Phase {
        each_sim!(self, sim => sim.phase())
    }

    pub fn is_running(&self) -> bool {
        self.phase().is_running()
    }

    pub fn tick(&self) -> u64 {
        each_sim!(self, sim => sim.tick())
    }

    pub fn start(&mut self, host: &mut dyn FrameHost) -> bool {
        each_sim!(self, sim => sim.start(host))
    }

    pub fn stop(&mut self, host: &mut dyn FrameHost) {
        each_sim!(self, sim => sim.stop(host))
    }

    pub fn reset(&mut self, host: &mut dyn FrameHost) {
        each_sim!(self, sim => sim.reset(host))
    }

    pub fn on_frame(&mut self, host: &mut dyn FrameHost) -> TickOutcome {
        each_sim!(self, sim => sim.on_frame(host))
    }

    pub fn step(&mut self) -> TickOutcome {
        each_sim!(self, sim => sim.step())
    }

    pub fn advance(&mut self, ticks: u64) -> TickOutcome {
        each_sim!(self, sim => sim.advance(ticks))
    }

    /// Merge a JSON object of field updates into the parameters.
    pub fn patch_params_json(&mut self, json: &str) -> Result<(), ParamError> {
        let patch: serde_json::Value = serde_json::from_str(json)?;
        each_sim!(self, sim => sim.patch_params(&patch))
    }

    pub fn params_json(&self) -> Result<String, serde_json::Error> {
        each_sim!(self, sim => serde_json::to_string(sim.params()))
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        each_sim!(self, sim => serde_json::to_string(&sim.snapshot()))
    }

    pub fn metrics_json(&self) -> Result<String, serde_json::Error> {
        each_sim!(self, sim => serde_json::to_string(&sim.metrics()))
    }

    /// Declared input ranges of the active scenario.
    pub fn param_specs(&self) -> &'static [ParamSpec] {
        each_sim!(self, sim => specs_of(sim))
    }

    /// Orbit trail; `None` for scenarios without one.
    pub fn history(&self) -> Option<&History<DVec2>> {
        match self {
            Lab::Orbit(sim) => Some(sim.history()),
            _ => None,
        }
    }

    /// Orbit trail as flat `x, y` pairs; empty for scenarios without one.
    pub fn trail_coords(&self) -> Vec<f64> {
        match self {
            Lab::Orbit(sim) => sim.trail_coords(),
            _ => Vec::new(),
        }
    }

    /// Move the projectile target. `None` for other scenarios.
    pub fn reposition_target(&mut self, rng: &mut Rng) -> Option<Target> {
        match self {
            Lab::Projectile(sim) => Some(sim.reposition_target(rng)),
            _ => None,
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        each_sim!(self, sim => sim.drain_events())
    }
}
