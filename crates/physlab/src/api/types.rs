use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::api::params::ParamError;

/// Lifecycle phase shared by every scenario.
///
/// ```text
/// Idle ──start──▶ Running ──stop──▶ Paused ──start──▶ Running
///                    │
///                    └──halt──▶ Terminal ──reset──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fresh or reset: default state, no frame registered.
    Idle,
    /// Scheduler active, state mutates once per tick.
    Running,
    /// Scheduler stopped, state frozen, resumable.
    Paused,
    /// A stop condition fired. Only `reset` leaves this phase.
    Terminal(Halt),
}

impl Phase {
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Running)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Terminal(_))
    }

    /// The stop condition, if the phase is terminal.
    pub fn halt(self) -> Option<Halt> {
        match self {
            Phase::Terminal(halt) => Some(halt),
            _ => None,
        }
    }
}

/// Why a scenario stopped on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Halt {
    /// The block slid past the end of the ramp.
    ReachedEnd,
    /// The projectile crossed below ground level.
    Landed,
    /// The planet fell inside the crash radius.
    Crashed,
    /// A guarded denominator collapsed, or integration produced a non-finite value.
    Degenerate,
}

impl Halt {
    /// Numeric code carried in `SimEvent::a` for terminal events.
    pub fn code(self) -> u32 {
        match self {
            Halt::ReachedEnd => 1,
            Halt::Landed => 2,
            Halt::Crashed => 3,
            Halt::Degenerate => 4,
        }
    }
}

/// The closed set of simulated systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Ramp,
    Projectile,
    Circular,
    #[serde(rename = "gravity")]
    Orbit,
    Waves,
    Spring,
    Pendulum,
    Collision,
}

impl ScenarioKind {
    /// All scenarios in navigation order.
    pub const ALL: [ScenarioKind; 8] = [
        ScenarioKind::Ramp,
        ScenarioKind::Projectile,
        ScenarioKind::Circular,
        ScenarioKind::Orbit,
        ScenarioKind::Waves,
        ScenarioKind::Spring,
        ScenarioKind::Pendulum,
        ScenarioKind::Collision,
    ];

    /// Stable identifier used by hosts to select a scenario.
    pub fn id(self) -> &'static str {
        match self {
            ScenarioKind::Ramp => "ramp",
            ScenarioKind::Projectile => "projectile",
            ScenarioKind::Circular => "circular",
            ScenarioKind::Orbit => "gravity",
            ScenarioKind::Waves => "waves",
            ScenarioKind::Spring => "spring",
            ScenarioKind::Pendulum => "pendulum",
            ScenarioKind::Collision => "collision",
        }
    }

    /// Human-readable title.
    pub fn label(self) -> &'static str {
        match self {
            ScenarioKind::Ramp => "Ramp & Forces",
            ScenarioKind::Projectile => "Projectile Motion",
            ScenarioKind::Circular => "Circular Motion",
            ScenarioKind::Orbit => "Orbital Gravity",
            ScenarioKind::Waves => "Wave Interference",
            ScenarioKind::Spring => "Hooke's Law",
            ScenarioKind::Pendulum => "Simple Pendulum",
            ScenarioKind::Collision => "Elastic Collision",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ScenarioKind {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| ParamError::UnknownScenario(s.to_string()))
    }
}

/// Result of delivering one tick to a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The simulation was not running; nothing changed.
    Skipped,
    /// State advanced by one fixed step.
    Advanced,
    /// State advanced and a stop condition fired.
    Halted(Halt),
}

/// A simulation event forwarded to the host (UI, audio, renderer).
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SimEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl SimEvent {
    pub const FLOATS: usize = 4;

    pub const STARTED: f32 = 1.0;
    pub const PAUSED: f32 = 2.0;
    pub const RESET: f32 = 3.0;
    /// `a` = halt code, `b` = tick.
    pub const TERMINAL: f32 = 4.0;
    /// `a` = impulse on the first body, `b` = tick.
    pub const COLLISION: f32 = 5.0;
    /// `a` = body index, `b` = wall position.
    pub const WALL_BOUNCE: f32 = 6.0;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }

    /// View a batch of events as `FLOATS` floats per record.
    pub fn as_floats(events: &[SimEvent]) -> &[f32] {
        bytemuck::cast_slice(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_ids_round_trip() {
        for kind in ScenarioKind::ALL {
            assert_eq!(kind.id().parse::<ScenarioKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "trebuchet".parse::<ScenarioKind>().unwrap_err();
        assert!(matches!(err, ParamError::UnknownScenario(ref id) if id == "trebuchet"));
    }

    #[test]
    fn orbit_serializes_as_gravity() {
        let json = serde_json::to_string(&ScenarioKind::Orbit).unwrap();
        assert_eq!(json, "\"gravity\"");
    }

    #[test]
    fn events_cast_to_flat_floats() {
        let events = [
            SimEvent::new(SimEvent::STARTED, 0.0, 0.0, 0.0),
            SimEvent::new(SimEvent::TERMINAL, 2.0, 58.0, 0.0),
        ];
        let floats = SimEvent::as_floats(&events);
        assert_eq!(floats.len(), 2 * SimEvent::FLOATS);
        assert_eq!(floats[4], SimEvent::TERMINAL);
        assert_eq!(floats[6], 58.0);
    }

    #[test]
    fn terminal_phase_exposes_halt() {
        assert_eq!(Phase::Terminal(Halt::Landed).halt(), Some(Halt::Landed));
        assert!(!Phase::Paused.is_terminal());
        assert!(Phase::Running.is_running());
    }
}
