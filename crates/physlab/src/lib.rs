pub mod api;
pub mod core;
pub mod scenarios;

// Re-export key types at crate root for convenience
pub use crate::api::params::{ParamError, ParamSet, ParamSpec};
pub use crate::api::scenario::{Scenario, ScenarioConfig, StepContext};
pub use crate::api::types::{Halt, Phase, ScenarioKind, SimEvent, TickOutcome};
pub use crate::core::history::History;
pub use crate::core::rng::Rng;
pub use crate::core::scheduler::{FrameHandle, FrameHost, FrameScheduler, ManualHost};
pub use crate::core::simulation::{Simulation, Snapshot};
pub use crate::core::time::FixedStep;
pub use crate::scenarios::Lab;
