//! Superposition of two travelling sine waves.
//!
//! The only evolving quantity is the shared phase offset; displacements are
//! a continuous field sampled on demand.

use serde::{Deserialize, Serialize};

use crate::api::params::{ParamSet, ParamSpec};
use crate::api::scenario::{Scenario, StepContext};
use crate::api::types::{Halt, ScenarioKind};
use crate::scenarios::wrap_angle;

/// Upper bound on the number of points `field` returns.
pub const MAX_FIELD_SAMPLES: usize = 100_000;

/// Radians of phase per unit of horizontal distance, per unit of frequency.
pub const SPATIAL_FACTOR: f64 = 0.02;

const SPECS: [ParamSpec; 4] = [
    ParamSpec::new("f1", "Wave 1 Frequency", 1.0, 10.0, 0.5, "Hz"),
    ParamSpec::new("a1", "Wave 1 Amplitude", 10.0, 60.0, 5.0, "px"),
    ParamSpec::new("f2", "Wave 2 Frequency", 1.0, 10.0, 0.5, "Hz"),
    ParamSpec::new("a2", "Wave 2 Amplitude", 10.0, 60.0, 5.0, "px"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WavesParams {
    pub f1: f64,
    pub a1: f64,
    pub f2: f64,
    pub a2: f64,
    /// Phase advance in radians per second.
    pub speed: f64,
}

impl Default for WavesParams {
    fn default() -> Self {
        Self { f1: 2.0, a1: 30.0, f2: 3.0, a2: 30.0, speed: 6.0 }
    }
}

impl ParamSet for WavesParams {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("f1", self.f1),
            ("a1", self.a1),
            ("f2", self.f2),
            ("a2", self.a2),
            ("speed", self.speed),
        ]
    }

    fn specs() -> &'static [ParamSpec] {
        &SPECS
    }
}

/// Displacements at one horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveSample {
    pub x: f64,
    pub first: f64,
    pub second: f64,
    /// `first + second`.
    pub sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WavesState {
    /// Phase offset in radians, kept in `[0, 2π)`.
    pub offset: f64,
}

impl WavesState {
    pub fn sample(&self, params: &WavesParams, x: f64) -> WaveSample {
        let first = params.a1 * (x * params.f1 * SPATIAL_FACTOR + self.offset).sin();
        let second = params.a2 * (x * params.f2 * SPATIAL_FACTOR + self.offset).sin();
        WaveSample { x, first, second, sum: first + second }
    }

    /// Sample `[0, width]` every `step` units, at most `MAX_FIELD_SAMPLES` points.
    /// Empty unless both are finite, `step` is positive and `width` is not negative.
    pub fn field(&self, params: &WavesParams, width: f64, step: f64) -> Vec<WaveSample> {
        if !step.is_finite() || step <= 0.0 || !width.is_finite() || width < 0.0 {
            return Vec::new();
        }
        let count = (width / step).floor().min((MAX_FIELD_SAMPLES - 1) as f64) as usize + 1;
        (0..count).map(|i| self.sample(params, i as f64 * step)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WavesMetrics {
    /// `|f1 − f2|`.
    pub beat_frequency: f64,
    /// Largest possible combined displacement, `a1 + a2`.
    pub max_amplitude: f64,
    pub offset: f64,
}

pub struct Waves;

impl Scenario for Waves {
    type Params = WavesParams;
    type State = WavesState;
    type Metrics = WavesMetrics;

    const KIND: ScenarioKind = ScenarioKind::Waves;

    fn initial_state(&self, _params: &WavesParams) -> WavesState {
        WavesState::default()
    }

    fn integrate(&self, state: &WavesState, params: &WavesParams, dt: f64) -> WavesState {
        WavesState { offset: state.offset + params.speed * dt }
    }

    fn detect(&mut self, state: &mut WavesState, _params: &WavesParams, _ctx: &mut StepContext) -> Option<Halt> {
        state.offset = wrap_angle(state.offset);
        None
    }

    fn is_finite(&self, state: &WavesState) -> bool {
        state.offset.is_finite()
    }

    fn metrics(&self, state: &WavesState, params: &WavesParams) -> WavesMetrics {
        WavesMetrics {
            beat_frequency: (params.f1 - params.f2).abs(),
            max_amplitude: params.a1.abs() + params.a2.abs(),
            offset: state.offset,
        }
    }
}
