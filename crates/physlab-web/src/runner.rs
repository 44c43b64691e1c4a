use physlab::{Lab, ParamError, Rng, ScenarioKind, SimEvent, TickOutcome};

use crate::raf::RafHost;

/// Owns the active scenario and its frame host.
///
/// wasm-bindgen cannot export generic or enum-holding structs with the surface
/// we need, so `lib.rs` keeps one runner in a `thread_local!` and exposes free
/// functions over it.
pub struct LabRunner {
    lab: Lab,
    host: RafHost,
    rng: Rng,
    /// Flat `x, y` trail pairs, rebuilt on each read.
    trail_buffer: Vec<f64>,
    /// Events drained on the last read, `SimEvent::FLOATS` floats each.
    event_buffer: Vec<f32>,
}

impl LabRunner {
    pub fn new(kind: ScenarioKind, seed: u64, host: RafHost) -> Self {
        let mut rng = Rng::new(seed);
        let lab = Lab::activate(kind, &mut rng);
        Self {
            lab,
            host,
            rng,
            trail_buffer: Vec::new(),
            event_buffer: Vec::new(),
        }
    }

    /// Switch scenario. The previous one is stopped and dropped.
    pub fn activate(&mut self, kind: ScenarioKind) {
        let next = Lab::activate(kind, &mut self.rng);
        let prev = std::mem::replace(&mut self.lab, next);
        prev.deactivate(&mut self.host);
    }

    /// Stop the active scenario, cancelling its pending frame.
    pub fn shutdown(&mut self) {
        self.lab.stop(&mut self.host);
    }

    pub fn start(&mut self) -> bool {
        self.lab.start(&mut self.host)
    }

    pub fn stop(&mut self) {
        self.lab.stop(&mut self.host);
    }

    pub fn reset(&mut self) {
        self.lab.reset(&mut self.host);
    }

    /// Animation-frame callback: exactly one fixed-`dt` tick.
    pub fn frame(&mut self) -> TickOutcome {
        self.lab.on_frame(&mut self.host)
    }

    pub fn is_running(&self) -> bool {
        self.lab.is_running()
    }

    pub fn kind(&self) -> ScenarioKind {
        self.lab.kind()
    }

    pub fn set_params(&mut self, json: &str) -> Result<(), ParamError> {
        self.lab.patch_params_json(json)
    }

    pub fn reposition_target(&mut self) -> bool {
        self.lab.reposition_target(&mut self.rng).is_some()
    }

    pub fn state_json(&self) -> Result<String, serde_json::Error> {
        self.lab.snapshot_json()
    }

    pub fn metrics_json(&self) -> Result<String, serde_json::Error> {
        self.lab.metrics_json()
    }

    pub fn params_json(&self) -> Result<String, serde_json::Error> {
        self.lab.params_json()
    }

    pub fn param_specs_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.lab.param_specs())
    }

    pub fn trail(&mut self) -> &[f64] {
        self.trail_buffer = self.lab.trail_coords();
        &self.trail_buffer
    }

    /// Drain pending events into the flat event buffer.
    pub fn events(&mut self) -> &[f32] {
        let events = self.lab.drain_events();
        self.event_buffer.clear();
        self.event_buffer.extend_from_slice(SimEvent::as_floats(&events));
        &self.event_buffer
    }
}
