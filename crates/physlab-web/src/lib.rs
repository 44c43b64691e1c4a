//! Browser bindings for the PhysLab simulation core.
//!
//! One [`LabRunner`] lives in a `thread_local!`. The page calls `lab_init` once,
//! then drives everything through the free functions below. Ticks come from
//! `requestAnimationFrame` via [`RafHost`]; the page never calls a tick itself.

pub mod raf;
pub mod runner;

use std::cell::RefCell;

use js_sys::{Float32Array, Float64Array};
use wasm_bindgen::prelude::*;

use physlab::ScenarioKind;

pub use raf::RafHost;
pub use runner::LabRunner;

thread_local! {
    static RUNNER: RefCell<Option<LabRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut LabRunner) -> R) -> Result<R, JsValue> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Lab not initialized. Call lab_init() first."))?;
        Ok(f(runner))
    })
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_kind(kind: &str) -> Result<ScenarioKind, JsValue> {
    kind.parse::<ScenarioKind>().map_err(js_err)
}

fn frame_callback() {
    let _ = with_runner(|r| r.frame());
}

#[wasm_bindgen]
pub fn lab_init(kind: &str, seed: u32) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let kind = parse_kind(kind)?;
    let runner = LabRunner::new(kind, u64::from(seed), RafHost::new(frame_callback));

    RUNNER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if let Some(old) = slot.as_mut() {
            old.shutdown();
        }
        *slot = Some(runner);
    });
    log::info!("physlab: initialized with {}", kind);
    Ok(())
}

#[wasm_bindgen]
pub fn lab_activate(kind: &str) -> Result<(), JsValue> {
    let kind = parse_kind(kind)?;
    with_runner(|r| r.activate(kind))
}

#[wasm_bindgen]
pub fn lab_kind() -> Result<String, JsValue> {
    with_runner(|r| r.kind().id().to_string())
}

#[wasm_bindgen]
pub fn lab_start() -> Result<bool, JsValue> {
    with_runner(|r| r.start())
}

#[wasm_bindgen]
pub fn lab_stop() -> Result<(), JsValue> {
    with_runner(|r| r.stop())
}

#[wasm_bindgen]
pub fn lab_reset() -> Result<(), JsValue> {
    with_runner(|r| r.reset())
}

#[wasm_bindgen]
pub fn lab_is_running() -> Result<bool, JsValue> {
    with_runner(|r| r.is_running())
}

/// Merge a JSON object of parameter updates. Rejected updates leave the old set.
#[wasm_bindgen]
pub fn lab_set_params(json: &str) -> Result<(), JsValue> {
    with_runner(|r| r.set_params(json))?.map_err(js_err)
}

/// Returns false when the active scenario has no target.
#[wasm_bindgen]
pub fn lab_reposition_target() -> Result<bool, JsValue> {
    with_runner(|r| r.reposition_target())
}

// ---- JSON snapshots ----

#[wasm_bindgen]
pub fn lab_state_json() -> Result<String, JsValue> {
    with_runner(|r| r.state_json())?.map_err(js_err)
}

#[wasm_bindgen]
pub fn lab_metrics_json() -> Result<String, JsValue> {
    with_runner(|r| r.metrics_json())?.map_err(js_err)
}

#[wasm_bindgen]
pub fn lab_params_json() -> Result<String, JsValue> {
    with_runner(|r| r.params_json())?.map_err(js_err)
}

#[wasm_bindgen]
pub fn lab_param_specs_json() -> Result<String, JsValue> {
    with_runner(|r| r.param_specs_json())?.map_err(js_err)
}

// ---- Flat buffers ----

/// Orbit trail as `[x0, y0, x1, y1, ...]`, oldest first. Empty for other scenarios.
#[wasm_bindgen]
pub fn lab_history() -> Result<Float64Array, JsValue> {
    with_runner(|r| Float64Array::from(r.trail()))
}

/// Events since the previous call, `SimEvent::FLOATS` floats per record.
#[wasm_bindgen]
pub fn lab_events() -> Result<Float32Array, JsValue> {
    with_runner(|r| Float32Array::from(r.events()))
}
