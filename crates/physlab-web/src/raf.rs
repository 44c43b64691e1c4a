use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use physlab::{FrameHandle, FrameHost};

/// `FrameHost` backed by `window.requestAnimationFrame`.
///
/// One closure is allocated up front and re-registered every frame. Dropping
/// the host drops the closure, so the runner must cancel any pending frame first.
pub struct RafHost {
    callback: Closure<dyn FnMut(f64)>,
}

impl RafHost {
    pub fn new(on_frame: fn()) -> Self {
        let callback = Closure::wrap(Box::new(move |_timestamp: f64| on_frame()) as Box<dyn FnMut(f64)>);
        Self { callback }
    }
}

impl FrameHost for RafHost {
    fn request_frame(&mut self) -> FrameHandle {
        let Some(window) = web_sys::window() else {
            log::warn!("raf: no window, frame not scheduled");
            return FrameHandle(0);
        };
        match window.request_animation_frame(self.callback.as_ref().unchecked_ref()) {
            Ok(id) => FrameHandle(id as u32),
            Err(err) => {
                log::warn!("raf: requestAnimationFrame failed: {:?}", err);
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0 as i32);
        }
    }
}
