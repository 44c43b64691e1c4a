//! Once-per-refresh tick scheduling, decoupled from any drawing surface.
//!
//! A [`FrameHost`] is the environment's register/cancel primitive (for the
//! browser, `requestAnimationFrame`). [`FrameScheduler`] owns the start/stop
//! semantics on top of it: at most one registration is pending at a time,
//! `stop` cancels it, and a tick that fires after `stop` reports inactive.

/// Opaque id of a pending frame registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u32);

/// Register and cancel a callback invoked once per display refresh.
pub trait FrameHost {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Start/stop/cancel bookkeeping for one simulation.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    active: bool,
    pending: Option<FrameHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The registration that will deliver the next tick, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Begin issuing ticks. Returns false (and registers nothing) when already active.
    pub fn start(&mut self, host: &mut dyn FrameHost) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        if self.pending.is_none() {
            self.pending = Some(host.request_frame());
        }
        true
    }

    /// Stop issuing ticks and cancel the pending registration. Idempotent.
    pub fn stop(&mut self, host: &mut dyn FrameHost) {
        self.active = false;
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
    }

    /// A registered frame fired. Returns whether the tick should run.
    pub fn begin_frame(&mut self) -> bool {
        self.pending = None;
        self.active
    }

    /// Register for the next refresh if still active.
    pub fn end_frame(&mut self, host: &mut dyn FrameHost) {
        if self.active && self.pending.is_none() {
            self.pending = Some(host.request_frame());
        }
    }
}

/// Deterministic host: frames fire only when the owner pumps them.
/// Used natively (headless runs) and in tests.
#[derive(Debug, Default)]
pub struct ManualHost {
    next_id: u32,
    pending: Vec<FrameHandle>,
    cancelled: usize,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrations waiting for the next refresh.
    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Total registrations cancelled so far.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    /// Simulate up to `frames` display refreshes. Each refresh fires every
    /// registration pending at its start. Stops early once nothing is pending.
    /// Returns the number of callbacks delivered.
    pub fn pump(&mut self, frames: usize, mut on_frame: impl FnMut(&mut Self)) -> usize {
        let mut delivered = 0;
        for _ in 0..frames {
            let due = std::mem::take(&mut self.pending);
            if due.is_empty() {
                break;
            }
            for _ in due {
                on_frame(&mut *self);
                delivered += 1;
            }
        }
        delivered
    }
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(idx) = self.pending.iter().position(|h| *h == handle) {
            self.pending.remove(idx);
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_registers_one_frame() {
        let mut host = ManualHost::new();
        let mut sched = FrameScheduler::new();
        assert!(sched.start(&mut host));
        assert_eq!(host.pending().len(), 1);
        assert_eq!(sched.pending(), Some(host.pending()[0]));
    }

    #[test]
    fn second_start_is_a_no_op() {
        let mut host = ManualHost::new();
        let mut sched = FrameScheduler::new();
        sched.start(&mut host);
        assert!(!sched.start(&mut host));
        assert_eq!(host.pending().len(), 1);
    }

    #[test]
    fn stop_cancels_pending_and_is_idempotent() {
        let mut host = ManualHost::new();
        let mut sched = FrameScheduler::new();
        sched.start(&mut host);
        sched.stop(&mut host);
        sched.stop(&mut host);
        assert!(host.pending().is_empty());
        assert_eq!(host.cancelled(), 1);
        assert!(!sched.is_active());
    }

    #[test]
    fn frames_keep_coming_while_active() {
        let mut host = ManualHost::new();
        let mut sched = FrameScheduler::new();
        sched.start(&mut host);
        let delivered = host.pump(5, |host| {
            if sched.begin_frame() {
                sched.end_frame(host);
            }
        });
        assert_eq!(delivered, 5);
        assert_eq!(host.pending().len(), 1);
    }

    #[test]
    fn late_frame_after_stop_reports_inactive() {
        let mut host = ManualHost::new();
        let mut sched = FrameScheduler::new();
        sched.start(&mut host);
        // Host delivered the callback before the cancel reached it.
        sched.active = false;
        assert!(!sched.begin_frame());
        sched.end_frame(&mut host);
        assert!(sched.pending().is_none());
    }
}
