/// Fixed-step simulation clock.
/// Every tick advances by the same nominal `dt`; frame time is never measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    /// The fixed delta time per tick.
    dt: f64,
    /// Ticks delivered since the last reset.
    ticks: u64,
}

impl FixedStep {
    pub fn new(dt: f64) -> Self {
        Self { dt, ticks: 0 }
    }

    /// Count one tick. Returns the index of the tick just taken (first is 1).
    pub fn advance(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }

    /// Simulated time since reset. Derived from the tick count so it never drifts.
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.dt
    }

    /// Ticks taken since reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }
}
