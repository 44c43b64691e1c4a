//! The eight teaching scenarios. Each module holds a parameter set, a state
//! record, the integrator and event detector, and the derived metrics.

pub mod circular;
pub mod collision;
pub mod lab;
pub mod orbit;
pub mod pendulum;
pub mod projectile;
pub mod ramp;
pub mod spring;
pub mod waves;

/// Denominators at or below this magnitude are treated as collapsed.
pub(crate) const MIN_DENOMINATOR: f64 = 1e-9;

/// `2π · sqrt(num / den)`, or `None` when the ratio is undefined.
pub(crate) fn oscillation_period(num: f64, den: f64) -> Option<f64> {
    if den <= MIN_DENOMINATOR || num < 0.0 {
        return None;
    }
    Some(std::f64::consts::TAU * (num / den).sqrt())
}

/// Wrap an angle into `[0, 2π)`. `rem_euclid` alone rounds tiny negatives up to 2π.
pub(crate) fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

pub use circular::{Circular, CircularMetrics, CircularParams, CircularState};
pub use collision::{Body, Collision, CollisionMetrics, CollisionParams, CollisionState};
pub use lab::Lab;
pub use orbit::{Orbit, OrbitMetrics, OrbitParams, OrbitState};
pub use pendulum::{Pendulum, PendulumMetrics, PendulumParams, PendulumState};
pub use projectile::{Projectile, ProjectileMetrics, ProjectileParams, ProjectileState, Target};
pub use ramp::{Ramp, RampMetrics, RampParams, RampState};
pub use spring::{Spring, SpringMetrics, SpringParams, SpringState};
pub use waves::{WaveSample, Waves, WavesMetrics, WavesParams, WavesState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_of_unit_ratio_is_tau() {
        let t = oscillation_period(1.0, 1.0).unwrap();
        assert!((t - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn period_undefined_for_zero_denominator() {
        assert_eq!(oscillation_period(2.0, 0.0), None);
    }

    #[test]
    fn wrap_angle_stays_below_tau() {
        use std::f64::consts::TAU;
        assert_eq!(wrap_angle(-1e-17), 0.0);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert!((wrap_angle(-1.0) - (TAU - 1.0)).abs() < 1e-12);
        assert!((wrap_angle(7.0) - (7.0 - TAU)).abs() < 1e-12);
    }
}
