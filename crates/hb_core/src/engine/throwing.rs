//! Thrown-ball model.
//!
//! A throw is a directed projectile from one fielder to a base (or a
//! relay man). Flight time comes from repeatedly decaying velocity 1% per
//! 0.1s step and accumulating distance; this is deliberately the same
//! estimator fielders and runners use for their beliefs, so decisions and
//! physics can never disagree about how long a throw takes.

use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::models::outcome::Base;
use crate::models::player::{FieldPosition, FielderAttributes};

use super::geometry::Vec2;
use super::physics_constants::{skills, throwing, tick, units};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Throw {
    pub from: FieldPosition,
    pub receiver: FieldPosition,
    pub target_base: Base,
    pub origin: Vec2,
    pub dest: Vec2,
    pub distance_m: f32,
    /// Wind-up plus transfer before the ball leaves the hand (s).
    pub release_time_s: f32,
    /// Remaining release time; the throw is in-hand until this hits zero.
    release_left_s: f32,
    speed_mps: f32,
    covered_m: f32,
    /// Lateral/vertical error drawn at release from the thrower's
    /// accuracy. Off-line throws cost the receiver handling time.
    pub lateral_error_m: f32,
    pub vertical_error_m: f32,
    pub resolved: bool,
    pub is_relay: bool,
}

impl Throw {
    /// Create a throw and draw its release error from the thrower's
    /// accuracy rating. `dest` is where the receiver wants the ball.
    pub fn new(
        rng: &mut ChaCha8Rng,
        from: FieldPosition,
        attrs: &FielderAttributes,
        origin: Vec2,
        receiver: FieldPosition,
        target_base: Base,
        dest: Vec2,
        is_relay: bool,
    ) -> Self {
        let distance_m = origin.distance(dest);
        let sigma = error_sigma_m(distance_m, attrs.throw_accuracy);
        let (lat, vert) = if sigma > 0.0 {
            let normal = Normal::new(0.0, sigma).expect("sigma is finite and positive");
            (normal.sample(rng), normal.sample(rng))
        } else {
            (0.0, 0.0)
        };

        Self {
            from,
            receiver,
            target_base,
            origin,
            dest,
            distance_m,
            release_time_s: release_time_s(distance_m, attrs.release_quickness),
            release_left_s: release_time_s(distance_m, attrs.release_quickness),
            speed_mps: attrs.arm_strength_mph * units::MPH_TO_MPS,
            covered_m: 0.0,
            lateral_error_m: lat,
            vertical_error_m: vert,
            resolved: false,
            is_relay,
        }
    }

    /// Advance one engine tick. Resolves once the accumulated distance
    /// covers the target distance.
    pub fn step(&mut self, dt: f32) {
        if self.resolved {
            return;
        }
        if self.release_left_s > 0.0 {
            self.release_left_s -= dt;
            return;
        }
        self.covered_m += self.speed_mps * dt;
        self.speed_mps *= throwing::DECAY_PER_STEP;
        if self.covered_m >= self.distance_m {
            self.covered_m = self.distance_m;
            self.resolved = true;
        }
    }

    pub fn percent_to_target(&self) -> f32 {
        if self.distance_m < f32::EPSILON {
            return 1.0;
        }
        (self.covered_m / self.distance_m).clamp(0.0, 1.0)
    }

    pub fn current_pos(&self) -> Vec2 {
        self.origin.lerp(self.dest, self.percent_to_target())
    }

    /// Remaining time to the target, including any unspent release time.
    pub fn eta_s(&self) -> f32 {
        self.release_left_s.max(0.0)
            + flight_time_s(self.distance_m - self.covered_m, self.speed_mps)
    }

    /// True when the receiver has to leave the bag or scramble for it.
    pub fn is_wild(&self) -> bool {
        self.lateral_error_m.abs() + self.vertical_error_m.abs()
            > throwing::CLEAN_CATCH_TOLERANCE_M
    }

    /// Receiver handling delay caused by an off-line throw.
    pub fn handling_delay_s(&self) -> f32 {
        if self.is_wild() {
            throwing::WILD_RECOVERY_S
        } else {
            0.0
        }
    }
}

/// Release time grows with the square root of distance, scaled by the
/// thrower's quickness.
pub fn release_time_s(distance_m: f32, release_quickness: f32) -> f32 {
    let q = skills::normalize(release_quickness);
    let mult = throwing::RELEASE_SLOWEST + (throwing::RELEASE_FASTEST - throwing::RELEASE_SLOWEST) * q;
    throwing::RELEASE_COEF * distance_m.max(0.0).sqrt() * mult
}

/// Flight time from the decay model: velocity loses 1% per 0.1s step
/// while distance accumulates.
pub fn flight_time_s(distance_m: f32, speed_mps: f32) -> f32 {
    if distance_m <= 0.0 {
        return 0.0;
    }
    if speed_mps <= 1.0 {
        // A throw this weak is never attempted; treat as unreachable.
        return f32::INFINITY;
    }
    let mut covered = 0.0;
    let mut v = speed_mps;
    let mut t = 0.0;
    while covered < distance_m {
        covered += v * tick::DT;
        v *= throwing::DECAY_PER_STEP;
        t += tick::DT;
        if t > 30.0 {
            return f32::INFINITY;
        }
    }
    t
}

/// Estimated total time for a hypothetical throw: release plus flight.
pub fn estimate_throw_s(distance_m: f32, arm_mph: f32, release_quickness: f32) -> f32 {
    release_time_s(distance_m, release_quickness) + flight_time_s(distance_m, arm_mph * units::MPH_TO_MPS)
}

/// Standard deviation of throw error at a given distance and accuracy.
fn error_sigma_m(distance_m: f32, throw_accuracy: f32) -> f32 {
    let a = skills::normalize(throw_accuracy);
    let mult = throwing::ERROR_WORST + (throwing::ERROR_BEST - throwing::ERROR_WORST) * a;
    distance_m.max(0.0) * throwing::ERROR_SIGMA_PER_M * mult
}

/// How a putout is being attempted at a base: with a throw, or by a
/// fielder carrying the ball there on foot.
#[derive(Clone, Debug)]
pub enum PutoutAttempt {
    Thrown(Throw),
    OnFoot(FieldPosition),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn attrs() -> FielderAttributes {
        FielderAttributes::average()
    }

    #[test]
    fn test_flight_time_monotonic_in_distance() {
        let v = 80.0 * units::MPH_TO_MPS;
        let short = flight_time_s(20.0, v);
        let long = flight_time_s(60.0, v);
        assert!(long > short);
    }

    #[test]
    fn test_release_time_scales_with_sqrt_distance() {
        let quick = release_time_s(36.0, 60.0);
        let longer = release_time_s(81.0, 60.0);
        // sqrt(81)/sqrt(36) = 1.5
        assert!((longer / quick - 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_throw_resolves_and_tracks_progress() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut throw = Throw::new(
            &mut rng,
            FieldPosition::Shortstop,
            &attrs(),
            Vec2::new(-11.0, 40.0),
            FieldPosition::FirstBase,
            Base::First,
            Vec2::new(19.4, 19.4),
            false,
        );
        let mut last_pct = 0.0;
        let mut guard = 0;
        while !throw.resolved && guard < 200 {
            throw.step(tick::DT);
            let pct = throw.percent_to_target();
            assert!(pct >= last_pct);
            last_pct = pct;
            guard += 1;
        }
        assert!(throw.resolved);
        assert!((throw.percent_to_target() - 1.0).abs() < 1e-6);
        let end = throw.current_pos();
        assert!(end.distance(throw.dest) < 1e-3);
    }

    #[test]
    fn test_error_grows_with_distance() {
        assert!(error_sigma_m(60.0, 50.0) > error_sigma_m(15.0, 50.0));
        assert!(error_sigma_m(40.0, 95.0) < error_sigma_m(40.0, 20.0));
    }

    #[test]
    fn test_same_seed_same_error() {
        let mk = || {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            Throw::new(
                &mut rng,
                FieldPosition::CenterField,
                &attrs(),
                Vec2::new(0.0, 97.0),
                FieldPosition::SecondBase,
                Base::Second,
                Vec2::new(0.0, 38.8),
                false,
            )
        };
        let a = mk();
        let b = mk();
        assert_eq!(a.lateral_error_m, b.lateral_error_m);
        assert_eq!(a.vertical_error_m, b.vertical_error_m);
    }
}
