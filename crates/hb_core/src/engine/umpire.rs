//! Umpire adjudication.
//!
//! Every call family follows the same shape: compute a ground-truth
//! signed timing or distance margin, push it through the umpire's bias
//! chain (tie policy, positional bias, a resampled inconsistency term),
//! then threshold at zero. The unbiased outcome rides along with the
//! called one so collaborators can score call accuracy.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::models::outcome::Base;
use crate::models::player::{Count, Handedness};

use super::physics_constants::{skills, umpire};

/// Per-umpire constants, generated once at creation and immutable after.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UmpireProfile {
    /// Probability a dead-even timing call goes to the runner.
    pub tie_goes_to_runner_pct: f32,
    /// Anticipation bias at first base only (s). Positive leans "out":
    /// the umpire hears the ball into the mitt before he sees the foot.
    pub first_base_prior_entry_bias_s: f32,
    /// Standard deviation of the inconsistency resample (s for timing
    /// calls, m for pitch calls).
    pub inconsistency_sd: f32,
    /// Per-edge zone biases (m); positive widens that edge.
    pub edge_bias_inside_m: f32,
    pub edge_bias_outside_m: f32,
    pub edge_bias_top_m: f32,
    pub edge_bias_bottom_m: f32,
    /// Meters of zone width per unit of count leverage (balls minus
    /// strikes); umpires widen the zone when a walk is imminent and
    /// tighten it ahead in the count.
    pub count_bias_m: f32,
    /// Compensation after the previous call (m); applied opposite the
    /// last call's direction.
    pub previous_call_bias_m: f32,
    /// Zone expansion when the home pitcher is throwing (m).
    pub home_team_bias_m: f32,
    /// Horizontal zone shift against left-handed batters (m).
    pub handedness_bias_m: f32,
    /// How much catcher framing moves this umpire's perception (0-1).
    pub framing_susceptibility: f32,
}

impl UmpireProfile {
    /// Draw a fresh profile. Done once per umpire at creation.
    pub fn generate(rng: &mut ChaCha8Rng) -> Self {
        Self {
            tie_goes_to_runner_pct: rng.gen_range(0.5..0.9),
            first_base_prior_entry_bias_s: rng.gen_range(-0.01..0.04),
            inconsistency_sd: rng.gen_range(0.015..0.05),
            edge_bias_inside_m: rng.gen_range(-0.02..0.02),
            edge_bias_outside_m: rng.gen_range(-0.02..0.03),
            edge_bias_top_m: rng.gen_range(-0.03..0.02),
            edge_bias_bottom_m: rng.gen_range(-0.02..0.02),
            count_bias_m: rng.gen_range(0.004..0.018),
            previous_call_bias_m: rng.gen_range(0.0..0.012),
            home_team_bias_m: rng.gen_range(0.0..0.01),
            handedness_bias_m: rng.gen_range(-0.02..0.02),
            framing_susceptibility: rng.gen_range(0.0..1.0),
        }
    }

    /// A perfectly unbiased, perfectly consistent umpire. Useful in tests
    /// where only physics should decide.
    pub fn neutral() -> Self {
        Self {
            tie_goes_to_runner_pct: 0.5,
            first_base_prior_entry_bias_s: 0.0,
            inconsistency_sd: 0.0,
            edge_bias_inside_m: 0.0,
            edge_bias_outside_m: 0.0,
            edge_bias_top_m: 0.0,
            edge_bias_bottom_m: 0.0,
            count_bias_m: 0.0,
            previous_call_bias_m: 0.0,
            home_team_bias_m: 0.0,
            handedness_bias_m: 0.0,
            framing_susceptibility: 0.0,
        }
    }
}

/// Outcome of a timing adjudication (safe/out, catch/trap). The true
/// outcome is retained so call correctness can be scored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TimingCall {
    pub called_out: bool,
    pub true_out: bool,
    /// Ground-truth margin in seconds; positive means the defense won it.
    pub margin_s: f32,
}

impl TimingCall {
    pub fn was_correct(&self) -> bool {
        self.called_out == self.true_out
    }
}

/// A pitch as the umpire experiences it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PitchObservation {
    /// True crossing coordinates at the front of the plate (m); x is
    /// lateral from the plate center, z is height.
    pub cross_x_m: f32,
    pub cross_z_m: f32,
    pub count: Count,
    /// Previous pitch's call in this plate appearance, if any.
    pub previous_call_was_strike: Option<bool>,
    pub batter_hand: Handedness,
    pub pitcher_is_home: bool,
    /// Catcher's framing skill, 0-100.
    pub catcher_framing: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PitchCall {
    pub called_strike: bool,
    pub true_strike: bool,
    /// The crossing point after framing distorted it (m).
    pub perceived_x_m: f32,
    pub perceived_z_m: f32,
}

impl PitchCall {
    pub fn was_correct(&self) -> bool {
        self.called_strike == self.true_strike
    }
}

impl UmpireProfile {
    /// Adjudicate a timing play at a base. `runner_minus_ball_s` is the
    /// ground truth: positive when the runner arrived after the ball.
    pub fn call_timing(
        &self,
        rng: &mut ChaCha8Rng,
        base: Option<Base>,
        runner_minus_ball_s: f32,
    ) -> TimingCall {
        let true_out = runner_minus_ball_s > 0.0;

        // Dead heats go straight to the tie policy; no bias chain.
        if runner_minus_ball_s.abs() < umpire::TIE_EPS_S {
            let safe = rng.gen::<f32>() < self.tie_goes_to_runner_pct;
            return TimingCall {
                called_out: !safe,
                true_out,
                margin_s: runner_minus_ball_s,
            };
        }

        let mut biased = runner_minus_ball_s;
        if base == Some(Base::First) {
            biased += self.first_base_prior_entry_bias_s;
        }
        let sampled = self.resample(rng, biased);
        TimingCall {
            called_out: sampled > 0.0,
            true_out,
            margin_s: runner_minus_ball_s,
        }
    }

    /// Fly-catch versus trap. `glove_before_threshold_s` is positive when
    /// the glove beat the relevant bounce (first bounce under modern
    /// rules, second under the bound rule).
    pub fn call_catch(&self, rng: &mut ChaCha8Rng, glove_before_threshold_s: f32) -> TimingCall {
        let sampled = self.resample(rng, glove_before_threshold_s);
        TimingCall {
            called_out: sampled > 0.0,
            true_out: glove_before_threshold_s > 0.0,
            margin_s: glove_before_threshold_s,
        }
    }

    /// Ball or strike. Framing, count, previous call, handedness and home
    /// bias all distort the *perceived* pitch before the umpire's own
    /// edges are applied; the true outcome uses the rulebook zone on the
    /// true coordinates.
    pub fn call_pitch(&self, rng: &mut ChaCha8Rng, obs: &PitchObservation) -> PitchCall {
        let true_strike = obs.cross_x_m.abs() <= umpire::ZONE_HALF_WIDTH_M
            && obs.cross_z_m >= umpire::ZONE_BOTTOM_M
            && obs.cross_z_m <= umpire::ZONE_TOP_M;

        // Framing pulls the perceived crossing toward the zone center.
        let pull = self.framing_susceptibility * skills::normalize(obs.catcher_framing) * 0.05;
        let zone_center_z = (umpire::ZONE_BOTTOM_M + umpire::ZONE_TOP_M) / 2.0;
        let perceived_x = obs.cross_x_m - obs.cross_x_m.signum() * pull.min(obs.cross_x_m.abs());
        let dz = obs.cross_z_m - zone_center_z;
        let perceived_z = obs.cross_z_m - dz.signum() * pull.min(dz.abs());

        // Zone expansion/contraction, applied to every edge symmetrically.
        let mut widen = self.count_bias_m * obs.count.leverage() as f32;
        if let Some(prev_strike) = obs.previous_call_was_strike {
            widen += if prev_strike {
                -self.previous_call_bias_m
            } else {
                self.previous_call_bias_m
            };
        }
        if obs.pitcher_is_home {
            widen += self.home_team_bias_m;
        }

        // Handedness shifts the whole zone laterally.
        let shift = match obs.batter_hand {
            Handedness::Left => self.handedness_bias_m,
            Handedness::Right => -self.handedness_bias_m,
        };

        let left = -umpire::ZONE_HALF_WIDTH_M - widen - self.edge_bias_inside_m + shift;
        let right = umpire::ZONE_HALF_WIDTH_M + widen + self.edge_bias_outside_m + shift;
        let bottom = umpire::ZONE_BOTTOM_M - widen - self.edge_bias_bottom_m;
        let top = umpire::ZONE_TOP_M + widen + self.edge_bias_top_m;

        // Positive margin: perceived pitch inside the biased zone.
        let margin = (perceived_x - left)
            .min(right - perceived_x)
            .min(perceived_z - bottom)
            .min(top - perceived_z);

        let sampled = self.resample(rng, margin);
        PitchCall {
            called_strike: sampled > 0.0,
            true_strike,
            perceived_x_m: perceived_x,
            perceived_z_m: perceived_z,
        }
    }

    /// General inconsistency: a fresh normal draw centered on the biased
    /// value. With zero standard deviation the biased value passes
    /// through untouched.
    fn resample(&self, rng: &mut ChaCha8Rng, biased: f32) -> f32 {
        if self.inconsistency_sd <= 0.0 {
            return biased;
        }
        let normal = Normal::new(biased, self.inconsistency_sd).expect("finite sd");
        normal.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_neutral_umpire_calls_truth() {
        let ump = UmpireProfile::neutral();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let late = ump.call_timing(&mut rng, Some(Base::Second), 0.3);
        assert!(late.called_out && late.true_out);
        let early = ump.call_timing(&mut rng, Some(Base::Second), -0.3);
        assert!(!early.called_out && !early.true_out);
    }

    #[test]
    fn test_tie_policy_converges_to_profile() {
        let mut ump = UmpireProfile::neutral();
        ump.tie_goes_to_runner_pct = 0.7;
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let trials = 10_000;
        let mut safe = 0;
        for _ in 0..trials {
            let call = ump.call_timing(&mut rng, Some(Base::First), 0.0);
            if !call.called_out {
                safe += 1;
            }
        }
        let rate = safe as f32 / trials as f32;
        assert!((rate - 0.7).abs() < 0.02, "tie-safe rate {}", rate);
    }

    #[test]
    fn test_first_base_prior_entry_bias_leans_out() {
        let mut ump = UmpireProfile::neutral();
        ump.first_base_prior_entry_bias_s = 0.05;
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Runner truly safe by 30ms, inside the bias but outside the tie
        // window: the umpire rings him up anyway, and the record keeps
        // the truth.
        let call = ump.call_timing(&mut rng, Some(Base::First), -0.03);
        assert!(call.called_out);
        assert!(!call.true_out);
        assert!(!call.was_correct());
        // The same margin anywhere else is called correctly.
        let call2 = ump.call_timing(&mut rng, Some(Base::Second), -0.03);
        assert!(!call2.called_out);
    }

    #[test]
    fn test_pitch_down_the_middle() {
        let ump = UmpireProfile::neutral();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let obs = PitchObservation {
            cross_x_m: 0.0,
            cross_z_m: 0.8,
            count: Count::new(1, 1),
            previous_call_was_strike: None,
            batter_hand: Handedness::Right,
            pitcher_is_home: false,
            catcher_framing: 50.0,
        };
        let call = ump.call_pitch(&mut rng, &obs);
        assert!(call.called_strike && call.true_strike);
    }

    #[test]
    fn test_framing_steals_the_edge() {
        let mut ump = UmpireProfile::neutral();
        ump.framing_susceptibility = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        // A ball one centimeter off the plate, caught by an elite framer.
        let obs = PitchObservation {
            cross_x_m: umpire::ZONE_HALF_WIDTH_M + 0.01,
            cross_z_m: 0.8,
            count: Count::new(1, 1),
            previous_call_was_strike: None,
            batter_hand: Handedness::Right,
            pitcher_is_home: false,
            catcher_framing: 100.0,
        };
        let call = ump.call_pitch(&mut rng, &obs);
        assert!(!call.true_strike);
        assert!(call.called_strike, "framed edge pitch should be stolen");
        assert!(call.perceived_x_m < obs.cross_x_m);
    }

    #[test]
    fn test_count_leverage_widens_zone() {
        let mut ump = UmpireProfile::neutral();
        ump.count_bias_m = 0.015;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        // Just off the plate: a ball at 1-1, a strike at 3-0.
        let mut obs = PitchObservation {
            cross_x_m: umpire::ZONE_HALF_WIDTH_M + 0.02,
            cross_z_m: 0.8,
            count: Count::new(1, 1),
            previous_call_was_strike: None,
            batter_hand: Handedness::Right,
            pitcher_is_home: false,
            catcher_framing: 0.0,
        };
        let even = ump.call_pitch(&mut rng, &obs);
        assert!(!even.called_strike);
        obs.count = Count::new(3, 0);
        let three_oh = ump.call_pitch(&mut rng, &obs);
        assert!(three_oh.called_strike);
    }

    #[test]
    fn test_profile_generation_is_seeded() {
        let a = UmpireProfile::generate(&mut ChaCha8Rng::seed_from_u64(11));
        let b = UmpireProfile::generate(&mut ChaCha8Rng::seed_from_u64(11));
        assert_eq!(a.tie_goes_to_runner_pct, b.tie_goes_to_runner_pct);
        assert_eq!(a.inconsistency_sd, b.inconsistency_sd);
    }
}
