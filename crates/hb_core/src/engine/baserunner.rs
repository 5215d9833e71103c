//! Baserunner agent state.
//!
//! A runner occupies exactly one of the states below at any time. Progress
//! toward the target base is a percentage; while advancing it only ever
//! grows, and it resets when the runner rounds onto the next base path.

use serde::{Deserialize, Serialize};

use crate::models::outcome::Base;
use crate::models::player::RunnerAttributes;

use super::geometry::{self, Vec2};
use super::physics_constants::{baserunning, skills, tick};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerState {
    NotYetRunning,
    FullSpeed,
    /// Cautious advance pending an uncertain fielding attempt.
    Tentative,
    Retreating,
    OnBase,
    Out,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Runner {
    pub name: String,
    /// Base the runner is anchored to: the one to retreat to, and the one
    /// a tag-up must touch. `Home` marks the batter-runner.
    pub origin: Base,
    pub target: Base,
    pub pct: f32,
    pub state: RunnerState,
    /// Forced to advance because the batter became a runner behind them.
    pub forced: bool,
    /// Flipped on a caught fly; the runner must get back to `origin`.
    pub forced_to_retreat: bool,
    /// Cached beat-the-throw belief, refreshed by the decision module.
    pub believes_beat_throw: Option<bool>,
    /// Rounding decision made at the decision threshold; `None` until then.
    pub decided_round: Option<bool>,
    pub is_batter: bool,
    pub scored: bool,
    /// Clock time the runner last arrived safely at a base; feeds the
    /// umpire's timing margin when a throw comes in late.
    pub arrived_at_s: Option<f32>,
    pub attributes: RunnerAttributes,
}

impl Runner {
    pub fn new(name: String, origin: Base, target: Base, attrs: RunnerAttributes) -> Self {
        Self {
            name,
            origin,
            target,
            pct: 0.0,
            state: RunnerState::NotYetRunning,
            forced: false,
            forced_to_retreat: false,
            believes_beat_throw: None,
            decided_round: None,
            is_batter: origin == Base::Home,
            scored: false,
            arrived_at_s: None,
            attributes: attrs,
        }
    }

    /// Running speed in m/s. The batter-runner uses the calibrated
    /// home-to-first speed on the first leg; everyone else (and the batter
    /// past first) runs at top speed.
    pub fn speed_mps(&self) -> f32 {
        if self.is_batter && self.origin == Base::Home {
            skills::scale(
                self.attributes.home_to_first,
                baserunning::H2F_MIN_MPS,
                baserunning::H2F_SPAN_MPS,
            )
        } else {
            skills::scale(
                self.attributes.speed,
                baserunning::SPRINT_MIN_MPS,
                baserunning::SPRINT_SPAN_MPS,
            )
        }
    }

    /// Progress gained in one tick at full speed.
    pub fn full_step_pct(&self) -> f32 {
        self.speed_mps() * tick::DT / baserunning::BASE_GAP_M
    }

    /// Field position interpolated along the basepath.
    pub fn field_pos(&self) -> Vec2 {
        let from = geometry::base_position(self.anchor_base());
        let to = geometry::base_position(self.target);
        from.lerp(to, self.pct)
    }

    /// The base progress is measured from (home for the batter's first leg).
    fn anchor_base(&self) -> Base {
        if self.is_batter && self.origin == Base::Home {
            Base::Home
        } else {
            self.origin
        }
    }

    /// Seconds to finish the advance at full speed.
    pub fn time_to_target_s(&self) -> f32 {
        (1.0 - self.pct).max(0.0) * baserunning::BASE_GAP_M / self.speed_mps()
    }

    /// Seconds to get back to the origin base at full speed.
    pub fn time_to_retreat_s(&self) -> f32 {
        self.pct.max(0.0) * baserunning::BASE_GAP_M / self.speed_mps()
    }

    pub fn is_advancing(&self) -> bool {
        matches!(
            self.state,
            RunnerState::FullSpeed | RunnerState::Tentative | RunnerState::NotYetRunning
        )
    }

    /// Settled means the play no longer waits on this runner.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, RunnerState::OnBase | RunnerState::Out)
    }
}
