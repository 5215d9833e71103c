//! Fielder agent state.
//!
//! Each fielder carries a tagged intent variant instead of a pile of
//! booleans, so states like "two fielders both playing the ball" are
//! unrepresentable; the assignment board in the orchestrator is the only
//! writer of intents.

use serde::{Deserialize, Serialize};

use crate::models::outcome::Base;
use crate::models::player::{FieldPosition, FielderAttributes, FielderCard};

use super::geometry::{self, Vec2};
use super::physics_constants::{fielding, skills, tick};

/// What a fielder is doing right now. Exactly one intent at a time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FielderIntent {
    Idle,
    /// Chasing the batted ball to field it.
    PlayingBall,
    CoveringBase(Base),
    /// Trailing a teammate or a base in case of an overthrow.
    BackingUp(FieldPosition),
    /// Positioned to shorten a long outfield throw.
    Relay,
    /// Holding the ball, deciding or winding up.
    Throwing,
    /// Carrying the ball to a base for an unassisted putout.
    RunningToBase(Base),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fielder {
    pub name: String,
    pub position: FieldPosition,
    pub loc: Vec2,
    pub intent: FielderIntent,
    /// Where this fielder is headed; `None` means hold position.
    pub goal: Option<Vec2>,
    /// Set after a fielding miss; no re-attempt until the clock passes it.
    pub reorient_until_s: f32,
    pub has_ball: bool,
    /// Set when a teammate took the ball away this play.
    pub called_off: bool,
    pub attributes: FielderAttributes,
}

impl Fielder {
    pub fn from_card(card: &FielderCard) -> Self {
        Self {
            name: card.name.clone(),
            position: card.position,
            loc: geometry::fielder_station(card.position),
            intent: FielderIntent::Idle,
            goal: None,
            reorient_until_s: 0.0,
            has_ball: false,
            called_off: false,
            attributes: card.attributes,
        }
    }

    /// Sprint speed from the 0-100 rating (m/s).
    pub fn sprint_mps(&self) -> f32 {
        skills::scale(
            self.attributes.speed,
            fielding::SPRINT_MIN_MPS,
            fielding::SPRINT_SPAN_MPS,
        )
    }

    /// Distance covered in one tick.
    pub fn step_budget_m(&self) -> f32 {
        self.sprint_mps() * tick::DT
    }

    /// Straight-line time to reach a point at sprint speed.
    pub fn time_to_reach_s(&self, p: Vec2) -> f32 {
        self.loc.distance(p) / self.sprint_mps()
    }

    /// One tick of movement toward the goal, snapping onto it once within
    /// a single step so the fielder never oscillates past the target.
    pub fn move_step(&mut self) {
        if let Some(goal) = self.goal {
            self.loc = self.loc.step_toward(goal, self.step_budget_m());
        }
    }

    pub fn at_goal(&self) -> bool {
        match self.goal {
            Some(goal) => self.loc.distance(goal) < 1e-3,
            None => true,
        }
    }

    /// Whether this fielder may attempt a fielding act right now.
    pub fn ready_to_attempt(&self, clock_s: f32) -> bool {
        clock_s >= self.reorient_until_s
    }

    /// Lock out re-attempts after a miss; better defenders recover sooner.
    pub fn start_reorientation(&mut self, clock_s: f32) {
        let skill = skills::normalize(self.attributes.fielding).max(0.2);
        self.reorient_until_s = clock_s + fielding::REORIENT_BASE_S / (0.5 + skill);
    }

    pub fn is_playing_ball(&self) -> bool {
        self.intent == FielderIntent::PlayingBall
    }
}
