//! Baserunner decisions, one pass per tick, lead runner first.
//!
//! Runners reason about throws that do not exist yet: the beat-the-throw
//! estimator compares remaining running time against either the live
//! throw or a hypothetical one from a generic arm, minus a risk buffer
//! the runner's audacity eats into. Tentative advance keeps a runner
//! drifting off his base only while a catch-right-now lookahead says he
//! could still get back.

use crate::error::{PlayError, Result};
use crate::models::event::PlayEventKind;
use crate::models::outcome::Base;

use crate::engine::baserunner::RunnerState;
use crate::engine::batted_ball::BallClass;
use crate::engine::geometry;
use crate::engine::physics_constants::{baserunning, fielding, skills, throwing as throw_consts};
use crate::engine::throwing;

use super::PlayingAction;

impl PlayingAction {
    // =========================================================
    // Initial reads at the Live transition
    // =========================================================

    /// First read for every runner once the defense is live.
    pub(crate) fn init_runner_modes(&mut self) {
        let airborne_threat = self.catchable_in_air();

        for idx in 1..self.runners.len() {
            if airborne_threat {
                // Fielding in doubt: creep, ready to tag up.
                self.set_runner_state(idx, RunnerState::Tentative);
            } else if self.runners[idx].forced {
                self.take_off(idx);
            } else {
                let target = self.runners[idx].target;
                if self.evaluate_beat_throw(idx, target, 0.0) {
                    self.take_off(idx);
                }
            }
        }
    }

    /// Whether the assigned fielder can plausibly get under the ball
    /// before it lands.
    fn catchable_in_air(&self) -> bool {
        if self.ball.classify() == BallClass::GroundBall || !self.ball.airborne() {
            return false;
        }
        let Some(playing) = self.board.playing_ball() else {
            return false;
        };
        let Some(proj) = self.projection.as_ref() else {
            return false;
        };
        match self.intercept_for(playing) {
            Some((_, t)) => t <= proj.landing_time + fielding::INTERCEPT_SLACK_S,
            None => false,
        }
    }

    // =========================================================
    // Per-tick pass
    // =========================================================

    /// Advance every non-waiting runner, lead runner first: trailing
    /// runners read what the runner ahead of them just did this tick.
    pub(crate) fn advance_runners(&mut self) -> Result<()> {
        let mut order: Vec<usize> = (0..self.runners.len()).collect();
        order.sort_by_key(|&i| match self.runners[i].origin {
            Base::Third => 0,
            Base::Second => 1,
            Base::First => 2,
            Base::Home => 3,
        });
        for idx in order {
            if !self.runners[idx].is_settled() {
                self.decide_runner(idx)?;
            }
        }
        Ok(())
    }

    fn decide_runner(&mut self, idx: usize) -> Result<()> {
        match self.runners[idx].state {
            RunnerState::NotYetRunning => {
                // Holding on the bag; keep re-reading the play.
                let target = self.runners[idx].target;
                if self.runners[idx].forced && !self.runners[idx].forced_to_retreat {
                    self.take_off(idx);
                } else if self.evaluate_beat_throw(idx, target, 0.0) {
                    self.take_off(idx);
                } else if self.holder.is_some() {
                    // Ball secured and the runner never liked the odds;
                    // he stays put for good.
                    self.runners[idx].state = RunnerState::OnBase;
                }
                Ok(())
            }
            RunnerState::FullSpeed => self.full_speed_step(idx),
            RunnerState::Tentative => {
                self.tentative_step(idx);
                Ok(())
            }
            RunnerState::Retreating => self.retreat_step(idx),
            RunnerState::OnBase | RunnerState::Out => Ok(()),
        }
    }

    fn full_speed_step(&mut self, idx: usize) -> Result<()> {
        let step = self.runners[idx].full_step_pct();
        {
            let runner = &mut self.runners[idx];
            runner.pct = (runner.pct + step).min(1.0);
        }

        let (pct, target, decided) = {
            let r = &self.runners[idx];
            (r.pct, r.target, r.decided_round)
        };

        if pct > baserunning::ROUND_DECISION_PCT && decided.is_none() && target != Base::Home {
            self.decide_rounding(idx);
        }
        if self.runners[idx].pct >= 1.0 {
            self.arrive(idx)?;
        }
        Ok(())
    }

    /// Arrival at the target base: score, round onto the next leg, or
    /// settle on the bag.
    fn arrive(&mut self, idx: usize) -> Result<()> {
        let target = self.runners[idx].target;

        if target == Base::Home {
            let name = self.runners[idx].name.clone();
            self.run_queue.push((idx, self.clock_s));
            let runner = &mut self.runners[idx];
            runner.scored = true;
            runner.state = RunnerState::OnBase;
            runner.arrived_at_s = Some(self.clock_s);
            self.events
                .push(self.tick, PlayEventKind::RunScored { runner: name });
            return Ok(());
        }

        if self.runners[idx].decided_round == Some(true) {
            let name = self.runners[idx].name.clone();
            let runner = &mut self.runners[idx];
            runner.origin = target;
            runner.target = target.next().expect("rounding never happens at home");
            runner.pct = 0.0;
            runner.decided_round = None;
            runner.believes_beat_throw = None;
            self.events.push(
                self.tick,
                PlayEventKind::RunnerRounded {
                    runner: name,
                    past: target,
                },
            );
            return Ok(());
        }

        self.settle_on(idx, target)
    }

    /// Put a runner safely on a base slot; a doubly-claimed slot means
    /// runner serialization failed somewhere upstream.
    fn settle_on(&mut self, idx: usize, base: Base) -> Result<()> {
        let slot = base
            .slot()
            .ok_or_else(|| PlayError::InvariantViolation("settling at home".into()))?;
        if let Some(other) = self.slots[slot] {
            if other != idx {
                return Err(PlayError::InvariantViolation(format!(
                    "{} and {} both assigned to {}",
                    self.runners[other].name,
                    self.runners[idx].name,
                    base.code()
                )));
            }
        }
        self.slots[slot] = Some(idx);
        let name = self.runners[idx].name.clone();
        let clock = self.clock_s;
        let runner = &mut self.runners[idx];
        let was_tagging_up = runner.forced_to_retreat;
        // A completed tag-up leaves the runner free to advance again at
        // his own risk; anyone else settling is done for the play.
        runner.state = if was_tagging_up {
            RunnerState::NotYetRunning
        } else {
            RunnerState::OnBase
        };
        runner.origin = base;
        runner.target = base.next().unwrap_or(base);
        runner.pct = 0.0;
        runner.arrived_at_s = Some(clock);
        runner.forced_to_retreat = false;
        self.events
            .push(self.tick, PlayEventKind::RunnerSafe { runner: name, base });
        Ok(())
    }

    /// The rounding decision, made once past the decision threshold.
    /// Advancement is serialized: a runner only rounds when the runner
    /// ahead is not blocked, so two runners never formally occupy the
    /// same base.
    fn decide_rounding(&mut self, idx: usize) {
        let (target, pct) = (self.runners[idx].target, self.runners[idx].pct);
        let next = match target.next() {
            Some(n) => n,
            None => {
                self.runners[idx].decided_round = Some(false);
                return;
            }
        };

        let preceding_blocked = self.preceding_blocked(idx, target);
        let headed_outfield =
            self.landing_estimate().y > fielding::INFIELD_DEPTH_M && self.ball.launched_fair();
        let ball_unfielded = self.ball.fielded_by().is_none() && self.holder.is_none();

        if !preceding_blocked && ball_unfielded && headed_outfield {
            // Extra distance: the full next leg on top of what's left.
            if self.evaluate_beat_throw(idx, next, 1.0) {
                self.runners[idx].decided_round = Some(true);
                return;
            }
        }

        if pct > baserunning::HOLD_PCT {
            let name = self.runners[idx].name.clone();
            self.runners[idx].decided_round = Some(false);
            self.events
                .push(self.tick, PlayEventKind::RunnerHeld { runner: name, at_pct: pct });
        } else if !ball_unfielded || !headed_outfield {
            self.runners[idx].decided_round = Some(false);
        }
        // Otherwise: preceding runner still in motion, keep the decision
        // open until the hold threshold.
    }

    /// A runner only rounds when the base he would round into is being
    /// vacated; this serializes advancement so two runners never formally
    /// occupy the same base.
    fn preceding_blocked(&self, idx: usize, my_target: Base) -> bool {
        let next = match my_target.next() {
            Some(n) => n,
            None => return true,
        };
        self.runners.iter().enumerate().any(|(j, other)| {
            if j == idx || other.state == RunnerState::Out || other.scored {
                return false;
            }
            // Sitting on, creeping off, or coming back to the base this
            // runner would round into.
            let anchored_to_next = other.origin == next
                && matches!(
                    other.state,
                    RunnerState::OnBase
                        | RunnerState::NotYetRunning
                        | RunnerState::Tentative
                        | RunnerState::Retreating
                );
            // Ahead on the next leg but committed to stopping there.
            let stopping_at_next = other.origin == my_target
                && other.state == RunnerState::FullSpeed
                && other.decided_round == Some(false);
            anchored_to_next || stopping_at_next
        })
    }

    /// Tentative advance: creep forward only while a catch-right-now
    /// lookahead says the runner could still retreat in time; otherwise
    /// hold in place pending resolution.
    fn tentative_step(&mut self, idx: usize) {
        let origin = self.runners[idx].origin;
        let aim = match self.board.playing_ball() {
            Some(playing) => match self.intercept_for(playing) {
                Some((p, _)) => p.ground(),
                None => self.ball.ground_pos(),
            },
            None => self.ball.ground_pos(),
        };
        let back_dist = aim.distance(geometry::base_position(origin));
        let hypo_throw = throwing::estimate_throw_s(back_dist, throw_consts::GENERIC_ARM_MPH, 50.0);
        let retreat = self.runners[idx].time_to_retreat_s();

        if retreat + baserunning::TENTATIVE_BUFFER_S < hypo_throw {
            let step = self.runners[idx].full_step_pct() * baserunning::TENTATIVE_FACTOR;
            self.runners[idx].pct = (self.runners[idx].pct + step).min(1.0);
            if self.runners[idx].pct > 0.0 {
                self.vacate_slot(idx);
            }
        }
        // Else: a no-op decision this tick; waiting is never blocking.
    }

    fn retreat_step(&mut self, idx: usize) -> Result<()> {
        let step = self.runners[idx].full_step_pct();
        let runner = &mut self.runners[idx];
        runner.pct = (runner.pct - step).max(0.0);
        if runner.pct <= 0.0 {
            let base = runner.origin;
            self.settle_on(idx, base)?;
        }
        Ok(())
    }

    // =========================================================
    // Event reactions
    // =========================================================

    /// The ball came down uncaught: tag-up pressure is off, forces are
    /// live again.
    pub(crate) fn on_ball_landed(&mut self) {
        for idx in 1..self.runners.len() {
            let state = self.runners[idx].state;
            if state != RunnerState::Tentative && state != RunnerState::NotYetRunning {
                continue;
            }
            self.runners[idx].forced_to_retreat = false;
            if self.runners[idx].forced {
                self.take_off(idx);
                continue;
            }
            let target = self.runners[idx].target;
            if self.evaluate_beat_throw(idx, target, 0.0) {
                self.take_off(idx);
            } else if self.runners[idx].pct > 0.0 {
                self.runners[idx].state = RunnerState::Retreating;
                let name = self.runners[idx].name.clone();
                let origin = self.runners[idx].origin;
                self.events.push(
                    self.tick,
                    PlayEventKind::RunnerRetreating {
                        runner: name,
                        toward: origin,
                    },
                );
            } else {
                // Never left the bag; nothing tentative left to wait on.
                self.runners[idx].state = RunnerState::NotYetRunning;
            }
        }
    }

    /// A miss or bobble: every runner not already at full speed
    /// re-evaluates immediately instead of waiting out the tick, with a
    /// misplay credit on the margin.
    pub(crate) fn on_defensive_misplay(&mut self) {
        for idx in 0..self.runners.len() {
            let state = self.runners[idx].state;
            let eligible = matches!(
                state,
                RunnerState::NotYetRunning | RunnerState::Tentative | RunnerState::Retreating
            );
            if !eligible || self.runners[idx].forced_to_retreat {
                continue;
            }
            let target = self.runners[idx].target;
            if self.evaluate_beat_throw_with_bonus(
                idx,
                target,
                0.0,
                baserunning::MISPLAY_EXTRA_MARGIN_S,
            ) {
                self.take_off(idx);
            }
        }
    }

    // =========================================================
    // Beat-the-throw estimation
    // =========================================================

    /// Would this runner beat a throw to `to_base`? Uses the live throw
    /// when one exists, otherwise models a hypothetical 75 mph arm from
    /// wherever the ball would be fielded. The runner's audacity eats
    /// into the risk buffer; a fully audacious runner accepts a negative
    /// margin.
    pub(crate) fn beat_throw_margin(&self, idx: usize, to_base: Base, extra_gaps: f32) -> f32 {
        let runner = &self.runners[idx];
        let remaining_pct = (1.0 - runner.pct).max(0.0) + extra_gaps;
        let runner_time = remaining_pct * baserunning::BASE_GAP_M / runner.speed_mps();

        let throw_time = match &self.throw {
            Some(t) if t.target_base == to_base => t.eta_s(),
            _ => {
                let source = match self.holder {
                    Some(h) => self.fielder(h).loc,
                    None => match self.board.playing_ball() {
                        Some(p) => match self.intercept_for(p) {
                            Some((point, _)) => point.ground(),
                            None => self.ball.ground_pos(),
                        },
                        None => self.ball.ground_pos(),
                    },
                };
                let dist = source.distance(geometry::base_position(to_base));
                throwing::estimate_throw_s(dist, throw_consts::GENERIC_ARM_MPH, 50.0)
            }
        };

        let audacity = skills::normalize(runner.attributes.audacity);
        let buffer =
            baserunning::RISK_BUFFER_BASE_S - audacity * baserunning::RISK_BUFFER_AUDACITY_S;
        throw_time - runner_time - buffer
    }

    fn evaluate_beat_throw(&mut self, idx: usize, to_base: Base, extra_gaps: f32) -> bool {
        self.evaluate_beat_throw_with_bonus(idx, to_base, extra_gaps, 0.0)
    }

    fn evaluate_beat_throw_with_bonus(
        &mut self,
        idx: usize,
        to_base: Base,
        extra_gaps: f32,
        bonus_s: f32,
    ) -> bool {
        let believes = self.beat_throw_margin(idx, to_base, extra_gaps) + bonus_s > 0.0;
        self.runners[idx].believes_beat_throw = Some(believes);
        believes
    }

    // =========================================================
    // State helpers
    // =========================================================

    fn set_runner_state(&mut self, idx: usize, state: RunnerState) {
        self.runners[idx].state = state;
        if state == RunnerState::Tentative || state == RunnerState::FullSpeed {
            self.vacate_slot(idx);
        }
    }

    /// Commit to the advance.
    fn take_off(&mut self, idx: usize) {
        if self.runners[idx].state == RunnerState::FullSpeed {
            return;
        }
        self.runners[idx].state = RunnerState::FullSpeed;
        self.vacate_slot(idx);
        let name = self.runners[idx].name.clone();
        let toward = self.runners[idx].target;
        self.events.push(
            self.tick,
            PlayEventKind::RunnerTookOff {
                runner: name,
                toward,
            },
        );
    }

    fn vacate_slot(&mut self, idx: usize) {
        if let Some(slot) = self.runners[idx].origin.slot() {
            if self.slots[slot] == Some(idx) {
                self.slots[slot] = None;
            }
        }
    }
}
